use wasm_bindgen::prelude::*;

/// Parses `input` and returns the debug rendering of the value tree.
#[wasm_bindgen]
pub fn parse(input: &str) -> Result<String, JsError> {
    let parsed = rjv::parse(input).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(format!("{:#?}", parsed))
}

/// Returns the error message for malformed input, or `undefined` when it parses.
#[wasm_bindgen]
pub fn validate(input: &str) -> Option<String> {
    rjv::parse(input).err().map(|e| e.to_string())
}

// Defined in RFC8259 also known as STD90.

pub mod error;
pub mod parser;
pub mod value;

pub use error::{Error, ErrorKind, Position, Result};
pub use parser::{DEFAULT_MAX_DEPTH, Parser, ParserOptions};
pub use value::{Array, Object, Value};

/// Parses `input` with the default options.
pub fn parse(input: &str) -> Result<Value> {
    Parser::new(input).parse()
}

// Grammar follows RFC 8259 without `\u` surrogate pairs.

use crate::{
    error::{Error, ErrorKind, Position, Result},
    value::{Array, Object, Value},
};

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest allowed nesting of arrays and objects. `None` disables the check.
    pub max_depth: Option<usize>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl ParserOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Recursion is bounded only by the call stack.
    pub fn unbounded(mut self) -> Self {
        self.max_depth = None;
        self
    }
}

/// Recursive-descent reader over one in-memory document.
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, ParserOptions::default())
    }

    pub fn with_options(input: &'a str, options: ParserOptions) -> Self {
        Parser {
            input,
            position: 0,
            depth: 0,
            options,
        }
    }

    /// Parses the whole input as exactly one value. Restarts from the
    /// beginning on every call.
    pub fn parse(&mut self) -> Result<Value> {
        self.position = 0;
        self.depth = 0;
        tracing::debug!(bytes = self.input.len(), "parsing document");

        let result = self.parse_document();
        if let Err(error) = &result {
            tracing::debug!(%error, "document rejected");
        }
        result
    }

    fn parse_document(&mut self) -> Result<Value> {
        self.skip_whitespace();
        let value = self.parse_value()?;
        self.skip_whitespace();
        if !self.is_end() {
            return Err(self.syntax_error("Unexpected data after JSON value"));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn is_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.position += 1;
        }
    }

    fn error_at(&self, kind: ErrorKind, offset: usize, message: impl Into<String>) -> Error {
        Error::new(kind)
            .with_message(message)
            .with_position(Position::locate(self.input, offset))
    }

    fn syntax_error(&self, message: impl Into<String>) -> Error {
        self.error_at(ErrorKind::Syntax, self.position, message)
    }

    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        match self.options.max_depth {
            Some(max) if self.depth > max => Err(self.error_at(
                ErrorKind::DepthLimit,
                self.position,
                format!("Maximum nesting depth of {max} exceeded"),
            )),
            _ => Ok(()),
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => self.parse_string().map(Value::String),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some('t' | 'f' | 'n') => self.parse_bool_or_null(),
            Some(c) => Err(self.syntax_error(format!("Unexpected character '{c}'"))),
            None => Err(self.syntax_error("Unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        if !self.eat('{') {
            return Err(self.syntax_error("Expected '{'"));
        }
        self.descend()?;

        let mut obj = Object::new();
        self.skip_whitespace();
        if self.eat('}') {
            self.depth -= 1;
            return Ok(Value::Object(obj));
        }

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('"') => {}
                Some(_) => return Err(self.syntax_error("Expected string key in object")),
                None => return Err(self.syntax_error("Unterminated object")),
            }
            let key = self.parse_string()?;

            self.skip_whitespace();
            if !self.eat(':') {
                return Err(self.syntax_error("Expected ':' after object key"));
            }
            let value = self.parse_value()?;
            obj.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.position += 1,
                Some('}') => {
                    self.position += 1;
                    break;
                }
                Some(_) => {
                    return Err(self.syntax_error("Expected ',' or '}' after value in object"));
                }
                None => return Err(self.syntax_error("Unterminated object")),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(obj))
    }

    fn parse_array(&mut self) -> Result<Value> {
        if !self.eat('[') {
            return Err(self.syntax_error("Expected '['"));
        }
        self.descend()?;

        let mut arr = Array::new();
        self.skip_whitespace();
        if self.eat(']') {
            self.depth -= 1;
            return Ok(Value::Array(arr));
        }

        loop {
            arr.push(self.parse_value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.position += 1,
                Some(']') => {
                    self.position += 1;
                    break;
                }
                Some(_) => {
                    return Err(self.syntax_error("Expected ',' or ']' after value in array"));
                }
                None => return Err(self.syntax_error("Unterminated array")),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(arr))
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.position;
        if !self.eat('"') {
            return Err(self.syntax_error("Expected '\"'"));
        }

        let mut buf = String::new();
        loop {
            let Some(c) = self.advance() else {
                return Err(self.error_at(ErrorKind::Syntax, start, "Unterminated string"));
            };
            match c {
                '"' => return Ok(buf),
                '\\' => {
                    let escape = self.position - 1;
                    let Some(escaped) = self.advance() else {
                        return Err(self.syntax_error("Unterminated escape sequence"));
                    };
                    match escaped {
                        '"' => buf.push('"'),
                        '\\' => buf.push('\\'),
                        '/' => buf.push('/'),
                        'b' => buf.push('\x08'),
                        'f' => buf.push('\x0C'),
                        'n' => buf.push('\n'),
                        'r' => buf.push('\r'),
                        't' => buf.push('\t'),
                        'u' => buf.push(self.parse_unicode_escape(escape)?),
                        other => {
                            return Err(self.error_at(
                                ErrorKind::Syntax,
                                escape,
                                format!("Invalid escape sequence '\\{other}'"),
                            ));
                        }
                    }
                }
                c => buf.push(c),
            }
        }
    }

    /// Reads the four hex digits following `\u`. `escape` is the offset of the backslash.
    fn parse_unicode_escape(&mut self, escape: usize) -> Result<char> {
        let mut code: u32 = 0;
        for _ in 0..4 {
            let Some(c) = self.advance() else {
                return Err(self.syntax_error("Unterminated escape sequence"));
            };
            let Some(digit) = c.to_digit(16) else {
                return Err(self.error_at(
                    ErrorKind::Syntax,
                    escape,
                    "Invalid unicode escape sequence",
                ));
            };
            code = (code << 4) | digit;
        }

        char::from_u32(code).ok_or_else(|| {
            self.error_at(
                ErrorKind::Syntax,
                escape,
                format!("Unsupported surrogate escape '\\u{code:04X}'"),
            )
        })
    }

    fn eat_digits(&mut self) -> bool {
        let start = self.position;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.position += 1;
        }
        self.position > start
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.position;
        self.eat('-');
        if !self.eat_digits() {
            return Err(self.syntax_error("Expected digit"));
        }
        if self.eat('.') && !self.eat_digits() {
            return Err(self.syntax_error("Expected digit after decimal point"));
        }
        if self.eat('e') || self.eat('E') {
            let _ = self.eat('+') || self.eat('-');
            if !self.eat_digits() {
                return Err(self.syntax_error("Expected digit in exponent"));
            }
        }

        let literal = &self.input[start..self.position];
        literal.parse::<f64>().map(Value::Number).map_err(|e| {
            self.error_at(
                ErrorKind::Syntax,
                start,
                format!("Invalid number '{literal}': {e}"),
            )
        })
    }

    fn parse_bool_or_null(&mut self) -> Result<Value> {
        let rest = &self.input[self.position..];
        for (keyword, value) in [
            ("true", Value::Boolean(true)),
            ("false", Value::Boolean(false)),
            ("null", Value::Null),
        ] {
            if rest.starts_with(keyword) {
                self.position += keyword.len();
                return Ok(value);
            }
        }

        let word: String = rest.chars().take_while(char::is_ascii_alphabetic).collect();
        Err(self.syntax_error(format!("Invalid JSON keyword '{word}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parse_err(input: &str) -> Error {
        Parser::new(input).parse().unwrap_err()
    }

    #[test_case("0", 0.0; "zero")]
    #[test_case("25", 25.0; "integer")]
    #[test_case("-7", -7.0; "negative integer")]
    #[test_case("3.25", 3.25; "fraction")]
    #[test_case("-3.5e2", -350.0; "negative exponent form")]
    #[test_case("1E3", 1000.0; "upper exponent")]
    #[test_case("2e+2", 200.0; "signed exponent")]
    #[test_case("5e-1", 0.5; "negative exponent")]
    #[test_case("  42  ", 42.0; "padded")]
    fn numbers(input: &str, expected: f64) {
        let value = Parser::new(input).parse().unwrap();
        assert_eq!(value.as_number().unwrap(), expected);
    }

    #[test_case("true", Value::Boolean(true); "true")]
    #[test_case("false", Value::Boolean(false); "false")]
    #[test_case("null", Value::Null; "null")]
    #[test_case("\r\n\t null \n", Value::Null; "whitespace around null")]
    fn keywords(input: &str, expected: Value) {
        assert_eq!(Parser::new(input).parse().unwrap(), expected);
    }

    #[test_case(r#""hello""#, "hello"; "plain")]
    #[test_case(r#""""#, ""; "empty")]
    #[test_case(r#""a\"b""#, "a\"b"; "escaped quote")]
    #[test_case(r#""\\\/""#, "\\/"; "escaped solidus")]
    #[test_case(r#""\b\f\n\r\t""#, "\x08\x0C\n\r\t"; "control escapes")]
    #[test_case(r#""\u0041\u00e9""#, "Aé"; "unicode escapes")]
    #[test_case("\"héllo wörld\"", "héllo wörld"; "non ascii")]
    fn strings(input: &str, expected: &str) {
        let value = Parser::new(input).parse().unwrap();
        assert_eq!(value.as_str().unwrap(), expected);
    }

    #[test_case("", "Unexpected end of input"; "empty input")]
    #[test_case("   ", "Unexpected end of input"; "only whitespace")]
    #[test_case("x", "Unexpected character 'x'"; "stray character")]
    #[test_case("{}extra", "Unexpected data after JSON value"; "trailing word")]
    #[test_case("1 2", "Unexpected data after JSON value"; "two numbers")]
    #[test_case("nullx", "Unexpected data after JSON value"; "keyword followed by letter")]
    #[test_case("tru", "Invalid JSON keyword 'tru'"; "truncated true")]
    #[test_case("nul", "Invalid JSON keyword 'nul'"; "truncated null")]
    #[test_case("fals3", "Invalid JSON keyword 'fals'"; "misspelled false")]
    #[test_case("-", "Expected digit"; "lone minus")]
    #[test_case("-a", "Expected digit"; "minus letter")]
    #[test_case("1.", "Expected digit after decimal point"; "bare decimal point")]
    #[test_case("1.e5", "Expected digit after decimal point"; "decimal point before exponent")]
    #[test_case("1e", "Expected digit in exponent"; "bare exponent")]
    #[test_case("1e+", "Expected digit in exponent"; "signed bare exponent")]
    #[test_case(r#""abc"#, "Unterminated string"; "unterminated string")]
    #[test_case(r#""abc\"#, "Unterminated escape sequence"; "backslash at end")]
    #[test_case(r#""a\x""#, "Invalid escape sequence '\\x'"; "unknown escape")]
    #[test_case(r#""\u12"#, "Unterminated escape sequence"; "short unicode escape")]
    #[test_case(r#""\u12G4""#, "Invalid unicode escape sequence"; "non hex unicode escape")]
    #[test_case(r#""\uD83D""#, "Unsupported surrogate escape '\\uD83D'"; "surrogate escape")]
    #[test_case(r#"{"age": 25, }"#, "Expected string key in object"; "trailing comma in object")]
    #[test_case(r#"{"a": 1"#, "Unterminated object"; "unterminated object")]
    #[test_case(r#"{"a": 1,"#, "Unterminated object"; "end after comma in object")]
    #[test_case("{", "Unterminated object"; "lone brace")]
    #[test_case(r#"{"a" 1}"#, "Expected ':' after object key"; "missing colon")]
    #[test_case(r#"{"a": 1 "b": 2}"#, "Expected ',' or '}' after value in object"; "missing comma")]
    #[test_case("{a: 1}", "Expected string key in object"; "unquoted key")]
    #[test_case(r#"{"a":}"#, "Unexpected character '}'"; "missing value")]
    #[test_case("[1, 2,]", "Unexpected character ']'"; "trailing comma in array")]
    #[test_case("[1 2]", "Expected ',' or ']' after value in array"; "missing comma in array")]
    #[test_case("[1,", "Unexpected end of input"; "end after comma in array")]
    #[test_case("[1", "Unterminated array"; "unterminated array")]
    #[test_case("[,]", "Unexpected character ','"; "leading comma")]
    fn syntax_errors(input: &str, message: &str) {
        let err = parse_err(input);
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.message(), message);
        assert!(err.position().is_some());
    }

    #[test]
    fn error_positions_point_at_divergence() {
        let err = parse_err("{\n  \"a\": 1,\n  \"b\" 2\n}");
        assert_eq!(err.message(), "Expected ':' after object key");
        let position = err.position().unwrap();
        assert_eq!((position.line, position.column), (3, 7));

        let err = parse_err(r#""ab\q""#);
        assert_eq!(err.position().unwrap().offset, 3);

        let err = parse_err(r#"  "open"#);
        assert_eq!(err.position().unwrap().column, 3);
    }

    #[test]
    fn empty_containers() {
        let obj = Parser::new("{ }").parse().unwrap();
        assert!(obj.is_object() && obj.as_object().unwrap().is_empty());

        let arr = Parser::new("[\n]").parse().unwrap();
        assert!(arr.is_array() && arr.as_array().unwrap().is_empty());
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let value = Parser::new(r#"{"a":1,"a":2}"#).parse().unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert_eq!(value["a"].as_number().unwrap(), 2.0);
    }

    #[test]
    fn arrays_keep_order() {
        let value = Parser::new(r#"[3, "two", [1], {}, null, false]"#).parse().unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 6);
        assert_eq!(arr[0], Value::Number(3.0));
        assert_eq!(arr[1], Value::String("two".to_string()));
        assert_eq!(arr[2], Value::Array(vec![Value::Number(1.0)]));
        assert!(arr[3].is_object());
        assert!(arr[4].is_null());
        assert_eq!(arr[5], Value::Boolean(false));
    }

    #[test]
    fn parse_restarts_from_beginning() {
        let mut parser = Parser::new("[1]");
        let first = parser.parse().unwrap();
        let second = parser.parse().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn depth_limit_rejects_deep_nesting() {
        let options = ParserOptions::default().with_max_depth(3);
        assert!(Parser::with_options("[[[1]]]", options).parse().is_ok());
        assert!(Parser::with_options(r#"{"a":[{}]}"#, options).parse().is_ok());

        let err = Parser::with_options("[[[[1]]]]", options).parse().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DepthLimit);
        assert_eq!(err.message(), "Maximum nesting depth of 3 exceeded");
    }

    #[test]
    fn depth_is_measured_per_branch() {
        let options = ParserOptions::default().with_max_depth(2);
        let input = r#"[[1], [2], [3], {"a": 4}]"#;
        assert!(Parser::with_options(input, options).parse().is_ok());

        let err = Parser::with_options(r#"[{"a": [4]}]"#, options).parse().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DepthLimit);
    }

    #[test]
    fn default_depth_limit() {
        let deep = format!(
            "{}{}",
            "[".repeat(DEFAULT_MAX_DEPTH + 1),
            "]".repeat(DEFAULT_MAX_DEPTH + 1)
        );
        let err = Parser::new(&deep).parse().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DepthLimit);

        let ok = format!("{}{}", "[".repeat(DEFAULT_MAX_DEPTH), "]".repeat(DEFAULT_MAX_DEPTH));
        assert!(Parser::new(&ok).parse().is_ok());
    }

    #[test]
    fn unbounded_options_disable_limit() {
        let options = ParserOptions::default().unbounded();
        assert_eq!(options.max_depth, None);
        let deep = format!("{}{}", "[".repeat(300), "]".repeat(300));
        assert!(Parser::with_options(&deep, options).parse().is_ok());
    }
}

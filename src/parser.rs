use std::collections::HashMap;
use std::io::Read;

use crate::error::{ErrorKind, ParseError, Position};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::Value;

/// Nesting depth accepted before a parse is abandoned. Recursion depth
/// equals nesting depth, so the limit is what stands between untrusted
/// input and the call stack.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Recursive-descent parser with one token of lookahead.
///
/// One instance serves one parse. The grammar has exactly two outcomes per
/// input: a complete [`Value`], or one [`ParseError`] raised at the point of
/// detection.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, ParseError> {
        Self::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(input: &'a str, max_depth: usize) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
            max_depth,
        })
    }

    /// Parse the whole input as one document. Trailing tokens after the
    /// top-level value are rejected; a bare scalar is a valid document.
    pub fn parse(mut self) -> Result<Value, ParseError> {
        let value = self.value()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.unexpected());
        }
        Ok(value)
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self) -> ParseError {
        ParseError::new(
            ErrorKind::UnexpectedToken(self.current.kind.clone()),
            self.current.pos,
        )
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        match &self.current.kind {
            TokenKind::Value(literal) => {
                let value = literal.clone();
                self.advance()?;
                Ok(value)
            }
            TokenKind::LeftBrace => self.object(),
            TokenKind::LeftSquare => self.array(),
            _ => Err(self.unexpected()),
        }
    }

    fn object(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        self.advance()?; // {
        let mut map = HashMap::new();

        if self.current.kind == TokenKind::RightBrace {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Object(map));
        }

        loop {
            let key = match &self.current.kind {
                TokenKind::Value(Value::Str(key)) => key.clone(),
                _ => return Err(self.unexpected()),
            };
            self.advance()?;

            if self.current.kind != TokenKind::Colon {
                return Err(self.unexpected());
            }
            self.advance()?;

            let value = self.value()?;
            // A repeated key overwrites the earlier entry.
            map.insert(key, value);

            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                    if self.current.kind == TokenKind::RightBrace {
                        return Err(self.unexpected());
                    }
                }
                TokenKind::RightBrace => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn array(&mut self) -> Result<Value, ParseError> {
        self.enter()?;
        self.advance()?; // [
        let mut items = Vec::new();

        if self.current.kind == TokenKind::RightSquare {
            self.advance()?;
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.value()?);

            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                    if self.current.kind == TokenKind::RightSquare {
                        return Err(self.unexpected());
                    }
                }
                TokenKind::RightSquare => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::new(
                ErrorKind::Unexpected(format!("nesting deeper than {} levels", self.max_depth)),
                self.current.pos,
            ));
        }
        Ok(())
    }
}

/// Parse JSON text into a [`Value`].
pub fn parse(input: &str) -> Result<Value, ParseError> {
    Parser::new(input)?.parse()
}

/// Parse JSON text drained from an input source.
///
/// The source is read to completion before parsing; a read failure surfaces
/// as [`ErrorKind::Unexpected`], never as a silently truncated document.
pub fn parse_from_reader<R: Read>(mut reader: R) -> Result<Value, ParseError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| ParseError::new(ErrorKind::Unexpected(e.to_string()), Position::start()))?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_parse_bare() {
        assert_eq!(parse("null").unwrap(), Value::Null);
        assert_eq!(parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parse("42").unwrap(), Value::Int(42));
        assert_eq!(parse("\"x\"").unwrap(), Value::Str("x".to_owned()));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(parse("[]").unwrap(), Value::Array(vec![]));
        assert_eq!(parse("{}").unwrap(), Value::Object(HashMap::new()));
        assert_eq!(parse(" [ ] ").unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn nested_document() {
        let value = parse(r#"{"arr": [1, {"nested": true}], "num": -2.5}"#).unwrap();
        assert_eq!(
            value.get("arr").and_then(|a| a.get_index(0)),
            Some(&Value::Int(1))
        );
        assert_eq!(
            value
                .get("arr")
                .and_then(|a| a.get_index(1))
                .and_then(|o| o.get("nested")),
            Some(&Value::Bool(true))
        );
        assert_eq!(value.get("num"), Some(&Value::Float(-2.5)));
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let value = parse(r#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(value.get("a"), Some(&Value::Int(2)));
        assert_eq!(value.as_object().map(HashMap::len), Some(1));
    }

    #[test]
    fn trailing_comma_rejected() {
        let err = parse("[1, 2,]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::RightSquare));
        assert_eq!(err.position.offset, 6);

        let err = parse(r#"{"a": 1,}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::RightBrace));
    }

    #[test]
    fn double_comma_rejected() {
        let err = parse("[1,,2]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::Comma));
    }

    #[test]
    fn non_string_key_rejected_at_key_position() {
        let err = parse("{1: 2}").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedToken(TokenKind::Value(Value::Int(1)))
        );
        assert_eq!(err.position.offset, 1);
    }

    #[test]
    fn missing_colon_rejected() {
        let err = parse(r#"{"a" 1}"#).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedToken(TokenKind::Value(Value::Int(1)))
        );
    }

    #[test]
    fn trailing_tokens_rejected() {
        let err = parse("null extra").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedChar('e')));

        let err = parse("[] []").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::LeftSquare));
        assert_eq!(err.position.offset, 3);
    }

    #[test]
    fn unexpected_end_of_input() {
        let err = parse("[1, ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::Eof));

        let err = parse(r#"{"a":"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::Eof));
    }

    #[test]
    fn empty_input_rejected() {
        let err = parse("").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::Eof));
    }

    #[test]
    fn depth_guard_trips_instead_of_overflowing() {
        let deep = "[".repeat(40) + &"]".repeat(40);
        let err = Parser::with_max_depth(&deep, 8)
            .and_then(Parser::parse)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Unexpected(_)));

        assert!(Parser::with_max_depth(&deep, 40)
            .and_then(Parser::parse)
            .is_ok());
    }

    #[test]
    fn parse_from_reader_matches_parse() {
        let value = parse_from_reader("[1, 2]".as_bytes()).unwrap();
        assert_eq!(value, Value::Array(vec![Value::Int(1), Value::Int(2)]));
    }
}

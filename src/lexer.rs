use crate::error::{ErrorKind, ParseError, Position};
use crate::value::Value;
use bytecount::num_chars;
use memchr::memchr2;
use std::fmt;

/// A lexical unit: a structural character, a decoded literal, or end of
/// input.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftSquare,
    RightSquare,
    Comma,
    Colon,
    /// A decoded literal. Only scalar variants of [`Value`] occur here:
    /// `Null`, `Bool`, `Int`, `Float` or `Str`.
    Value(Value),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LeftBrace => f.write_str("'{'"),
            TokenKind::RightBrace => f.write_str("'}'"),
            TokenKind::LeftSquare => f.write_str("'['"),
            TokenKind::RightSquare => f.write_str("']'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Value(Value::Null) => f.write_str("null"),
            TokenKind::Value(Value::Bool(b)) => write!(f, "{}", b),
            TokenKind::Value(Value::Int(n)) => write!(f, "number {}", n),
            TokenKind::Value(Value::Float(x)) => write!(f, "number {}", x),
            TokenKind::Value(Value::Str(s)) => write!(f, "string {:?}", s),
            TokenKind::Value(_) => f.write_str("value"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Position of the token's first character. Monotonically non-decreasing
    /// across successive tokens from one lexer.
    pub pos: Position,
}

/// Pull lexer over one in-memory input.
///
/// Call [`next_token`](Lexer::next_token) until it yields
/// [`TokenKind::Eof`]. The lexer owns all offset, line and column tracking;
/// string escapes are decoded here, so the parser only ever sees finished
/// literals. One instance serves one parse: the cursor is mutable state and
/// is not meant to be shared.
pub struct Lexer<'a> {
    input: &'a str,
    byte_pos: usize,
    char_pos: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            byte_pos: 0,
            char_pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    /// Position of the next unconsumed character.
    pub fn position(&self) -> Position {
        let line_bytes = &self.input.as_bytes()[self.line_start..self.byte_pos];
        Position {
            offset: self.char_pos,
            line: self.line,
            col: num_chars(line_bytes) + 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.byte_pos).copied()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.byte_pos..]
    }

    /// Consume one byte known to be a single-byte character.
    fn bump_ascii(&mut self) {
        self.byte_pos += 1;
        self.char_pos += 1;
    }

    /// Consume `len` bytes of character data with no newlines in them.
    fn bump_str(&mut self, len: usize) {
        let run = &self.input.as_bytes()[self.byte_pos..self.byte_pos + len];
        self.byte_pos += len;
        self.char_pos += num_chars(run);
    }

    fn err_here(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.position())
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b'\n' => {
                    self.bump_ascii();
                    self.line += 1;
                    self.line_start = self.byte_pos;
                }
                b' ' | b'\t' | b'\r' => self.bump_ascii(),
                _ => break,
            }
        }
    }

    /// Read the next token, skipping any leading whitespace.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let pos = self.position();

        let Some(ch) = self.rest().chars().next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos,
            });
        };

        let kind = match ch {
            '{' => {
                self.bump_ascii();
                TokenKind::LeftBrace
            }
            '}' => {
                self.bump_ascii();
                TokenKind::RightBrace
            }
            '[' => {
                self.bump_ascii();
                TokenKind::LeftSquare
            }
            ']' => {
                self.bump_ascii();
                TokenKind::RightSquare
            }
            ',' => {
                self.bump_ascii();
                TokenKind::Comma
            }
            ':' => {
                self.bump_ascii();
                TokenKind::Colon
            }
            '"' => TokenKind::Value(self.read_string()?),
            '-' | '0'..='9' => TokenKind::Value(self.read_number()?),
            'a'..='z' | 'A'..='Z' => TokenKind::Value(self.read_keyword()?),
            other => return Err(self.err_here(ErrorKind::UnexpectedChar(other))),
        };

        Ok(Token { kind, pos })
    }

    /// `true`, `false` and `null` are matched case-sensitively against the
    /// whole alphabetic run, so `truex` fails at the run's first character.
    fn read_keyword(&mut self) -> Result<Value, ParseError> {
        let run_len = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        let run = &self.rest()[..run_len];

        let value = match run {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => {
                // The caller only dispatches here on an alphabetic first
                // character, so the run is never empty.
                let first = run.chars().next().unwrap_or('\0');
                return Err(self.err_here(ErrorKind::UnexpectedChar(first)));
            }
        };
        self.bump_str(run_len);
        Ok(value)
    }

    fn read_number(&mut self) -> Result<Value, ParseError> {
        let start = self.byte_pos;
        let mut integral = true;

        if self.peek() == Some(b'-') {
            self.bump_ascii();
        }
        self.read_digits()?;

        if self.peek() == Some(b'.') {
            integral = false;
            self.bump_ascii();
            self.read_digits()?;
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            integral = false;
            self.bump_ascii();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump_ascii();
            }
            self.read_digits()?;
        }

        let text = &self.input[start..self.byte_pos];
        if integral {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Int(n));
            }
            // Integral but outside i64: fall through to the wider float
            // representation rather than erroring or truncating.
        }
        match text.parse::<f64>() {
            Ok(x) => Ok(Value::Float(x)),
            Err(e) => Err(self.err_here(ErrorKind::Unexpected(e.to_string()))),
        }
    }

    fn read_digits(&mut self) -> Result<(), ParseError> {
        if !matches!(self.peek(), Some(b'0'..=b'9')) {
            return Err(self.err_at_next_char());
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump_ascii();
        }
        Ok(())
    }

    /// Error for "something else where a specific character was required":
    /// the offending character if there is one, end-of-input otherwise.
    fn err_at_next_char(&self) -> ParseError {
        match self.rest().chars().next() {
            Some(ch) => self.err_here(ErrorKind::UnexpectedChar(ch)),
            None => self.err_here(ErrorKind::UnexpectedToken(TokenKind::Eof)),
        }
    }

    fn read_string(&mut self) -> Result<Value, ParseError> {
        self.bump_ascii(); // opening quote
        let mut buf = String::new();

        loop {
            let rest = &self.input.as_bytes()[self.byte_pos..];
            let (run_len, terminated) = match memchr2(b'"', b'\\', rest) {
                Some(i) => (i, true),
                None => (rest.len(), false),
            };

            // Raw control characters never appear in a string literal; they
            // must arrive escaped.
            if let Some(ctl) = rest[..run_len].iter().position(|&b| b < 0x20) {
                self.bump_str(ctl);
                return Err(self.err_here(ErrorKind::UnexpectedChar(char::from(rest[ctl]))));
            }

            buf.push_str(&self.rest()[..run_len]);
            self.bump_str(run_len);

            if !terminated {
                return Err(self.err_here(ErrorKind::UnexpectedToken(TokenKind::Eof)));
            }

            if self.peek() == Some(b'"') {
                self.bump_ascii();
                return Ok(Value::Str(buf));
            }

            self.bump_ascii(); // backslash
            buf.push(self.read_escape()?);
        }
    }

    fn read_escape(&mut self) -> Result<char, ParseError> {
        let pos = self.position();
        let Some(ch) = self.rest().chars().next() else {
            return Err(self.err_here(ErrorKind::UnexpectedToken(TokenKind::Eof)));
        };

        let decoded = match ch {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                self.bump_ascii();
                return self.read_unicode_escape(pos);
            }
            other => return Err(ParseError::new(ErrorKind::UnexpectedChar(other), pos)),
        };
        self.bump_ascii();
        Ok(decoded)
    }

    /// Decode `\uXXXX`, pairing UTF-16 surrogates into one code point.
    fn read_unicode_escape(&mut self, escape_pos: Position) -> Result<char, ParseError> {
        let unit = self.read_hex4()?;

        if (0xD800..=0xDBFF).contains(&unit) {
            // High surrogate: a low surrogate escape must follow directly.
            if self.peek() == Some(b'\\') {
                self.bump_ascii();
            } else {
                return Err(Self::unpaired(unit, escape_pos));
            }
            if self.peek() == Some(b'u') {
                self.bump_ascii();
            } else {
                return Err(Self::unpaired(unit, escape_pos));
            }
            let low = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(Self::unpaired(unit, escape_pos));
            }
            let combined = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
            return char::from_u32(combined).ok_or_else(|| Self::unpaired(unit, escape_pos));
        }

        if (0xDC00..=0xDFFF).contains(&unit) {
            return Err(Self::unpaired(unit, escape_pos));
        }

        char::from_u32(u32::from(unit)).ok_or_else(|| Self::unpaired(unit, escape_pos))
    }

    fn unpaired(unit: u16, pos: Position) -> ParseError {
        ParseError::new(
            ErrorKind::Unexpected(format!("unpaired surrogate \\u{:04X}", unit)),
            pos,
        )
    }

    fn read_hex4(&mut self) -> Result<u16, ParseError> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let Some(ch) = self.rest().chars().next() else {
                return Err(self.err_here(ErrorKind::UnexpectedToken(TokenKind::Eof)));
            };
            let Some(digit) = ch.to_digit(16) else {
                return Err(self.err_here(ErrorKind::UnexpectedChar(ch)));
            };
            self.bump_ascii();
            value = (value << 4) | digit as u16;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Result<Vec<TokenKind>, ParseError> {
        let mut lexer = Lexer::new(input);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token()?;
            if token.kind == TokenKind::Eof {
                return Ok(kinds);
            }
            kinds.push(token.kind);
        }
    }

    fn lex_one(input: &str) -> Value {
        let mut lexer = Lexer::new(input);
        match lexer.next_token().unwrap().kind {
            TokenKind::Value(v) => v,
            other => panic!("expected a literal, got {}", other),
        }
    }

    #[test]
    fn structural_tokens() {
        assert_eq!(
            lex("{}[],:").unwrap(),
            vec![
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftSquare,
                TokenKind::RightSquare,
                TokenKind::Comma,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn keywords() {
        assert_eq!(lex_one("true"), Value::Bool(true));
        assert_eq!(lex_one("false"), Value::Bool(false));
        assert_eq!(lex_one("null"), Value::Null);
    }

    #[test]
    fn keyword_is_case_sensitive() {
        let err = lex("True").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedChar('T'));
        assert_eq!(err.position.offset, 0);
    }

    #[test]
    fn bareword_rejected_at_run_start() {
        let err = lex("nulla").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedChar('n'));
    }

    #[test]
    fn numbers() {
        assert_eq!(lex_one("42"), Value::Int(42));
        assert_eq!(lex_one("-123"), Value::Int(-123));
        assert_eq!(lex_one("0"), Value::Int(0));
        assert_eq!(lex_one("1.5"), Value::Float(1.5));
        assert_eq!(lex_one("-0.25"), Value::Float(-0.25));
        assert_eq!(lex_one("1e3"), Value::Float(1000.0));
        assert_eq!(lex_one("1.2E-2"), Value::Float(0.012));
    }

    #[test]
    fn integral_overflow_widens_to_float() {
        assert_eq!(
            lex_one("123456789012345678901234567890"),
            Value::Float(123456789012345678901234567890.0)
        );
    }

    #[test]
    fn number_missing_digits() {
        let err = lex("1.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::Eof));

        let err = lex("-x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedChar('x'));
        assert_eq!(err.position.offset, 1);
    }

    #[test]
    fn simple_string() {
        assert_eq!(lex_one(r#""hello""#), Value::Str("hello".to_owned()));
        assert_eq!(lex_one(r#""""#), Value::Str(String::new()));
    }

    #[test]
    fn escapes_decode() {
        assert_eq!(lex_one(r#""a\nb\tc""#), Value::Str("a\nb\tc".to_owned()));
        assert_eq!(lex_one(r#""\"\\\/""#), Value::Str("\"\\/".to_owned()));
    }

    #[test]
    fn unicode_escape() {
        assert_eq!(lex_one("\"\\u0041\""), Value::Str("A".to_owned()));
        assert_eq!(lex_one("\"\\u00E9\""), Value::Str("é".to_owned()));
    }

    #[test]
    fn surrogate_pair_combines() {
        assert_eq!(lex_one("\"\\uD83D\\uDE00\""), Value::Str("😀".to_owned()));
    }

    #[test]
    fn unpaired_surrogate_rejected() {
        let err = lex(r#""\uD83D!""#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Unexpected(_)));
    }

    #[test]
    fn unterminated_string() {
        let err = lex(r#""abc"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken(TokenKind::Eof));
        assert_eq!(err.position.offset, 4);
    }

    #[test]
    fn bad_escape_reported_at_offending_char() {
        let err = lex(r#""a\x""#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedChar('x'));
        assert_eq!(err.position.offset, 3);
    }

    #[test]
    fn raw_control_char_in_string() {
        let err = lex("\"a\u{0001}b\"").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedChar('\u{0001}'));
        assert_eq!(err.position.offset, 2);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let mut lexer = Lexer::new("{\n  \"a\": 1\n}");

        let token = lexer.next_token().unwrap();
        assert_eq!(token.pos.line, 1);
        assert_eq!(token.pos.col, 1);

        let token = lexer.next_token().unwrap();
        assert_eq!(token.pos.offset, 4);
        assert_eq!(token.pos.line, 2);
        assert_eq!(token.pos.col, 3);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let mut lexer = Lexer::new(r#"["é", 1]"#);
        // [  "é"  ,
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let comma = lexer.next_token().unwrap();
        assert_eq!(comma.pos.offset, 4);
    }

    #[test]
    fn token_positions_are_monotonic() {
        let mut lexer = Lexer::new(" [1, {\"a\": null}, false] ");
        let mut last = 0;
        loop {
            let token = lexer.next_token().unwrap();
            assert!(token.pos.offset >= last);
            last = token.pos.offset;
            if token.kind == TokenKind::Eof {
                break;
            }
        }
    }
}

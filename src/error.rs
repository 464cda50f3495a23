use crate::lexer::TokenKind;
use std::fmt;
use thiserror::Error;

/// Location of a token or error in the source text.
///
/// `offset` is the 0-based character (not byte) offset from the start of the
/// input; `line` and `col` are 1-based, with columns counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            col: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {})",
            self.line, self.col, self.offset
        )
    }
}

/// What went wrong, split along the taxonomy callers branch on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    /// A character that cannot start or continue any token.
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    /// A well-formed token in a place the grammar does not allow.
    #[error("unexpected {0}")]
    UnexpectedToken(TokenKind),
    /// Input-source failures and guard trips, never a malformed document.
    #[error("{0}")]
    Unexpected(String),
}

/// A syntax or input failure, constructed at the exact point of detection.
///
/// The core never returns a partially built value: every parse either
/// succeeds with a complete [`Value`](crate::Value) or fails with exactly one
/// of these.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {position}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

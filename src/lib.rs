#![forbid(unsafe_code)]
#![warn(clippy::all)]
//! This crate converts JSON text into a dynamically-typed [`Value`] tree and
//! back, and reports the exact line, column and character offset of every
//! syntax error. Parsed values are compatible with
//! [serde](https://serde.rs/), so a tree can be handed to anything that
//! consumes a [`Serialize`](serde::Serialize) implementation.
//!
//! ## Why use it ?
//!
//! Most parsers tell you *that* input was malformed; the errors here carry a
//! [`Position`] and a typed [`ErrorKind`], so you can tell the user really
//! precisely which character broke the document and branch on the failure
//! class without matching on message strings.
//!
//! ## Parsing
//!
//! ```rust
//! use positioned_json::parse;
//!
//! let value = parse(r#"{"hello": "world", "n": 42}"#).unwrap();
//!
//! assert_eq!(value.get("hello").and_then(|v| v.as_str()), Some("world"));
//! assert_eq!(value.get("n").and_then(|v| v.as_i64()), Some(42));
//! ```
//!
//! Errors point at the offending character:
//!
//! ```rust
//! use positioned_json::{parse, ErrorKind};
//!
//! let err = parse("{a: 1}").unwrap_err();
//!
//! assert_eq!(err.kind, ErrorKind::UnexpectedChar('a'));
//! assert_eq!(err.position.offset, 1);
//! ```
//!
//! ## Writing
//!
//! ```rust
//! use positioned_json::{to_string, Value};
//!
//! let value = Value::Array(vec![Value::Int(1), Value::Null]);
//!
//! assert_eq!(to_string(&value).unwrap(), "[1,null]");
//! ```
//!
//! The writer also renders foreign data: dates, custom-serializable
//! application objects, ad-hoc maps and sequences, all through [`JsonData`]
//! and the [`JsonStream`]/[`JsonText`] hooks re-exported below.
//!
//! ## Serializing into a struct
//!
//! ```rust
//! use positioned_json::parse;
//!
//! let parsed = parse(r#"{"hello": "world"}"#).unwrap();
//!
//! let json = serde_json::to_value(&parsed).unwrap();
//!
//! assert_eq!(json["hello"], "world");
//! ```

extern crate bytecount;
extern crate memchr;
extern crate serde;
extern crate thiserror;

mod escape;
mod lexer;
mod parser;
mod ser;
mod writer;

pub mod date;
pub mod error;
pub mod reader;
pub mod value;

pub use date::{default_date_format, set_default_date_format, DateFormat, JsonDate};
pub use error::{ErrorKind, ParseError, Position};
pub use escape::{escape, escape_into};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, parse_from_reader, Parser, DEFAULT_MAX_DEPTH};
pub use value::Value;
pub use writer::{
    to_string, to_string_with_format, write, write_data, write_with_format, JsonData, JsonStream,
    JsonText,
};

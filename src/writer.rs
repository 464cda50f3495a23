use std::borrow::Cow;
use std::io::{self, Write};

use crate::date::{default_date_format, DateFormat, JsonDate};
use crate::escape::escape_into;
use crate::value::Value;

/// A value that prefers to put its own JSON text on the sink.
///
/// Delegation wins over everything below it in the dispatch order: the
/// writer never recurses into a value's elements once the value has asked to
/// render itself, even if it is also a container.
pub trait JsonStream {
    fn write_json(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// A value that renders itself to JSON text in one piece. The returned text
/// is emitted verbatim.
pub trait JsonText {
    fn to_json_text(&self) -> String;
}

/// Everything the writer knows how to render.
///
/// Variants are listed in dispatch precedence order: null, string, date,
/// floating point (NaN and infinities degrade to the literal `null` — JSON
/// has no spelling for them), integer, boolean, the two custom-serializer
/// hooks, mapping, sequence, and a last-resort raw form emitted unquoted and
/// unescaped.
pub enum JsonData<'a> {
    Null,
    Str(Cow<'a, str>),
    Date(JsonDate),
    Float(f64),
    Int(i64),
    Bool(bool),
    Stream(&'a dyn JsonStream),
    Text(&'a dyn JsonText),
    Map(Vec<(JsonData<'a>, JsonData<'a>)>),
    Seq(Vec<JsonData<'a>>),
    Raw(String),
}

impl<'a> From<&'a Value> for JsonData<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => JsonData::Null,
            Value::Bool(b) => JsonData::Bool(*b),
            Value::Int(n) => JsonData::Int(*n),
            Value::Float(x) => JsonData::Float(*x),
            Value::Str(s) => JsonData::Str(Cow::Borrowed(s)),
            Value::Array(items) => JsonData::Seq(items.iter().map(JsonData::from).collect()),
            Value::Object(map) => JsonData::Map(
                map.iter()
                    .map(|(k, v)| (JsonData::Str(Cow::Borrowed(k.as_str())), JsonData::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'a> From<bool> for JsonData<'a> {
    fn from(value: bool) -> Self {
        JsonData::Bool(value)
    }
}

impl<'a> From<i64> for JsonData<'a> {
    fn from(value: i64) -> Self {
        JsonData::Int(value)
    }
}

impl<'a> From<f64> for JsonData<'a> {
    fn from(value: f64) -> Self {
        JsonData::Float(value)
    }
}

impl<'a> From<&'a str> for JsonData<'a> {
    fn from(value: &'a str) -> Self {
        JsonData::Str(Cow::Borrowed(value))
    }
}

impl<'a> From<String> for JsonData<'a> {
    fn from(value: String) -> Self {
        JsonData::Str(Cow::Owned(value))
    }
}

impl<'a> From<JsonDate> for JsonData<'a> {
    fn from(value: JsonDate) -> Self {
        JsonData::Date(value)
    }
}

impl<'a> From<Vec<JsonData<'a>>> for JsonData<'a> {
    fn from(value: Vec<JsonData<'a>>) -> Self {
        JsonData::Seq(value)
    }
}

/// Serialize `value` to the sink using the process-wide date format.
pub fn write<'a, W, T>(value: T, out: &mut W) -> io::Result<()>
where
    W: Write,
    T: Into<JsonData<'a>>,
{
    write_data(&value.into(), out, None)
}

/// Serialize `value` to the sink with an explicit date format.
pub fn write_with_format<'a, W, T>(value: T, out: &mut W, format: &DateFormat) -> io::Result<()>
where
    W: Write,
    T: Into<JsonData<'a>>,
{
    write_data(&value.into(), out, Some(format))
}

/// Serialize `value` to a string using the process-wide date format.
pub fn to_string<'a, T>(value: T) -> io::Result<String>
where
    T: Into<JsonData<'a>>,
{
    let mut buf = Vec::new();
    write_data(&value.into(), &mut buf, None)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Serialize `value` to a string with an explicit date format.
pub fn to_string_with_format<'a, T>(value: T, format: &DateFormat) -> io::Result<String>
where
    T: Into<JsonData<'a>>,
{
    let mut buf = Vec::new();
    write_data(&value.into(), &mut buf, Some(format))?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Recursive tree-walk over the dispatch set. No resumable state: the only
/// failure surface is the sink itself, and sink errors propagate unchanged.
pub fn write_data<W: Write + ?Sized>(
    data: &JsonData<'_>,
    out: &mut W,
    format: Option<&DateFormat>,
) -> io::Result<()> {
    match data {
        JsonData::Null => out.write_all(b"null"),
        JsonData::Str(s) => write_quoted(s, out),
        JsonData::Date(date) => {
            let text = match format {
                Some(f) => f.format(date),
                None => default_date_format().format(date),
            };
            write_quoted(&text, out)
        }
        JsonData::Float(x) => {
            if x.is_nan() || x.is_infinite() {
                out.write_all(b"null")
            } else {
                out.write_all(float_text(*x).as_bytes())
            }
        }
        JsonData::Int(n) => write!(out, "{}", n),
        JsonData::Bool(b) => write!(out, "{}", b),
        JsonData::Stream(value) => value.write_json(&mut &mut *out),
        JsonData::Text(value) => out.write_all(value.to_json_text().as_bytes()),
        JsonData::Map(entries) => {
            out.write_all(b"{")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                write_key(key, out, format)?;
                out.write_all(b":")?;
                write_data(value, out, format)?;
            }
            out.write_all(b"}")
        }
        JsonData::Seq(items) => {
            out.write_all(b"[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                // A null element is always the bare literal, never delegated.
                write_data(item, out, format)?;
            }
            out.write_all(b"]")
        }
        JsonData::Raw(text) => out.write_all(text.as_bytes()),
    }
}

/// A finite float always carries a decimal point or an exponent on the wire,
/// so an integral-valued float never re-parses as an integer literal.
fn float_text(x: f64) -> String {
    let mut text = x.to_string();
    if !text.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    text
}

fn write_quoted<W: Write + ?Sized>(s: &str, out: &mut W) -> io::Result<()> {
    let mut buf = String::with_capacity(s.len() + 2);
    buf.push('"');
    escape_into(s, &mut buf);
    buf.push('"');
    out.write_all(buf.as_bytes())
}

/// Object keys are always quoted. A non-string key is stringified via its
/// display form first — a null key becomes the quoted text `null` — and the
/// result goes through the escaper like any other string.
fn write_key<W: Write + ?Sized>(
    key: &JsonData<'_>,
    out: &mut W,
    format: Option<&DateFormat>,
) -> io::Result<()> {
    match key {
        JsonData::Str(s) => write_quoted(s, out),
        other => write_quoted(&key_text(other, format), out),
    }
}

fn key_text(key: &JsonData<'_>, format: Option<&DateFormat>) -> String {
    match key {
        JsonData::Null => "null".to_owned(),
        JsonData::Bool(b) => b.to_string(),
        JsonData::Int(n) => n.to_string(),
        JsonData::Float(x) => float_text(*x),
        JsonData::Date(date) => match format {
            Some(f) => f.format(date),
            None => default_date_format().format(date),
        },
        JsonData::Text(value) => value.to_json_text(),
        JsonData::Raw(text) => text.clone(),
        other => {
            // Containers and streaming values have no display form of their
            // own; their JSON rendering stands in for it.
            let mut buf = Vec::new();
            let _ = write_data(other, &mut buf, format);
            String::from_utf8_lossy(&buf).into_owned()
        }
    }
}

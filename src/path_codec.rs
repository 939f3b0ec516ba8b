//! Path-id and typed scalar encoding shared by both conversion directions.
//!
//! A bundle path such as `menu/file.open` becomes the trans-unit id
//! `menu.file_$DOT$_open`: literal dots are escaped first, then the path
//! delimiter is turned into the `.` that XLIFF tooling expects as structure.
//!
//! Non-string leaf values survive the trip through XLIFF text by prefixing the
//! serialized value with a `_$<type>$_` tag.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};

use crate::error::Error;

/// Delimiter between segments of a flattened bundle path.
pub const PATH_DELIMITER: char = '/';

/// Token that stands in for a literal `.` inside an encoded id.
pub const DOT_ESCAPE: &str = "_$DOT$_";

lazy_static! {
    static ref TYPED_SCALAR_REGEX: Regex = Regex::new(r"^_\$([a-zA-Z]*)\$_(.*)$").unwrap();
}

/// The runtime types that carry an inline tag in translated text.
///
/// Strings are never tagged, so they have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    Number,
    Boolean,
    /// Objects, arrays and `null`, serialized as JSON text.
    Object,
}

impl ScalarTag {
    /// Returns the tag a value must carry, or `None` for plain strings.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => None,
            Value::Number(_) => Some(ScalarTag::Number),
            Value::Bool(_) => Some(ScalarTag::Boolean),
            Value::Null | Value::Array(_) | Value::Object(_) => Some(ScalarTag::Object),
        }
    }
}

impl Display for ScalarTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarTag::Number => write!(f, "number"),
            ScalarTag::Boolean => write!(f, "boolean"),
            ScalarTag::Object => write!(f, "object"),
        }
    }
}

/// Tag names are case-sensitive, matching what [`encode_scalar`] writes.
impl FromStr for ScalarTag {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(ScalarTag::Number),
            "boolean" => Ok(ScalarTag::Boolean),
            "object" => Ok(ScalarTag::Object),
            other => Err(Error::invalid_input(format!("unknown scalar tag `{other}`"))),
        }
    }
}

/// Encodes a `/`-delimited bundle path as a trans-unit id.
///
/// # Example
/// ```rust
/// use xliff2json::path_codec::encode_id;
/// assert_eq!(encode_id("menu/file.open"), "menu.file_$DOT$_open");
/// ```
pub fn encode_id(path: &str) -> String {
    path.replace('.', DOT_ESCAPE).replace(PATH_DELIMITER, ".")
}

/// Splits a trans-unit id back into its path segments.
///
/// # Example
/// ```rust
/// use xliff2json::path_codec::decode_id;
/// assert_eq!(decode_id("menu.file_$DOT$_open"), vec!["menu", "file.open"]);
/// ```
pub fn decode_id(id: &str) -> Vec<String> {
    id.split('.')
        .map(|segment| segment.replace(DOT_ESCAPE, "."))
        .collect()
}

/// Serializes a leaf value into XLIFF text, tagging anything that is not a string.
pub fn encode_scalar(value: &Value) -> String {
    match ScalarTag::of(value) {
        None => value.as_str().unwrap_or_default().to_string(),
        Some(tag) => match value {
            Value::Number(n) => format!("_${tag}$_{n}"),
            Value::Bool(b) => format!("_${tag}$_{b}"),
            other => format!("_${tag}$_{other}"),
        },
    }
}

/// Like [`encode_scalar`], with a missing value encoded as the empty string.
pub fn encode_optional_scalar(value: Option<&Value>) -> String {
    value.map(encode_scalar).unwrap_or_default()
}

/// Recovers a leaf value from XLIFF text produced by [`encode_scalar`].
///
/// Text without a tag is a plain string. An unrecognized tag name, or a payload
/// that does not parse as its tag's type, yields the payload as a plain string.
pub fn decode_scalar(text: &str) -> Value {
    let Some(captures) = TYPED_SCALAR_REGEX.captures(text) else {
        return Value::String(text.to_string());
    };
    let payload = captures.get(2).map_or("", |m| m.as_str());
    let tag = captures.get(1).map_or("", |m| m.as_str());

    let decoded = match tag.parse::<ScalarTag>() {
        Ok(ScalarTag::Number) => parse_number(payload).map(Value::Number),
        Ok(ScalarTag::Boolean) => Some(Value::Bool(payload == "true")),
        Ok(ScalarTag::Object) => serde_json::from_str::<Value>(payload).ok(),
        Err(_) => None,
    };

    decoded.unwrap_or_else(|| {
        if !tag.is_empty() {
            tracing::debug!(tag, payload, "typed scalar fell back to plain string");
        }
        Value::String(payload.to_string())
    })
}

fn parse_number(payload: &str) -> Option<Number> {
    let trimmed = payload.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Some(Number::from(u));
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

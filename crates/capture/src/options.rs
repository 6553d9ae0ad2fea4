//! Request options and the canonical query string
//!
//! The capture service recomputes the request token over the exact query
//! string it receives, so serialization here is fixed:
//!
//! - entries keep insertion order, no sorting
//! - `url` is set last, replacing a caller-supplied `url` in place
//! - only absent values ([`OptionValue::Null`]) are dropped; `false`, `0`
//!   and `""` are sent as-is
//! - lists repeat the key once per element (`key=a&key=b`)
//! - keys and values are percent-encoded, including `!'()*`

use crate::error::CaptureError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Name of the option carrying the target page URL
pub const URL_OPTION: &str = "url";

// Everything but RFC 3986 unreserved characters.
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Value of a single request option
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Repeated value, serialized as one `key=value` pair per element
    List(Vec<OptionValue>),
    /// Absent value, never serialized
    Null,
}

impl OptionValue {
    /// Returns true if this value is left out of the query string
    pub fn is_absent(&self) -> bool {
        match self {
            OptionValue::Null => true,
            OptionValue::List(items) => items.iter().all(OptionValue::is_absent),
            _ => false,
        }
    }

    fn push_pairs(&self, key: &str, out: &mut Vec<String>) {
        match self {
            OptionValue::Null => {}
            OptionValue::List(items) => {
                for item in items {
                    item.push_pairs(key, out);
                }
            }
            scalar => out.push(format!(
                "{}={}",
                encode_component(key),
                encode_component(&scalar.to_string())
            )),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::String(s) => f.write_str(s),
            OptionValue::Integer(n) => write!(f, "{}", n),
            OptionValue::Float(n) => f.write_str(&render_float(*n)),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::List(items) => {
                let rendered: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                f.write_str(&rendered.join(","))
            }
            OptionValue::Null => Ok(()),
        }
    }
}

/// Render a float the way the service's reference client does
fn render_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        // covers -0.0
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<&String> for OptionValue {
    fn from(value: &String) -> Self {
        OptionValue::String(value.clone())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for OptionValue {
                fn from(value: $t) -> Self {
                    OptionValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for OptionValue {
    fn from(value: f32) -> Self {
        OptionValue::Float(f64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        OptionValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(OptionValue::Null)
    }
}

impl TryFrom<serde_json::Value> for OptionValue {
    type Error = CaptureError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(OptionValue::Null),
            Value::Bool(b) => Ok(OptionValue::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(OptionValue::Integer(i)),
                None => n.as_f64().map(OptionValue::Float).ok_or_else(|| {
                    CaptureError::InvalidArgument(format!("unsupported number: {}", n))
                }),
            },
            Value::String(s) => Ok(OptionValue::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Array(_) | Value::Object(_) => Err(CaptureError::InvalidArgument(
                        "list options may only contain strings, numbers or booleans".to_string(),
                    )),
                    other => OptionValue::try_from(other),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::List),
            Value::Object(_) => Err(CaptureError::InvalidArgument(
                "option values must be strings, numbers, booleans or lists".to_string(),
            )),
        }
    }
}

/// Ordered, open set of request options
///
/// Option names are owned by the capture service, so any name is accepted.
/// Setting a name that is already present replaces its value without moving
/// it, which keeps the serialized order stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    entries: Vec<(String, OptionValue)>,
}

impl RequestOptions {
    /// Create an empty set of options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, returning the updated options
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set an option in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Get an option by name
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove an option, returning its value
    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of options, absent ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no options are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over options in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize into the canonical query string, without a leading `?`
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            value.push_pairs(key, &mut pairs);
        }
        pairs.join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for RequestOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = RequestOptions::new();
        options.extend(iter);
        options
    }
}

impl<K, V> Extend<(K, V)> for RequestOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl TryFrom<serde_json::Value> for RequestOptions {
    type Error = CaptureError;

    /// Convert a JSON object, keeping its key order
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => {
                let mut options = RequestOptions::new();
                for (key, value) in map {
                    options.set(key, OptionValue::try_from(value)?);
                }
                Ok(options)
            }
            serde_json::Value::Null => Ok(RequestOptions::new()),
            _ => Err(CaptureError::InvalidArgument(
                "options must be a JSON object".to_string(),
            )),
        }
    }
}

/// Build the canonical query string for a target page URL
///
/// Caller options come first in their own order, then `url`.
pub fn canonicalize(options: Option<&RequestOptions>, target_url: &str) -> String {
    let mut merged = options.cloned().unwrap_or_default();
    merged.set(URL_OPTION, target_url);
    merged.to_query_string()
}

/// Percent-encode a query component
///
/// `*` comes out as `%2a`, matching the encoder on the service side.
fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT_ENCODE_SET)
        .to_string()
        .replace("%2A", "%2a")
}

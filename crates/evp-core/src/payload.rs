//! # Payload
//!
//! Raw event input: either an already-deserialized JSON value or the
//! serialized JSON text of one. Event sources routinely nest serialized
//! JSON inside string fields (SQS bodies, SNS messages), so envelopes hand
//! those strings on as [`Payload::Text`] and leave deserialization to the
//! model that validates them.

use serde_json::Value;

/// A raw event payload, validated on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A structured JSON value.
    Value(Value),
    /// Serialized JSON text.
    Text(String),
}

impl Payload {
    /// Deserialize into a JSON value. Structured payloads are returned as is.
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Text(t) => serde_json::from_str(&t),
        }
    }

    /// Short description of the payload's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(v) => value_kind(v),
            Self::Text(_) => "text",
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Name of a JSON value's type: `null`, `boolean`, `number`, `string`,
/// `array` or `object`.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Configurable envelope for payloads nested at a fixed location.

use evp_core::payload::value_kind;
use evp_core::{Envelope, ParseError, ParseResult, Payload, ValidationError};
use serde_json::Value;

/// Pulls the value at a JSON pointer out of the payload.
///
/// ```
/// use evp_envelopes::FieldEnvelope;
///
/// // `{"detail": {...}}` -> the detail object
/// let detail = FieldEnvelope::new("detail", "/detail");
/// // `{"Records": [a, b]}` -> a, b
/// let records = FieldEnvelope::new("records", "/Records").each();
/// // `{"body": "{\"id\": 1}"}` -> the body, deserialized by the model
/// let body = FieldEnvelope::new("body", "/body").serialized();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEnvelope {
    name: String,
    pointer: String,
    each: bool,
    serialized: bool,
}

impl FieldEnvelope {
    /// Extract the value at `pointer`.
    ///
    /// A string starting with `/` (or the empty string, for the whole
    /// payload) is an RFC 6901 JSON pointer. Anything else is a single
    /// top-level key taken literally, so `"a/b"` names the key `a/b`.
    pub fn new(name: impl Into<String>, pointer: impl Into<String>) -> Self {
        let pointer = pointer.into();
        let pointer = if pointer.is_empty() || pointer.starts_with('/') {
            pointer
        } else {
            format!("/{}", escape_key(&pointer))
        };
        Self {
            name: name.into(),
            pointer,
            each: false,
            serialized: false,
        }
    }

    /// The value is an array; yield one payload per element.
    pub fn each(mut self) -> Self {
        self.each = true;
        self
    }

    /// String values hold serialized JSON; hand them on as text.
    pub fn serialized(mut self) -> Self {
        self.serialized = true;
        self
    }

    /// The JSON pointer this envelope reads.
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    fn to_payload(&self, value: Value) -> Payload {
        match value {
            Value::String(text) if self.serialized => Payload::Text(text),
            other => Payload::Value(other),
        }
    }
}

/// Escape a key as one JSON pointer reference token. `~` must go first.
fn escape_key(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

impl Envelope for FieldEnvelope {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
        let mut value = payload
            .into_value()
            .map_err(|e| ValidationError::from_serde(self.name.as_str(), &e))?;

        let target = value
            .pointer_mut(&self.pointer)
            .map(Value::take)
            .ok_or_else(|| ValidationError::missing_field(self.name.as_str(), self.pointer.as_str()))?;

        if !self.each {
            return Ok(ParseResult::Single(self.to_payload(target)));
        }

        match target {
            Value::Array(items) => Ok(ParseResult::Many(
                items.into_iter().map(|item| self.to_payload(item)).collect(),
            )),
            other => Err(ValidationError::new(
                self.name.as_str(),
                self.pointer.as_str(),
                format!("expected array, found {}", value_kind(&other)),
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_is_normalized() {
        assert_eq!(FieldEnvelope::new("d", "detail").pointer(), "/detail");
        assert_eq!(FieldEnvelope::new("d", "/a/b").pointer(), "/a/b");
        assert_eq!(FieldEnvelope::new("root", "").pointer(), "");
        assert_eq!(FieldEnvelope::new("k", "a/b").pointer(), "/a~1b");
        assert_eq!(FieldEnvelope::new("k", "x~1").pointer(), "/x~01");
    }

    #[test]
    fn test_bare_key_is_taken_literally() {
        let extracted = FieldEnvelope::new("k", "a/b")
            .extract(json!({"a/b": {"id": 1}, "a": {"b": {"id": 2}}}).into())
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Value(json!({"id": 1}))));

        let extracted = FieldEnvelope::new("k", "x~1")
            .extract(json!({"x~1": 1, "x/": 2}).into())
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Value(json!(1))));
    }

    #[test]
    fn test_leading_slash_is_a_pointer() {
        let extracted = FieldEnvelope::new("k", "/a/b")
            .extract(json!({"a/b": {"id": 1}, "a": {"b": {"id": 2}}}).into())
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Value(json!({"id": 2}))));
    }

    #[test]
    fn test_single_field() {
        let extracted = FieldEnvelope::new("detail", "detail")
            .extract(json!({"detail": {"id": 1}}).into())
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Value(json!({"id": 1}))));
    }

    #[test]
    fn test_nested_pointer() {
        let extracted = FieldEnvelope::new("inner", "/a/0/b")
            .extract(json!({"a": [{"b": 5}]}).into())
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Value(json!(5))));
    }

    #[test]
    fn test_each_fans_out() {
        let extracted = FieldEnvelope::new("records", "Records")
            .each()
            .extract(json!({"Records": [{"a": 1}, {"a": 2}]}).into())
            .unwrap();
        assert_eq!(extracted.len(), 2);
    }

    #[test]
    fn test_each_requires_array() {
        let err = FieldEnvelope::new("records", "Records")
            .each()
            .extract(json!({"Records": {"a": 1}}).into())
            .unwrap_err();
        assert!(err.to_string().contains("expected array, found object"));
    }

    #[test]
    fn test_serialized_strings_become_text() {
        let extracted = FieldEnvelope::new("body", "body")
            .serialized()
            .extract(json!({"body": "{\"id\": 1}"}).into())
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Text("{\"id\": 1}".to_string())));
    }

    #[test]
    fn test_plain_strings_stay_values() {
        let extracted = FieldEnvelope::new("detail", "detail")
            .extract(json!({"detail": "just text"}).into())
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Value(json!("just text"))));
    }

    #[test]
    fn test_missing_field() {
        let err = FieldEnvelope::new("detail", "detail")
            .extract(json!({"id": 1}).into())
            .unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.model, "detail");
        assert_eq!(validation.violations[0].instance_path, "/detail");
    }

    #[test]
    fn test_accepts_text_payload() {
        let extracted = FieldEnvelope::new("detail", "detail")
            .extract(Payload::from(r#"{"detail": [1]}"#))
            .unwrap();
        assert_eq!(extracted, ParseResult::Single(Payload::Value(json!([1]))));
    }
}

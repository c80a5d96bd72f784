//! EventBridge (and CloudWatch Events) envelope: the payload is `detail`.

use chrono::{DateTime, Utc};
use evp_core::{Envelope, ParseError, ParseResult, Payload, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode_outer;

const MODEL: &str = "EventBridgeEvent";

/// An EventBridge event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBridgeEvent {
    pub version: String,
    pub id: String,
    pub source: String,
    pub account: String,
    pub time: DateTime<Utc>,
    pub region: String,
    pub resources: Vec<String>,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    pub detail: Value,
    #[serde(rename = "replay-name", default, skip_serializing_if = "Option::is_none")]
    pub replay_name: Option<String>,
}

/// Extracts `detail` from an EventBridge event.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBridgeEnvelope;

impl Envelope for EventBridgeEnvelope {
    fn name(&self) -> &str {
        "eventbridge"
    }

    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
        let value = payload
            .into_value()
            .map_err(|e| ValidationError::from_serde(MODEL, &e))?;
        // serde reads an absent `Value` field as null.
        if value.as_object().is_some_and(|event| !event.contains_key("detail")) {
            return Err(ValidationError::missing_field(MODEL, "detail").into());
        }
        let event: EventBridgeEvent = decode_outer(MODEL, Payload::Value(value))?;
        tracing::debug!(source = %event.source, detail_type = %event.detail_type, "unwrapped EventBridge event");
        Ok(ParseResult::Single(Payload::Value(event.detail)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evp_core::Typed;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Order {
        id: i64,
        description: String,
    }

    fn event(detail: Value) -> Value {
        json!({
            "version": "0",
            "id": "6a7e8feb-b491-4cf7-a9f1-bf3703467718",
            "detail-type": "OrderPlaced",
            "source": "com.example.orders",
            "account": "111122223333",
            "time": "2024-03-18T21:41:09Z",
            "region": "eu-west-1",
            "resources": [],
            "detail": detail
        })
    }

    #[test]
    fn test_extracts_detail() {
        let envelope: &dyn Envelope = &EventBridgeEnvelope;
        let parsed = envelope
            .parse(event(json!({"id": 1, "description": "x"})).into(), &Typed::<Order>::new())
            .unwrap();
        assert_eq!(
            parsed,
            ParseResult::Single(Order {
                id: 1,
                description: "x".to_string()
            })
        );
    }

    #[test]
    fn test_accepts_serialized_event() {
        let text = serde_json::to_string(&event(json!({"id": 2, "description": "y"}))).unwrap();
        let extracted = EventBridgeEnvelope.extract(Payload::Text(text)).unwrap();
        assert_eq!(
            extracted,
            ParseResult::Single(Payload::Value(json!({"id": 2, "description": "y"})))
        );
    }

    #[test]
    fn test_missing_detail_is_validation_error() {
        let mut raw = event(json!({}));
        raw.as_object_mut().unwrap().remove("detail");
        let err = EventBridgeEnvelope.extract(raw.into()).unwrap_err();
        let validation = err.as_validation().unwrap();
        assert_eq!(validation.model, "EventBridgeEvent");
        assert!(validation.violations[0].message.contains("detail"));
    }

    #[test]
    fn test_bad_time_is_validation_error() {
        let mut raw = event(json!({}));
        raw["time"] = json!("yesterday");
        assert!(matches!(
            EventBridgeEnvelope.extract(raw.into()),
            Err(ParseError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_detail_fails_model() {
        let envelope: &dyn Envelope = &EventBridgeEnvelope;
        let err = envelope
            .parse(event(json!({"id": "x"})).into(), &Typed::<Order>::new())
            .unwrap_err();
        assert_eq!(err.as_validation().unwrap().model, "Order");
    }
}

//! # Parse Dispatch
//!
//! Single-pass parsing (zero or one envelope) and chained parsing
//! (several envelopes).
//!
//! ## Chaining
//!
//! Event sources nest: an SNS notification inside an SQS body, a batch of
//! records inside a routing wrapper. [`chain_parse`] keeps a working set of
//! raw payloads, starting with the input event. Each envelope but the last
//! replaces the working set with everything it extracted from every member,
//! validated only as [`RawEvent`]s and required to be JSON objects. The last
//! envelope validates against the real model and the results are flattened
//! in order.
//!
//! The loop is iterative, so the call depth does not grow with the length
//! of the chain.

use evp_core::payload::value_kind;
use evp_core::{Envelope, Model, ParseError, ParseResult, Payload};
use serde_json::Value;

use crate::passthrough::RawEvent;

/// Shape every intermediate chain stage must produce.
const CHAIN_STAGE_OUTPUT: &str = "RawEvent or list of RawEvent";

/// Validate a payload against `model` with no envelope.
///
/// Serialized text is deserialized first; structured values are validated
/// directly.
///
/// # Errors
///
/// Returns [`ParseError::Validation`] if the payload does not conform to the
/// model. The validation error is passed through unmodified.
pub fn parse<M>(payload: impl Into<Payload>, model: &M) -> Result<M::Output, ParseError>
where
    M: Model + ?Sized,
{
    tracing::debug!(model = model.name(), "parsing and validating event model; no envelope used");
    Ok(model.validate_payload(payload.into())?)
}

/// Unwrap a payload with one envelope and validate what it yields against
/// `model`.
///
/// # Errors
///
/// Returns [`ParseError::Validation`] if the outer event does not match the
/// envelope, or if any extracted payload does not conform to the model.
pub fn parse_with_envelope<M>(
    payload: impl Into<Payload>,
    model: &M,
    envelope: &dyn Envelope,
) -> Result<ParseResult<M::Output>, ParseError>
where
    M: Model + ?Sized,
{
    tracing::debug!(
        model = model.name(),
        envelope = envelope.name(),
        "parsing and validating event model with envelope"
    );
    envelope.parse(payload.into(), model)
}

/// Unwrap a payload through `envelopes`, in order, and validate the final
/// payloads against `model`.
///
/// A chain of one envelope is equivalent to [`parse_with_envelope`] with
/// the result flattened.
///
/// # Errors
///
/// - [`ParseError::InvalidEnvelopeChaining`] if `envelopes` is empty, or an
///   intermediate envelope yields something other than a JSON object.
/// - [`ParseError::Validation`] from any envelope or from the model.
pub fn chain_parse<M>(
    payload: impl Into<Payload>,
    model: &M,
    envelopes: &[&dyn Envelope],
) -> Result<Vec<M::Output>, ParseError>
where
    M: Model + ?Sized,
{
    let Some((last, intermediate)) = envelopes.split_last() else {
        return Err(ParseError::empty_chain());
    };

    let mut events = vec![payload.into()];
    for envelope in intermediate {
        events = unwrap_stage(events, *envelope)?;
        tracing::debug!(envelope = envelope.name(), events = events.len(), "unwrapped chain stage");
    }

    let mut parsed = Vec::with_capacity(events.len());
    for event in events {
        parsed.extend(parse_with_envelope(event, model, *last)?);
    }
    Ok(parsed)
}

/// Run one intermediate stage over the working set.
fn unwrap_stage(events: Vec<Payload>, envelope: &dyn Envelope) -> Result<Vec<Payload>, ParseError> {
    let mut next = Vec::with_capacity(events.len());
    for event in events {
        for value in parse_with_envelope(event, &RawEvent, envelope)? {
            next.push(as_raw_event(value, envelope)?);
        }
    }
    Ok(next)
}

/// Only JSON objects can be handed to the next envelope.
fn as_raw_event(value: Value, envelope: &dyn Envelope) -> Result<Payload, ParseError> {
    match value {
        Value::Object(_) => Ok(Payload::Value(value)),
        other => Err(ParseError::InvalidEnvelopeChaining {
            expected: CHAIN_STAGE_OUTPUT.to_string(),
            received: value_kind(&other).to_string(),
            envelope: envelope.name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evp_core::{Typed, ValidationError};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Order {
        id: i64,
        description: String,
    }

    /// Yields the value under `key`.
    #[derive(Debug)]
    struct Key(&'static str);

    impl Envelope for Key {
        fn name(&self) -> &str {
            self.0
        }

        fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
            let mut value = payload
                .into_value()
                .map_err(|e| ValidationError::from_serde(self.0, &e))?;
            let inner = value
                .get_mut(self.0)
                .map(Value::take)
                .ok_or_else(|| ValidationError::missing_field(self.0, self.0))?;
            Ok(ParseResult::Single(Payload::Value(inner)))
        }
    }

    /// Yields each element of the array under `key`.
    #[derive(Debug)]
    struct Each(&'static str);

    impl Envelope for Each {
        fn name(&self) -> &str {
            self.0
        }

        fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
            match Key(self.0).extract(payload)? {
                ParseResult::Single(Payload::Value(Value::Array(items))) => Ok(ParseResult::Many(
                    items.into_iter().map(Payload::Value).collect(),
                )),
                _ => Err(ValidationError::new(self.0, self.0, "expected array").into()),
            }
        }
    }

    fn order_model() -> Typed<Order> {
        Typed::new()
    }

    #[test]
    fn test_parse_without_envelope() {
        let order = parse(json!({"id": 1, "description": "x"}), &order_model()).unwrap();
        assert_eq!(order.id, 1);
    }

    #[test]
    fn test_parse_text_payload() {
        let order = parse(r#"{"id": 2, "description": "y"}"#, &order_model()).unwrap();
        assert_eq!(order.description, "y");
    }

    #[test]
    fn test_parse_invalid_payload_is_validation_error() {
        let err = parse(json!({"detail": {"id": 1, "description": "x"}}), &order_model()).unwrap_err();
        assert_eq!(err.as_validation().unwrap().model, "Order");
    }

    #[test]
    fn test_parse_with_envelope_single() {
        let result = parse_with_envelope(
            json!({"detail": {"id": 1, "description": "x"}}),
            &order_model(),
            &Key("detail"),
        )
        .unwrap();
        assert_eq!(
            result,
            ParseResult::Single(Order {
                id: 1,
                description: "x".to_string()
            })
        );
    }

    #[test]
    fn test_chain_of_one_matches_single_pass() {
        let payload = json!({"items": [{"id": 1, "description": "a"}, {"id": 2, "description": "b"}]});
        let single = parse_with_envelope(payload.clone(), &order_model(), &Each("items"))
            .unwrap()
            .into_vec();
        let chained = chain_parse(payload, &order_model(), &[&Each("items")]).unwrap();
        assert_eq!(single, chained);
    }

    #[test]
    fn test_chain_flattens_every_stage() {
        let payload = json!({
            "batches": [
                {"items": [{"id": 1, "description": "a"}, {"id": 2, "description": "b"}]},
                {"items": [{"id": 3, "description": "c"}]}
            ]
        });
        let orders = chain_parse(payload, &order_model(), &[&Each("batches"), &Each("items")]).unwrap();
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_chain_of_three() {
        let payload = json!({"outer": {"batches": [{"detail": {"id": 9, "description": "deep"}}]}});
        let orders = chain_parse(
            payload,
            &order_model(),
            &[&Key("outer"), &Each("batches"), &Key("detail")],
        )
        .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].description, "deep");
    }

    #[test]
    fn test_intermediate_stage_is_not_validated_against_model() {
        // The wrapper does not look like an Order; only the last stage must.
        let payload = json!({"wrapper": {"detail": {"id": 4, "description": "d"}, "noise": true}});
        let orders = chain_parse(payload, &order_model(), &[&Key("wrapper"), &Key("detail")]).unwrap();
        assert_eq!(orders[0].id, 4);
    }

    #[test]
    fn test_intermediate_string_is_invalid_chaining() {
        let payload = json!({"detail": "just text"});
        let err = chain_parse(payload, &order_model(), &[&Key("detail"), &Key("body")]).unwrap_err();
        match err {
            ParseError::InvalidEnvelopeChaining {
                expected,
                received,
                envelope,
            } => {
                assert_eq!(expected, CHAIN_STAGE_OUTPUT);
                assert_eq!(received, "string");
                assert_eq!(envelope, "detail");
            }
            other => panic!("Expected InvalidEnvelopeChaining, got: {other}"),
        }
    }

    #[test]
    fn test_intermediate_list_of_non_objects_is_invalid_chaining() {
        let payload = json!({"items": [{"a": 1}, 2]});
        let err = chain_parse(payload, &order_model(), &[&Each("items"), &Key("a")]).unwrap_err();
        assert!(
            matches!(err, ParseError::InvalidEnvelopeChaining { ref received, .. } if received == "number"),
            "got: {err}"
        );
    }

    #[test]
    fn test_empty_chain_is_invalid_chaining() {
        let err = chain_parse(json!({}), &order_model(), &[]).unwrap_err();
        assert!(matches!(err, ParseError::InvalidEnvelopeChaining { .. }));
        assert!(err.to_string().starts_with("envelope chain is empty"), "got: {err}");
    }

    #[test]
    fn test_stage_fanning_out_to_nothing_yields_empty() {
        let orders = chain_parse(json!({"items": []}), &order_model(), &[&Each("items"), &Key("detail")]).unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_validation_error_in_final_stage_propagates() {
        let payload = json!({"items": [{"detail": {"id": 1, "description": "ok"}}, {"detail": {"id": "bad"}}]});
        let err = chain_parse(payload, &order_model(), &[&Each("items"), &Key("detail")]).unwrap_err();
        assert_eq!(err.as_validation().unwrap().model, "Order");
    }

    #[test]
    fn test_validation_error_in_intermediate_stage_propagates() {
        let err = chain_parse(json!({"other": 1}), &order_model(), &[&Key("wrapper"), &Key("detail")]).unwrap_err();
        assert_eq!(err.as_validation().unwrap().model, "wrapper");
    }
}

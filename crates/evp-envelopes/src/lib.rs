//! # evp-envelopes: Event Source Envelopes
//!
//! Each envelope validates the outer shape of one kind of event with serde
//! and hands the inner payload(s) on for validation against the caller's
//! model.
//!
//! | name          | event source                    | yields                        |
//! |---------------|---------------------------------|-------------------------------|
//! | `eventbridge` | EventBridge / CloudWatch Events | `Single(detail)`              |
//! | `sqs`         | SQS batch                       | `Many(body)`                  |
//! | `sns`         | SNS notification                | `Many(Sns.Message)`           |
//! | `sns-sqs`     | SNS fan-out delivered over SQS  | `Many(Message)`               |
//! | `kinesis`     | Kinesis Data Streams            | `Many(base64-decoded data)`   |
//! | `apigw`       | API Gateway REST proxy          | `Single(body)`                |
//!
//! [`FieldEnvelope`] covers any other source that nests its payload at a
//! fixed JSON pointer.
//!
//! The outer event models are public so they can also be used as
//! [`Typed`](evp_core::Typed) models when a handler needs the metadata.

pub mod apigw;
pub mod eventbridge;
pub mod field;
pub mod kinesis;
pub mod resolve;
pub mod sns;
pub mod sqs;

pub use apigw::{ApiGatewayEnvelope, ApiGatewayProxyEvent};
pub use eventbridge::{EventBridgeEnvelope, EventBridgeEvent};
pub use field::FieldEnvelope;
pub use kinesis::{KinesisDataStreamEnvelope, KinesisDataStreamEvent};
pub use resolve::{resolve_envelope, resolve_envelopes, EnvelopeKind};
pub use sns::{SnsEnvelope, SnsEvent, SnsNotification, SnsSqsEnvelope};
pub use sqs::{SqsEnvelope, SqsEvent};

use evp_core::{Model, ParseError, Payload, Typed, ValidationError};
use serde::de::DeserializeOwned;

/// Deserialize an outer event into its serde model.
pub(crate) fn decode_outer<T: DeserializeOwned>(
    model: &'static str,
    payload: Payload,
) -> Result<T, ParseError> {
    Ok(Typed::<T>::named(model).validate_payload(payload)?)
}

/// Check a record's `eventSource` marker.
pub(crate) fn expect_event_source(
    model: &str,
    path: String,
    actual: &str,
    expected: &str,
) -> Result<(), ParseError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ValidationError::new(
            model,
            path,
            format!("expected event source '{expected}', found '{actual}'"),
        )
        .into())
    }
}

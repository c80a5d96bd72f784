//! SQS envelope: one payload per record, taken from the record body.

use std::collections::HashMap;

use evp_core::{Envelope, ParseError, ParseResult, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{decode_outer, expect_event_source};

const SQS_EVENT_SOURCE: &str = "aws:sqs";

/// A batch of SQS messages delivered to a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqsEvent {
    #[serde(rename = "Records")]
    pub records: Vec<SqsRecord>,
}

/// One SQS message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsRecord {
    pub message_id: String,
    pub receipt_handle: String,
    /// Message body. Usually serialized JSON.
    pub body: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_attributes: HashMap<String, Value>,
    pub md5_of_body: String,
    pub event_source: String,
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    pub aws_region: String,
}

impl SqsEvent {
    /// Check every record came from SQS.
    pub(crate) fn check_sources(&self, model: &str) -> Result<(), ParseError> {
        for (i, record) in self.records.iter().enumerate() {
            expect_event_source(
                model,
                format!("/Records/{i}/eventSource"),
                &record.event_source,
                SQS_EVENT_SOURCE,
            )?;
        }
        if self.records.is_empty() {
            tracing::warn!(model, "SQS event contains no records");
        }
        Ok(())
    }
}

/// Extracts each record's body from an SQS batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqsEnvelope;

impl Envelope for SqsEnvelope {
    fn name(&self) -> &str {
        "sqs"
    }

    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
        let event: SqsEvent = decode_outer("SqsEvent", payload)?;
        event.check_sources("SqsEvent")?;
        Ok(ParseResult::Many(
            event
                .records
                .into_iter()
                .map(|record| Payload::Text(record.body))
                .collect(),
        ))
    }
}

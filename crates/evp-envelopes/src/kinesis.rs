//! Kinesis Data Streams envelope: one payload per record, base64-decoded
//! from `kinesis.data`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use evp_core::{Envelope, ParseError, ParseResult, Payload, ValidationError};
use serde::{Deserialize, Serialize};

use crate::{decode_outer, expect_event_source};

const KINESIS_EVENT_SOURCE: &str = "aws:kinesis";
const MODEL: &str = "KinesisDataStreamEvent";

/// A batch of Kinesis records delivered to a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinesisDataStreamEvent {
    #[serde(rename = "Records")]
    pub records: Vec<KinesisDataStreamRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisDataStreamRecord {
    pub event_source: String,
    #[serde(rename = "eventID")]
    pub event_id: String,
    pub event_name: String,
    pub event_version: String,
    #[serde(rename = "eventSourceARN")]
    pub event_source_arn: String,
    pub aws_region: String,
    pub kinesis: KinesisRecordPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisRecordPayload {
    pub kinesis_schema_version: String,
    pub partition_key: String,
    pub sequence_number: String,
    /// Base64-encoded record data.
    pub data: String,
    pub approximate_arrival_timestamp: f64,
}

impl KinesisRecordPayload {
    /// Decode `data` as base64 UTF-8 text.
    pub fn decode_data(&self) -> Result<String, String> {
        let bytes = STANDARD
            .decode(&self.data)
            .map_err(|e| format!("record data is not valid base64: {e}"))?;
        String::from_utf8(bytes).map_err(|e| format!("record data is not valid UTF-8: {e}"))
    }
}

/// Extracts each record's decoded data from a Kinesis batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct KinesisDataStreamEnvelope;

impl Envelope for KinesisDataStreamEnvelope {
    fn name(&self) -> &str {
        "kinesis"
    }

    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
        let event: KinesisDataStreamEvent = decode_outer(MODEL, payload)?;
        if event.records.is_empty() {
            tracing::warn!("Kinesis event contains no records");
        }

        let mut decoded = Vec::with_capacity(event.records.len());
        for (i, record) in event.records.iter().enumerate() {
            expect_event_source(
                MODEL,
                format!("/Records/{i}/eventSource"),
                &record.event_source,
                KINESIS_EVENT_SOURCE,
            )?;
            let data = record
                .kinesis
                .decode_data()
                .map_err(|reason| ValidationError::new(MODEL, format!("/Records/{i}/kinesis/data"), reason))?;
            decoded.push(Payload::Text(data));
        }
        Ok(ParseResult::Many(decoded))
    }
}

//! SNS envelopes.
//!
//! SNS reaches a handler either directly, as a batch of `Records` each
//! holding an `Sns` notification, or fanned out through an SQS queue, where
//! each SQS body is the serialized notification. Both yield the
//! notification `Message`s.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use evp_core::{Envelope, Model, ParseError, ParseResult, Payload, Typed};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sqs::SqsEvent;
use crate::{decode_outer, expect_event_source};

const SNS_EVENT_SOURCE: &str = "aws:sns";

/// A batch of SNS notifications delivered directly to a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnsEvent {
    #[serde(rename = "Records")]
    pub records: Vec<SnsRecord>,
}

/// One SNS record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnsRecord {
    #[serde(rename = "EventSource")]
    pub event_source: String,
    #[serde(rename = "EventVersion")]
    pub event_version: String,
    #[serde(rename = "EventSubscriptionArn")]
    pub event_subscription_arn: String,
    #[serde(rename = "Sns")]
    pub sns: SnsNotification,
}

/// An SNS notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsNotification {
    #[serde(rename = "Type")]
    pub kind: String,
    pub message_id: String,
    pub topic_arn: String,
    #[serde(default)]
    pub subject: Option<String>,
    /// Notification body. Usually serialized JSON.
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub message_attributes: HashMap<String, Value>,
    #[serde(default)]
    pub signature_version: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(rename = "SigningCertUrl", alias = "SigningCertURL", default)]
    pub signing_cert_url: Option<String>,
    #[serde(rename = "UnsubscribeUrl", alias = "UnsubscribeURL", default)]
    pub unsubscribe_url: Option<String>,
}

/// Extracts each notification `Message` from an SNS batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnsEnvelope;

impl Envelope for SnsEnvelope {
    fn name(&self) -> &str {
        "sns"
    }

    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
        let event: SnsEvent = decode_outer("SnsEvent", payload)?;
        for (i, record) in event.records.iter().enumerate() {
            expect_event_source(
                "SnsEvent",
                format!("/Records/{i}/EventSource"),
                &record.event_source,
                SNS_EVENT_SOURCE,
            )?;
        }
        if event.records.is_empty() {
            tracing::warn!("SNS event contains no records");
        }
        Ok(ParseResult::Many(
            event
                .records
                .into_iter()
                .map(|record| Payload::Text(record.sns.message))
                .collect(),
        ))
    }
}

/// Extracts the `Message` of every SNS notification carried in an SQS
/// batch (SNS subscription to an SQS queue, without raw delivery).
#[derive(Debug, Clone, Copy, Default)]
pub struct SnsSqsEnvelope;

impl Envelope for SnsSqsEnvelope {
    fn name(&self) -> &str {
        "sns-sqs"
    }

    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError> {
        let event: SqsEvent = decode_outer("SqsEvent", payload)?;
        event.check_sources("SqsEvent")?;

        let notification = Typed::<SnsNotification>::named("SnsNotification");
        let mut messages = Vec::with_capacity(event.records.len());
        for record in event.records {
            let sns = notification.validate_str(&record.body)?;
            messages.push(Payload::Text(sns.message));
        }
        Ok(ParseResult::Many(messages))
    }
}

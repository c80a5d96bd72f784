//! Name-based envelope resolution for configuration and the CLI.

use std::fmt;
use std::str::FromStr;

use evp_core::{Envelope, ParseError};

use crate::{
    ApiGatewayEnvelope, EventBridgeEnvelope, KinesisDataStreamEnvelope, SnsEnvelope,
    SnsSqsEnvelope, SqsEnvelope,
};

/// The built-in envelopes, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    EventBridge,
    Sqs,
    Sns,
    SnsSqs,
    Kinesis,
    ApiGateway,
}

impl EnvelopeKind {
    /// Every built-in envelope, in display order.
    pub const ALL: [EnvelopeKind; 6] = [
        Self::EventBridge,
        Self::Sqs,
        Self::Sns,
        Self::SnsSqs,
        Self::Kinesis,
        Self::ApiGateway,
    ];

    /// The name used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EventBridge => "eventbridge",
            Self::Sqs => "sqs",
            Self::Sns => "sns",
            Self::SnsSqs => "sns-sqs",
            Self::Kinesis => "kinesis",
            Self::ApiGateway => "apigw",
        }
    }

    /// Instantiate the envelope.
    pub fn envelope(self) -> Box<dyn Envelope> {
        match self {
            Self::EventBridge => Box::new(EventBridgeEnvelope),
            Self::Sqs => Box::new(SqsEnvelope),
            Self::Sns => Box::new(SnsEnvelope),
            Self::SnsSqs => Box::new(SnsSqsEnvelope),
            Self::Kinesis => Box::new(KinesisDataStreamEnvelope),
            Self::ApiGateway => Box::new(ApiGatewayEnvelope),
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvelopeKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ParseError::InvalidEnvelope {
                envelope: s.to_string(),
            })
    }
}

/// Resolve one envelope name.
///
/// # Errors
///
/// Returns [`ParseError::InvalidEnvelope`] naming `name` if it is not a
/// built-in envelope.
pub fn resolve_envelope(name: &str) -> Result<Box<dyn Envelope>, ParseError> {
    name.parse::<EnvelopeKind>().map(EnvelopeKind::envelope)
}

/// Resolve a sequence of envelope names, preserving order.
pub fn resolve_envelopes<S: AsRef<str>>(names: &[S]) -> Result<Vec<Box<dyn Envelope>>, ParseError> {
    names.iter().map(|name| resolve_envelope(name.as_ref())).collect()
}

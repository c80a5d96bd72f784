//! # Envelope Contract
//!
//! An envelope knows how an event source wraps the data a handler cares
//! about: EventBridge puts it under `detail`, SQS puts one serialized body
//! per record, and so on. Implementations only pull the inner payloads out
//! (and check the outer shape while doing so); validation against the
//! caller's model is shared by every envelope through
//! [`dyn Envelope::parse`](trait.Envelope.html#method.parse).
//!
//! The trait is object-safe so that chains of heterogeneous envelopes can be
//! held as `&[&dyn Envelope]` and resolved from names at runtime.

use std::fmt;

use crate::error::ParseError;
use crate::model::Model;
use crate::payload::Payload;
use crate::result::ParseResult;

/// Extraction strategy for one layer of event wrapping.
pub trait Envelope: fmt::Debug + Send + Sync {
    /// Stable name used in logs, errors and configuration.
    fn name(&self) -> &str;

    /// Pull the wrapped payload(s) out of `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Validation`] if the outer event does not have
    /// the shape this envelope expects, including when the field holding the
    /// inner payload is absent.
    fn extract(&self, payload: Payload) -> Result<ParseResult<Payload>, ParseError>;
}

impl dyn Envelope + '_ {
    /// Extract the wrapped payload(s) and validate each against `model`.
    ///
    /// Every returned value has been validated; a failure on any inner
    /// payload fails the whole call.
    pub fn parse<M>(&self, payload: Payload, model: &M) -> Result<ParseResult<M::Output>, ParseError>
    where
        M: Model + ?Sized,
    {
        let input = payload.kind();
        let extracted = self.extract(payload)?;
        tracing::trace!(envelope = self.name(), input, count = extracted.len(), "extracted inner payloads");
        extracted
            .try_map(|inner| model.validate_payload(inner))
            .map_err(ParseError::from)
    }
}

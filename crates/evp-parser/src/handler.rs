//! # Handler Wrapper
//!
//! [`EventParser`] binds a model and an envelope configuration once, then
//! parses every incoming event and passes the result, together with the
//! invocation context, to a handler. It chooses the parse path from the
//! number of configured envelopes:
//!
//! | envelopes | path                    | handler receives                   |
//! |-----------|-------------------------|------------------------------------|
//! | none      | [`parse`]               | `ParseResult::Single`              |
//! | one       | [`parse_with_envelope`] | whatever the envelope yields       |
//! | several   | [`chain_parse`]         | `ParseResult::Many`, flattened     |
//!
//! If parsing fails the handler is not called and the error is returned.

use std::fmt;

use evp_core::{Envelope, Model, ParseError, ParseResult, Payload};

use crate::parse::{chain_parse, parse, parse_with_envelope};

/// Parses events for a handler.
pub struct EventParser<M> {
    model: M,
    envelopes: Vec<Box<dyn Envelope>>,
}

impl<M: Model> EventParser<M> {
    /// Parse events directly against `model`, without an envelope.
    pub fn new(model: M) -> Self {
        Self {
            model,
            envelopes: Vec::new(),
        }
    }

    /// Append an envelope to the chain.
    pub fn envelope(mut self, envelope: impl Envelope + 'static) -> Self {
        self.envelopes.push(Box::new(envelope));
        self
    }

    /// Replace the envelope chain.
    pub fn with_envelopes(mut self, envelopes: Vec<Box<dyn Envelope>>) -> Self {
        self.envelopes = envelopes;
        self
    }

    /// The model events are validated against.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Names of the configured envelopes, in application order.
    pub fn envelope_names(&self) -> Vec<&str> {
        self.envelopes.iter().map(|e| e.name()).collect()
    }

    /// Parse one event along the path chosen by the envelope count.
    pub fn parse(&self, event: impl Into<Payload>) -> Result<ParseResult<M::Output>, ParseError> {
        match self.envelopes.as_slice() {
            [] => parse(event, &self.model).map(ParseResult::Single),
            [envelope] => parse_with_envelope(event, &self.model, envelope.as_ref()),
            envelopes => {
                let chain: Vec<&dyn Envelope> = envelopes.iter().map(|e| e.as_ref()).collect();
                chain_parse(event, &self.model, &chain).map(ParseResult::Many)
            }
        }
    }

    /// Parse `event`, then call `handler` with the result and `context`.
    ///
    /// # Errors
    ///
    /// Returns the parse error without calling `handler`.
    pub fn handle<C, R, F>(&self, event: impl Into<Payload>, context: C, handler: F) -> Result<R, ParseError>
    where
        F: FnOnce(ParseResult<M::Output>, C) -> R,
    {
        let parsed = self.parse(event)?;
        tracing::debug!(
            model = self.model.name(),
            events = parsed.len(),
            handler = std::any::type_name::<F>(),
            "calling handler"
        );
        Ok(handler(parsed, context))
    }
}

impl<M: Model> fmt::Debug for EventParser<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventParser")
            .field("model", &self.model.name())
            .field("envelopes", &self.envelope_names())
            .finish()
    }
}

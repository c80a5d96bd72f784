//! # evp-parser: Envelope Parsing
//!
//! Validates raw event payloads against a [`Model`](evp_core::Model), after
//! unwrapping them through zero, one, or a chain of
//! [`Envelope`](evp_core::Envelope)s.
//!
//! ## Entry Points
//!
//! - [`parse`]: no envelope; the payload is the model's input.
//! - [`parse_with_envelope`]: one envelope; returns whatever shape the
//!   envelope yields (one value, or one per batch record).
//! - [`chain_parse`]: several envelopes applied left to right. Intermediate
//!   stages keep payloads as raw JSON objects; only the last envelope sees
//!   the real model. Results are flattened across every fan-out.
//! - [`EventParser`]: picks one of the above from its configured envelope
//!   count, then calls a handler with the parsed event.
//!
//! ## Crate Policy
//!
//! - Validation errors propagate unmodified; nothing is logged and
//!   swallowed, nothing is retried.
//! - The passthrough model used between chain stages is private to this
//!   crate and can never be the final result type.

pub mod handler;
pub mod parse;
mod passthrough;

pub use handler::EventParser;
pub use parse::{chain_parse, parse, parse_with_envelope};

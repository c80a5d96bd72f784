//! # evp-core: Foundational Types for Envelope Parsing
//!
//! This crate defines the contracts every other crate in the workspace
//! builds on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One payload type.** Raw input is either a structured JSON value or
//!    the serialized text of one. Both flow through [`Payload`], so models
//!    and envelopes never branch on ad-hoc string checks.
//!
//! 2. **Explicit single/many results.** Envelopes over batch event sources
//!    yield several sub-events. [`ParseResult`] makes that a sum type, and
//!    flattening is [`ParseResult::into_vec`].
//!
//! 3. **Contracts as traits.** [`Model`] is the schema-validation engine,
//!    [`Envelope`] is the extraction strategy. Both are `Send + Sync`.
//!
//! 4. **One failure surface.** Every parse path returns [`ParseError`];
//!    schema mismatches are carried unmodified in [`ValidationError`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `evp-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod envelope;
pub mod error;
pub mod model;
pub mod payload;
pub mod result;

pub use envelope::Envelope;
pub use error::{ParseError, ValidationError, Violation};
pub use model::{Model, Typed};
pub use payload::Payload;
pub use result::ParseResult;

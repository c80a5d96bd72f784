//! # evp-schema: JSON Schema Models
//!
//! Provides a dynamic [`Model`](evp_core::Model) engine for payloads whose
//! shape is described by a JSON Schema document rather than a Rust type.
//!
//! ## Models (`model`)
//!
//! [`JsonSchemaModel`] compiles a schema document (Draft 2020-12) once and
//! validates any number of payloads against it. A document that does not
//! compile is rejected with `ParseError::InvalidModelType` at construction.
//! The [`UnknownFields`] policy decides whether keys not named by the schema
//! are accepted.
//!
//! ## Registry (`registry`)
//!
//! [`SchemaRegistry`] loads every `*.schema.json` in a directory and builds
//! named models whose cross-schema `$ref`s resolve locally, never over the
//! network. [`load_document`] reads event documents from JSON or YAML files.
//!
//! ## Crate Policy
//!
//! - Depends only on `evp-core` internally.
//! - Schema validation failures are reported with the instance path, the
//!   schema path, and the engine's message for every violation.

pub mod model;
pub mod registry;

pub use model::{JsonSchemaModel, UnknownFields};
pub use registry::{load_document, load_schema_file, parse_document, SchemaError, SchemaRegistry};

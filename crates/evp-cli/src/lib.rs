//! # evp-cli: Envelope Parsing Command-Line Interface
//!
//! ## Subcommands
//!
//! - `parse`: validate an event file against a JSON Schema model, after
//!   unwrapping the configured envelopes, and print the result as JSON
//! - `envelopes`: list the built-in envelope names
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the library crates; no parsing rules here.
//! - Results go to stdout, logs to stderr.

pub mod config;
pub mod parse;

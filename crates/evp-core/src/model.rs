//! # Model Contract
//!
//! A [`Model`] is the schema-validation engine: it turns a dynamic JSON
//! structure (or its serialized text) into a typed value, or reports why it
//! cannot. A model is a type description, not a value; one model validates
//! any number of payloads.
//!
//! [`Typed<T>`] is the serde-backed engine for Rust types. Its unknown-field
//! policy is the type's own: add `#[serde(deny_unknown_fields)]` to reject
//! extra keys, leave it off to ignore them.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValidationError;
use crate::payload::Payload;

/// Validates dynamic structures against a named schema.
pub trait Model: Send + Sync {
    /// The typed value produced by successful validation.
    type Output;

    /// Human-readable model name used in error messages and logs.
    fn name(&self) -> &str;

    /// Validate a structured JSON value.
    fn validate(&self, value: Value) -> Result<Self::Output, ValidationError>;

    /// Deserialize serialized JSON text, then validate it.
    fn validate_str(&self, text: &str) -> Result<Self::Output, ValidationError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ValidationError::from_serde(self.name(), &e))?;
        self.validate(value)
    }

    /// Validate a payload in either form.
    fn validate_payload(&self, payload: Payload) -> Result<Self::Output, ValidationError> {
        match payload {
            Payload::Value(value) => self.validate(value),
            Payload::Text(text) => self.validate_str(&text),
        }
    }
}

/// Serde-backed model for any deserializable Rust type.
pub struct Typed<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    /// Model named after the type itself (without its module path).
    pub fn new() -> Self {
        Self {
            name: short_type_name::<T>(),
            _marker: PhantomData,
        }
    }

    /// Model with an explicit name.
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Typed<T> {}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Typed").field(&self.name).finish()
    }
}

impl<T: DeserializeOwned> Model for Typed<T> {
    type Output = T;

    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, value: Value) -> Result<T, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::from_serde(self.name, &e))
    }

    fn validate_str(&self, text: &str) -> Result<T, ValidationError> {
        serde_json::from_str(text).map_err(|e| ValidationError::from_serde(self.name, &e))
    }
}

/// `std::any::type_name` without the module path, e.g. `Order` rather than
/// `my_crate::orders::Order`. Generic names are kept whole.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}

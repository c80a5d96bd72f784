//! # evp-idempotency: Idempotency Serialization
//!
//! An idempotency layer stores a handler's result keyed by the event that
//! produced it, and replays the stored result when the same event arrives
//! again. Stores hold JSON object maps; an [`IdempotencySerializer`]
//! converts handler data to and from that form.
//!
//! - [`NoOpSerializer`]: the data already is a map.
//! - [`CustomDictSerializer`]: two caller-supplied conversion functions.
//! - [`ModelSerializer`]: serde on the way out, the [`Model`] contract on
//!   the way back in, so a replayed record is validated exactly like a
//!   freshly parsed event.

use std::fmt;

use evp_core::{Model, ValidationError};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A JSON object map, the form idempotency records are stored in.
pub type Dict = Map<String, Value>;

/// Error converting idempotency records.
#[derive(Error, Debug)]
pub enum IdempotencyError {
    /// Serialized data was not a JSON object.
    #[error("model type is not serializable to a JSON object: found {found}")]
    ModelType {
        /// Kind of JSON value the data serialized to.
        found: &'static str,
    },

    /// No model was available to restore records with.
    #[error("no serialization model was supplied")]
    NoSerializationModel,

    /// serde failed to serialize the data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record no longer conforms to the model.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Converts handler data to and from stored records.
pub trait IdempotencySerializer {
    /// The handler data type.
    type Data;

    /// Convert data into a storable map.
    fn to_dict(&self, data: &Self::Data) -> Result<Dict, IdempotencyError>;

    /// Restore data from a stored map.
    fn from_dict(&self, data: Dict) -> Result<Self::Data, IdempotencyError>;
}

/// Data that already is a map passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSerializer;

impl IdempotencySerializer for NoOpSerializer {
    type Data = Dict;

    fn to_dict(&self, data: &Dict) -> Result<Dict, IdempotencyError> {
        Ok(data.clone())
    }

    fn from_dict(&self, data: Dict) -> Result<Dict, IdempotencyError> {
        Ok(data)
    }
}

/// Conversion by caller-supplied functions.
pub struct CustomDictSerializer<T, ToFn, FromFn> {
    to_dict: ToFn,
    from_dict: FromFn,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, ToFn, FromFn> CustomDictSerializer<T, ToFn, FromFn>
where
    ToFn: Fn(&T) -> Dict,
    FromFn: Fn(Dict) -> T,
{
    pub fn new(to_dict: ToFn, from_dict: FromFn) -> Self {
        Self {
            to_dict,
            from_dict,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, ToFn, FromFn> IdempotencySerializer for CustomDictSerializer<T, ToFn, FromFn>
where
    ToFn: Fn(&T) -> Dict,
    FromFn: Fn(Dict) -> T,
{
    type Data = T;

    fn to_dict(&self, data: &T) -> Result<Dict, IdempotencyError> {
        Ok((self.to_dict)(data))
    }

    fn from_dict(&self, data: Dict) -> Result<T, IdempotencyError> {
        Ok((self.from_dict)(data))
    }
}

impl<T, ToFn, FromFn> fmt::Debug for CustomDictSerializer<T, ToFn, FromFn> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomDictSerializer").finish_non_exhaustive()
    }
}

/// Serializes a model's output with serde and restores it through the
/// model's own validation.
#[derive(Debug, Clone)]
pub struct ModelSerializer<M> {
    model: M,
}

impl<M> ModelSerializer<M>
where
    M: Model,
    M::Output: Serialize,
{
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Build a serializer from an optional model, e.g. one inferred from a
    /// handler's declared return type.
    ///
    /// # Errors
    ///
    /// Returns [`IdempotencyError::NoSerializationModel`] for `None`.
    pub fn instantiate(model: Option<M>) -> Result<Self, IdempotencyError> {
        model.map(Self::new).ok_or(IdempotencyError::NoSerializationModel)
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M> IdempotencySerializer for ModelSerializer<M>
where
    M: Model,
    M::Output: Serialize,
{
    type Data = M::Output;

    fn to_dict(&self, data: &M::Output) -> Result<Dict, IdempotencyError> {
        match serde_json::to_value(data)? {
            Value::Object(map) => Ok(map),
            other => Err(IdempotencyError::ModelType {
                found: evp_core::payload::value_kind(&other),
            }),
        }
    }

    fn from_dict(&self, data: Dict) -> Result<M::Output, IdempotencyError> {
        Ok(self.model.validate(Value::Object(data))?)
    }
}

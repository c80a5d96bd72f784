//! Intermediate model for chained envelope stages.
//!
//! Between two envelopes the chain must not coerce payloads into the final
//! type, so every intermediate stage validates against [`RawEvent`], which
//! accepts any structure and returns it untouched. Whether that structure
//! can feed the next envelope is checked by the chain parser afterwards.

use evp_core::{Model, ValidationError};
use serde_json::Value;

/// Accepts any JSON value and returns it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RawEvent;

impl RawEvent {
    pub(crate) const NAME: &'static str = "RawEvent";
}

impl Model for RawEvent {
    type Output = Value;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        Ok(value)
    }
}

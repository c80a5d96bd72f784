//! # Error Types: Parse Failure Taxonomy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Validation errors name the model and carry one [`Violation`] per
//!   failing field, with the instance path and the reason.
//! - Contract errors ([`ParseError::InvalidEnvelope`],
//!   [`ParseError::InvalidModelType`], [`ParseError::InvalidEnvelopeChaining`])
//!   identify the offending envelope or model by name.
//! - Nothing here is retried or recovered; every variant reaches the caller.

use std::fmt;

use thiserror::Error;

/// Top-level error for every parse path.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The payload, or an intermediate unwrapped payload, does not conform
    /// to the expected model.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The supplied envelope does not satisfy the envelope contract.
    #[error("envelope must implement the Envelope contract, envelope={envelope}")]
    InvalidEnvelope {
        /// The offending envelope value, as given by the caller.
        envelope: String,
    },

    /// The supplied model does not satisfy the model contract.
    #[error("input model must implement the Model contract, model={model}: {reason}")]
    InvalidModelType {
        /// Name of the offending model.
        model: String,
        /// Why the model was rejected.
        reason: String,
    },

    /// An intermediate chain stage produced a result of the wrong shape, or
    /// the chain had no envelopes at all.
    #[error("{}", chaining_message(.expected, .received, .envelope))]
    InvalidEnvelopeChaining {
        /// Shape the chain parser expected.
        expected: String,
        /// Shape the envelope actually produced.
        received: String,
        /// Name of the envelope that produced it. Empty for an empty chain.
        envelope: String,
    },
}

fn chaining_message(expected: &str, received: &str, envelope: &str) -> String {
    if envelope.is_empty() {
        format!("envelope chain is empty: expected {expected}")
    } else {
        format!("return type expected is {expected}, received {received} from envelope {envelope}")
    }
}

impl ParseError {
    /// A chain was given no envelopes.
    pub fn empty_chain() -> Self {
        Self::InvalidEnvelopeChaining {
            expected: "at least one envelope".to_string(),
            received: "no envelopes".to_string(),
            envelope: String::new(),
        }
    }

    /// Returns the validation error if this is a schema mismatch.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// A payload failed validation against a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed against model '{model}':\n{}", DisplayViolations(.violations))]
pub struct ValidationError {
    /// Name of the model that was validated against.
    pub model: String,
    /// Individual violations, in the order the engine reported them.
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Build an error carrying a single violation.
    pub fn new(
        model: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            violations: vec![Violation {
                instance_path: path.into(),
                schema_path: String::new(),
                message: message.into(),
            }],
        }
    }

    /// Build an error from a serde deserialization failure.
    ///
    /// serde does not report field paths, so the violation sits at the root
    /// and the message carries serde's own description (which names the
    /// field and the line/column for text input).
    pub fn from_serde(model: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::new(model, "", err.to_string())
    }

    /// Build an error for a required field that is absent from the payload.
    pub fn missing_field(model: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("required field '{path}' is missing");
        Self::new(model, path, message)
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the payload.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    /// Empty for engines without a schema document.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

struct DisplayViolations<'a>(&'a [Violation]);

impl fmt::Display for DisplayViolations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

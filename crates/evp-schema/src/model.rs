//! # JSON Schema Model
//!
//! Runtime validation of payloads against a compiled JSON Schema
//! (Draft 2020-12). The model's output is the validated value itself:
//! JSON Schema checks shape, it does not coerce.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use evp_core::{Model, ParseError, ValidationError, Violation};
use jsonschema::{ValidationOptions, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::LocalSchemaRetriever;

/// How a model treats top-level keys its schema does not name.
///
/// The policy is applied with `unevaluatedProperties`, which sees properties
/// declared through `allOf`, `anyOf`, `oneOf` and `$ref`. Only the root
/// schema is rewritten; subschemas keep their own keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Keep whatever the schema declares.
    #[default]
    Inherit,
    /// Accept unknown keys (root `additionalProperties` and
    /// `unevaluatedProperties` set to `true`).
    Allow,
    /// Reject unknown keys (root `unevaluatedProperties: false`).
    Deny,
}

impl UnknownFields {
    /// Rewrite the root of `schema` according to this policy.
    ///
    /// Boolean schemas have no properties to police and are left unchanged.
    fn apply(self, schema: &mut Value) {
        let Some(root) = schema.as_object_mut() else {
            return;
        };
        match self {
            Self::Inherit => {}
            Self::Allow => {
                root.insert("additionalProperties".to_string(), Value::Bool(true));
                root.insert("unevaluatedProperties".to_string(), Value::Bool(true));
            }
            Self::Deny => {
                // A permissive `additionalProperties` evaluates every extra
                // key, which would leave nothing for `unevaluatedProperties`.
                if root.get("additionalProperties") != Some(&Value::Bool(false)) {
                    root.remove("additionalProperties");
                }
                root.insert("unevaluatedProperties".to_string(), Value::Bool(false));
            }
        }
    }
}

impl FromStr for UnknownFields {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inherit" => Ok(Self::Inherit),
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            other => Err(format!(
                "unknown fields policy must be one of inherit, allow, deny; got '{other}'"
            )),
        }
    }
}

impl fmt::Display for UnknownFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inherit => "inherit",
            Self::Allow => "allow",
            Self::Deny => "deny",
        })
    }
}

/// A compiled JSON Schema behind the [`Model`] contract.
///
/// Cloning is cheap; the compiled validator is shared.
#[derive(Clone)]
pub struct JsonSchemaModel {
    name: String,
    schema: Arc<Value>,
    validator: Arc<Validator>,
    unknown_fields: UnknownFields,
}

impl JsonSchemaModel {
    /// Compile a standalone schema document with the schema's own
    /// unknown-field policy.
    ///
    /// `$ref`s to other documents are not fetched; use
    /// [`SchemaRegistry`](crate::SchemaRegistry) for multi-file schemas.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidModelType`] if `schema` is neither an
    /// object nor a boolean, or does not compile.
    pub fn compile(name: impl Into<String>, schema: Value) -> Result<Self, ParseError> {
        Self::compile_with(name, schema, UnknownFields::Inherit)
    }

    /// Compile a standalone schema document under an unknown-field policy.
    pub fn compile_with(
        name: impl Into<String>,
        schema: Value,
        unknown_fields: UnknownFields,
    ) -> Result<Self, ParseError> {
        let retriever = LocalSchemaRetriever::default();
        Self::build(name.into(), schema, unknown_fields, offline_options(retriever))
    }

    pub(crate) fn build(
        name: String,
        mut schema: Value,
        unknown_fields: UnknownFields,
        opts: ValidationOptions,
    ) -> Result<Self, ParseError> {
        if !(schema.is_object() || schema.is_boolean()) {
            return Err(ParseError::InvalidModelType {
                model: name,
                reason: format!(
                    "schema document must be a JSON object or boolean, found {}",
                    evp_core::payload::value_kind(&schema)
                ),
            });
        }

        unknown_fields.apply(&mut schema);

        let validator = opts.build(&schema).map_err(|e| ParseError::InvalidModelType {
            model: name.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!(model = %name, %unknown_fields, "compiled JSON schema model");

        Ok(Self {
            name,
            schema: Arc::new(schema),
            validator: Arc::new(validator),
            unknown_fields,
        })
    }

    /// The schema document as compiled, after the unknown-field policy.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The unknown-field policy this model was compiled with.
    pub fn unknown_fields(&self) -> UnknownFields {
        self.unknown_fields
    }

    /// Returns true if `value` is valid, without collecting violations.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }
}

impl fmt::Debug for JsonSchemaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaModel")
            .field("name", &self.name)
            .field("unknown_fields", &self.unknown_fields)
            .finish_non_exhaustive()
    }
}

impl Model for JsonSchemaModel {
    type Output = Value;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(&value)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                model: self.name.clone(),
                violations,
            })
        }
    }
}

/// Draft 2020-12 options whose `$ref` resolution never leaves `retriever`.
pub(crate) fn offline_options(retriever: LocalSchemaRetriever) -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.with_retriever(retriever);
    opts
}

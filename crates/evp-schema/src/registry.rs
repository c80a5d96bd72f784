//! # Schema Registry
//!
//! Loads a directory of JSON Schema documents and builds named
//! [`JsonSchemaModel`]s from them.
//!
//! ## Schema Resolution
//!
//! Schemas are indexed by filename (e.g. `order.schema.json`) and by their
//! `$id`, if they declare one. Cross-schema `$ref`s resolve against that
//! index through [`LocalSchemaRetriever`]; a reference that is not in the
//! index fails compilation instead of triggering a network request.
//! Internal `$ref`s of the form `#/$defs/<name>` are resolved by the
//! jsonschema crate natively.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use evp_core::ParseError;
use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use thiserror::Error;

use crate::model::{offline_options, JsonSchemaModel, UnknownFields};

/// Suffix identifying schema documents in a registry directory.
const SCHEMA_SUFFIX: &str = ".schema.json";

/// Resolves `$ref` URIs against schemas held in memory.
#[derive(Debug, Default)]
pub(crate) struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Relative refs arrive resolved against the referring schema's base
        // URI; fall back to the bare filename.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("schema '{uri_str}' is not available locally").into())
    }
}

/// Error loading schemas or documents.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema file could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    Load {
        /// Schema filename or directory.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// No schema with this name is registered.
    #[error("schema '{schema_name}' not found in {schema_dir}")]
    NotFound {
        /// Requested schema filename.
        schema_name: String,
        /// Directory the registry was loaded from.
        schema_dir: String,
    },

    /// An event document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The schema loaded but is not a usable model.
    #[error(transparent)]
    Model(#[from] ParseError),

    /// IO error reading a schema.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A directory of JSON Schema documents.
#[derive(Debug)]
pub struct SchemaRegistry {
    schema_dir: PathBuf,
    schemas: HashMap<String, Value>,
}

impl SchemaRegistry {
    /// Load every `*.schema.json` file in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Load`] if the directory cannot be read or any
    /// schema file is not valid JSON.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut schemas = HashMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| SchemaError::Load {
            schema_name: schema_dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(SCHEMA_SUFFIX) {
                continue;
            }
            let content = std::fs::read_to_string(&path)?;
            let value: Value = serde_json::from_str(&content).map_err(|e| SchemaError::Load {
                schema_name: name.to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;
            schemas.insert(name.to_string(), value);
        }

        tracing::debug!(
            dir = %schema_dir.display(),
            count = schemas.len(),
            "loaded schema registry"
        );

        Ok(Self { schema_dir, schemas })
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a loaded schema document by filename.
    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Build the model for a named schema, with every other schema in the
    /// registry available for `$ref` resolution.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotFound`] for an unknown name and
    /// [`SchemaError::Model`] (wrapping `InvalidModelType`) if the schema
    /// does not compile.
    pub fn model(
        &self,
        schema_name: &str,
        unknown_fields: UnknownFields,
    ) -> Result<JsonSchemaModel, SchemaError> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| SchemaError::NotFound {
                schema_name: schema_name.to_string(),
                schema_dir: self.schema_dir.display().to_string(),
            })?;

        let model = JsonSchemaModel::build(
            schema_name.to_string(),
            schema.clone(),
            unknown_fields,
            offline_options(self.retriever()),
        )?;
        Ok(model)
    }

    /// Index every schema by filename and by its own `$id`.
    fn retriever(&self) -> LocalSchemaRetriever {
        let mut schemas_by_uri = HashMap::new();
        for (filename, value) in &self.schemas {
            if let Some(id) = value.get("$id").and_then(Value::as_str) {
                schemas_by_uri.insert(id.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }
        LocalSchemaRetriever { schemas_by_uri }
    }
}

/// Load a single schema file as a model named after the file.
pub fn load_schema_file(
    path: &Path,
    unknown_fields: UnknownFields,
) -> Result<JsonSchemaModel, SchemaError> {
    let schema = load_document(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("schema")
        .to_string();
    Ok(JsonSchemaModel::compile_with(name, schema, unknown_fields)?)
}

/// Load a JSON or YAML document from a file.
///
/// `.yaml`/`.yml` files are parsed as YAML; anything else as JSON.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_document(&content, matches!(ext, "yaml" | "yml")).map_err(|reason| {
        SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason,
        }
    })
}

/// Parse document text as YAML or JSON.
pub fn parse_document(content: &str, yaml: bool) -> Result<Value, String> {
    if yaml {
        serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))
    } else {
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))
    }
}

//! # Parser Configuration
//!
//! A YAML file describing the model and envelope chain, so a deployment
//! can pin its parsing setup next to its schemas:
//!
//! ```yaml
//! schema_dir: schemas/
//! model: order.schema.json
//! envelopes: [sqs, eventbridge]
//! unknown_fields: deny
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file. Command-line flags override individual fields.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use evp_schema::{load_schema_file, JsonSchemaModel, SchemaRegistry, UnknownFields};
use serde::Deserialize;

/// Model and envelope configuration for the `parse` subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// A standalone JSON Schema file.
    #[serde(default)]
    pub schema: Option<PathBuf>,
    /// A directory of `*.schema.json` files, used with `model`.
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
    /// Schema filename inside `schema_dir`.
    #[serde(default)]
    pub model: Option<String>,
    /// Envelope names, applied left to right.
    #[serde(default)]
    pub envelopes: Vec<String>,
    #[serde(default)]
    pub unknown_fields: UnknownFields,
}

impl ParserConfig {
    /// Load a config file, resolving relative paths against its directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.schema = config.schema.map(|p| base.join(p));
        config.schema_dir = config.schema_dir.map(|p| base.join(p));
        Ok(config)
    }

    /// Build the model this configuration names.
    ///
    /// Exactly one of `schema` or `schema_dir` + `model` must be set.
    pub fn build_model(&self) -> anyhow::Result<JsonSchemaModel> {
        match (&self.schema, &self.schema_dir, &self.model) {
            (Some(schema), None, None) => load_schema_file(schema, self.unknown_fields)
                .with_context(|| format!("cannot build model from {}", schema.display())),
            (None, Some(dir), Some(name)) => {
                let registry = SchemaRegistry::new(dir)?;
                registry
                    .model(name, self.unknown_fields)
                    .with_context(|| format!("cannot build model {name}"))
            }
            (None, Some(_), None) => bail!("schema_dir is set but no model name was given"),
            (None, None, Some(name)) => bail!("model {name} needs a schema_dir"),
            (None, None, None) => bail!("no schema configured: set schema, or schema_dir and model"),
            (Some(_), _, _) => bail!("schema cannot be combined with schema_dir or model"),
        }
    }
}

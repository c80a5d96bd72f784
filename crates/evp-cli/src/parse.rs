//! # Parse Subcommand
//!
//! Validates one event against a JSON Schema model, unwrapping the
//! configured envelopes first, and renders the parsed result as JSON.
//!
//! ```text
//! evp parse event.json --schema order.schema.json -e sqs -e eventbridge
//! evp parse - --config parser.yaml < event.json
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use evp_core::{Model, ParseResult, Payload};
use evp_envelopes::resolve_envelopes;
use evp_parser::EventParser;
use evp_schema::{load_document, UnknownFields};
use serde_json::Value;

use crate::config::ParserConfig;

/// Arguments for the parse subcommand.
#[derive(Args, Debug, Default)]
pub struct ParseArgs {
    /// Event file (JSON, or YAML with a .yaml/.yml extension). `-` reads stdin.
    pub event: PathBuf,

    /// YAML parser configuration. Flags below override its fields.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON Schema file to validate against.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Directory of *.schema.json files; use with --model.
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,

    /// Schema filename inside --schema-dir.
    #[arg(long)]
    pub model: Option<String>,

    /// Envelope to unwrap, repeatable; applied in the order given.
    #[arg(long = "envelope", short = 'e')]
    pub envelopes: Vec<String>,

    /// Unknown-field policy: inherit, allow, or deny.
    #[arg(long)]
    pub unknown_fields: Option<UnknownFields>,

    /// Print compact JSON instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,
}

impl ParseArgs {
    /// The effective configuration: the config file, if any, with flags on top.
    pub fn resolve_config(&self) -> anyhow::Result<ParserConfig> {
        let mut config = match &self.config {
            Some(path) => ParserConfig::load(path)?,
            None => ParserConfig::default(),
        };

        if self.schema.is_some() {
            config.schema = self.schema.clone();
            config.schema_dir = None;
            config.model = None;
        }
        if self.schema_dir.is_some() {
            config.schema_dir = self.schema_dir.clone();
            config.schema = None;
        }
        if self.model.is_some() {
            config.model = self.model.clone();
            config.schema = None;
        }
        if !self.envelopes.is_empty() {
            config.envelopes = self.envelopes.clone();
        }
        if let Some(policy) = self.unknown_fields {
            config.unknown_fields = policy;
        }
        Ok(config)
    }
}

/// Run the parse subcommand and return the parsed event(s).
///
/// A single result renders as the value itself; a batch as an array.
pub fn run_parse(args: &ParseArgs) -> anyhow::Result<Value> {
    let config = args.resolve_config()?;
    let model = config.build_model()?;
    let envelopes = resolve_envelopes(&config.envelopes)?;
    let parser = EventParser::new(model).with_envelopes(envelopes);

    tracing::info!(
        model = parser.model().name(),
        envelopes = ?parser.envelope_names(),
        event = %args.event.display(),
        "parsing event"
    );

    let event = read_event(&args.event)?;
    let parsed = parser.parse(event)?;
    Ok(match parsed {
        ParseResult::Single(value) => value,
        ParseResult::Many(values) => Value::Array(values),
    })
}

/// Render parse output for stdout.
pub fn render(value: &Value, compact: bool) -> anyhow::Result<String> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(rendered)
}

fn read_event(path: &Path) -> anyhow::Result<Payload> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read event from stdin")?;
        return Ok(Payload::Text(text));
    }
    Ok(Payload::Value(load_document(path)?))
}

//! # evp CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;
use evp_envelopes::EnvelopeKind;

/// Event envelope parser.
///
/// Unwraps event-source envelopes (SQS, SNS, EventBridge, Kinesis, API
/// Gateway) and validates the payload against a JSON Schema model.
#[derive(Parser, Debug)]
#[command(name = "evp", version, about)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Parse and validate an event.
    Parse(evp_cli::parse::ParseArgs),
    /// List the built-in envelope names.
    Envelopes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Parse(args) => {
            let parsed = evp_cli::parse::run_parse(&args)?;
            println!("{}", evp_cli::parse::render(&parsed, args.compact)?);
        }
        Commands::Envelopes => {
            for kind in EnvelopeKind::ALL {
                println!("{kind}");
            }
        }
    }

    Ok(())
}

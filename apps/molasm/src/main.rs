//! # molasm
//!
//! Assembles molecular assertions into a rule-based model or a
//! process-description graph.
//!
//! ## Usage
//!
//! ```bash
//! molasm rules -i assertions.json -o model.bngl
//! molasm graph -i assertions.json -t sbgn
//! molasm --policy two_step rules -i assertions.json -t json
//! molasm message --from alice '@molasm model: [...]'
//! ```
//!
//! Logs go to stderr so rendered documents on stdout stay clean.

use clap::Parser;
use molasm::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // MOLASM_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("MOLASM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "molasm=debug,molasm_core=debug"
    } else {
        "molasm=info,molasm_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

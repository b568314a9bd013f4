//! # Casetrack - Case Pipeline CLI
//!
//! The main binary for the casetrack date-rule engine.
//!
//! ## Usage
//!
//! ```bash
//! # Where does every case stand today?
//! casetrack stage -f cases.json
//!
//! # As of a fixed date, machine-readable
//! casetrack --json-mode stage -f cases.json --today 2026-06-01
//!
//! # Milestone targets for a self-use case
//! casetrack schedule -d 2026-03-02 -k self-use
//! ```

use casetrack::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments first so --verbose can set the default filter
    let cli = cli::Cli::parse();

    // CASETRACK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CASETRACK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "casetrack=debug,casetrack_core=debug"
    } else {
        "casetrack=info,casetrack_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

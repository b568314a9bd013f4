//! # Casetrack CLI Module
//!
//! This module implements the CLI interface for casetrack.
//!
//! ## Available Commands
//!
//! - `stage` - Classify the cases in a JSON file
//! - `schedule` - Compute milestone targets from a contract date
//! - `stages` - List the pipeline stages

mod commands;

use crate::config::Config;
use casetrack_core::CasetrackError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Casetrack - transaction case pipeline tooling
///
/// Derives where each case sits in the contract → seal → tax → transfer →
/// handover pipeline, and schedules milestone targets.
#[derive(Parser, Debug)]
#[command(name = "casetrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (defaults to ./casetrack.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify every case in a JSON file
    Stage {
        /// Path to the input file (case array or a single milestone object)
        #[arg(short, long)]
        file: PathBuf,

        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(short, long)]
        today: Option<String>,
    },

    /// Compute milestone targets from a contract date
    Schedule {
        /// Contract date (YYYY-MM-DD)
        #[arg(short = 'd', long)]
        contract_date: String,

        /// Case kind (standard, self-use); defaults to the configured kind
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// List the pipeline stages in order
    Stages,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CasetrackError> {
    let json_mode = cli.json_mode;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Stage { file, today }) => cmd_stage(json_mode, &file, today.as_deref()),
        Some(Commands::Schedule {
            contract_date,
            kind,
        }) => cmd_schedule(&config, json_mode, &contract_date, kind.as_deref()),
        Some(Commands::Stages) | None => cmd_stages(json_mode),
    }
}

//! # molasm CLI Module
//!
//! ## Available Commands
//!
//! - `rules` - Assemble a rule-based model (BNGL text or JSON)
//! - `graph` - Assemble a process-description graph (SBGN-ML or JSON)
//! - `message` - Run one chat message through the session bridge

mod commands;

use crate::config::AssemblyConfig;
use clap::{Parser, Subcommand};
use molasm_core::AssemblyError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// molasm - assemble molecular assertions into models and graphs
#[derive(Parser, Debug)]
#[command(name = "molasm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Fallback policy for every assertion kind without an explicit one
    #[arg(long, global = true)]
    pub policy: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a rule-based model
    Rules {
        /// Assertions file (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (bngl, json)
        #[arg(short = 't', long, default_value = "bngl")]
        format: String,

        /// Do not seed monomers with initial amounts
        #[arg(long)]
        no_initials: bool,
    },

    /// Assemble a process-description graph
    Graph {
        /// Assertions file (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (sbgn, json)
        #[arg(short = 't', long, default_value = "sbgn")]
        format: String,
    },

    /// Run a chat message through the session bridge
    Message {
        /// Sender name
        #[arg(long)]
        from: String,

        /// Addressee name
        #[arg(long)]
        to: Option<String>,

        /// Message text
        text: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve configuration: file first, then flag overrides.
pub fn load_config(cli: &Cli) -> Result<AssemblyConfig, AssemblyError> {
    let mut config = match &cli.config {
        Some(path) => AssemblyConfig::from_file(&validate_file_path(path)?)?,
        None => AssemblyConfig::default(),
    };
    if let Some(policy) = &cli.policy {
        config.fallback_policy = policy.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AssemblyError> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Rules {
            input,
            output,
            format,
            no_initials,
        } => cmd_rules(&config, &input, output.as_deref(), &format, no_initials),
        Commands::Graph {
            input,
            output,
            format,
        } => cmd_graph(&config, &input, output.as_deref(), &format),
        Commands::Message { from, to, text } => cmd_message(&config, &from, to.as_deref(), &text),
    }
}

//! # bdi CLI Module
//!
//! ## Available Commands
//!
//! - `check` - Parse a program and summarize it
//! - `run` - Execute reasoning cycles

mod commands;

use crate::program::ProgramError;
use bdi_core::ActionError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error("Execution failed: {0}")]
    Action(#[from] ActionError),
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// bdi - agent program runner
///
/// Loads an agent program and executes its rules with the action core.
#[derive(Parser, Debug)]
#[command(name = "bdi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print every executed action
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the agent program
    #[arg(short, long, global = true, default_value = "agent.toml")]
    pub program: PathBuf,

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
    /// Parse the program and print a summary
    Check,

    /// Run reasoning cycles
    Run {
        /// Maximum number of cycles
        #[arg(short = 'n', long, default_value = "100")]
        cycles: usize,

        /// Seed for reproducible choices
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Some(Commands::Run { cycles, seed }) => {
            cmd_run(&cli.program, cli.json_mode, cli.verbose, cycles, seed)
        }
        // No subcommand - check by default
        Some(Commands::Check) | None => cmd_check(&cli.program, cli.json_mode),
    }
}

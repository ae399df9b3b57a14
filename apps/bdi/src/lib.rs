//! # bdi
//!
//! Command-line runner for agent programs built on `bdi-core`.
//!
//! - [`program`] reads TOML program files and compiles them into a mental
//!   state, action specifications and rules.
//! - [`runner`] drives the rules through a linear reasoning cycle.
//! - [`cli`] exposes both through clap commands.

pub mod cli;
pub mod program;
pub mod runner;

pub use program::{AgentProgram, ProgramError, ProgramFile, Rule};
pub use runner::{CycleReport, RunSummary, StopReason};

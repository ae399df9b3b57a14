//! # CLI Command Implementations

use super::CliError;
use crate::program::AgentProgram;
use crate::runner;
use bdi_core::{DefaultCollaborators, MentalState};
use std::path::Path;

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Load a program and summarize it.
pub fn cmd_check(path: &Path, json_mode: bool) -> Result<(), CliError> {
    let program = AgentProgram::load(path)?;
    let state = &program.state;

    if json_mode {
        let output = serde_json::json!({
            "program": path.to_string_lossy(),
            "agent": state.agent_id().as_str(),
            "known_agents": state.known_agents().iter().map(ToString::to_string).collect::<Vec<_>>(),
            "beliefs": state.beliefs().count(),
            "goals": state.goals().len(),
            "actions": program.specs.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "rules": program.rules.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Agent Program");
    println!("=============");
    println!("Program: {}", path.display());
    println!("Agent:   {}", state.agent_id());
    println!();
    println!("Beliefs: {}", state.beliefs().count());
    println!("Goals:   {}", state.goals().len());
    println!();
    println!("Actions:");
    for spec in &program.specs {
        match spec.source() {
            Some(source) => println!("  {spec}  ({source})"),
            None => println!("  {spec}"),
        }
    }
    println!();
    println!("Rules:");
    for rule in &program.rules {
        println!("  {rule}");
    }

    Ok(())
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Run up to `cycles` reasoning cycles.
pub fn cmd_run(
    path: &Path,
    json_mode: bool,
    verbose: bool,
    cycles: usize,
    seed: Option<u64>,
) -> Result<(), CliError> {
    let mut program = AgentProgram::load(path)?;
    let mut collab = match seed {
        Some(seed) => DefaultCollaborators::seeded(seed),
        None => DefaultCollaborators::new(),
    };

    tracing::info!(program = %path.display(), cycles, ?seed, "starting run");
    let summary = runner::run(&mut program, cycles, &mut collab.context())?;

    if json_mode {
        let output = serde_json::json!({
            "program": path.to_string_lossy(),
            "summary": summary,
            "beliefs": program.state.beliefs().map(ToString::to_string).collect::<Vec<_>>(),
            "goals": program.state.goals().len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    for report in &summary.cycles {
        if verbose {
            println!("cycle {} (rule {}):", report.cycle, report.rule);
            for action in &report.result.actions {
                println!("  {action}");
            }
        }
    }
    println!();
    println!("Cycles:  {}", summary.cycles.len());
    println!("Stopped: {:?}", summary.stopped);
    println!("Goals:   {}", program.state.goals().len());

    Ok(())
}

//! # Reasoning Cycle
//!
//! Linear rule evaluation: each cycle fires the first rule that has an
//! applicable option.

use crate::program::AgentProgram;
use bdi_core::{
    ActionError, ExecutionContext, ExecutionReport, ExecutionResult, Substitution, choose,
};
use serde::Serialize;

/// What one cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle: usize,
    /// Index of the rule that fired.
    pub rule: usize,
    pub result: ExecutionReport,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No rule had an applicable option.
    Quiescent,
    /// An action asked the program to terminate.
    ModuleTerminated,
    /// The cycle limit was reached.
    CycleLimit,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub cycles: Vec<CycleReport>,
    pub stopped: StopReason,
}

/// Fire at most one rule.
///
/// Rules are tried in order and each condition solution in order; the first
/// non-empty option list is chosen from uniformly and run as a last attempt.
/// Returns `None` when no rule applies.
pub fn step(
    program: &mut AgentProgram,
    ctx: &mut ExecutionContext<'_>,
) -> Result<Option<(usize, ExecutionResult)>, ActionError> {
    for (index, rule) in program.rules.iter().enumerate() {
        let solutions = rule.condition.evaluate(&program.state, rule)?;
        for solution in &solutions {
            let options = rule.body.apply_subst(solution).get_options(&program.state, ctx)?;
            let Some(option) = choose(&mut *ctx.choices, &options) else {
                continue;
            };
            tracing::debug!(rule = index, option = %option, "rule applicable");
            let result = option.run(&mut program.state, &Substitution::empty(), ctx, true)?;
            return Ok(Some((index, result)));
        }
    }
    Ok(None)
}

/// Run up to `max_cycles` cycles.
pub fn run(
    program: &mut AgentProgram,
    max_cycles: usize,
    ctx: &mut ExecutionContext<'_>,
) -> Result<RunSummary, ActionError> {
    let mut cycles = Vec::new();
    for cycle in 1..=max_cycles {
        let Some((rule, result)) = step(program, ctx)? else {
            tracing::info!(cycle, "no applicable rule");
            return Ok(RunSummary {
                cycles,
                stopped: StopReason::Quiescent,
            });
        };
        tracing::info!(cycle, rule, actions = result.actions().len(), "cycle complete");
        let terminated = result.module_terminated();
        cycles.push(CycleReport {
            cycle,
            rule,
            result: result.report(),
        });
        if terminated {
            return Ok(RunSummary {
                cycles,
                stopped: StopReason::ModuleTerminated,
            });
        }
    }
    Ok(RunSummary {
        cycles,
        stopped: StopReason::CycleLimit,
    })
}

// =============================================================================
// TESTS
// =============================================================================

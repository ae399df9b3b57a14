//! # Execution Result
//!
//! Merge-only accumulator describing what a run of an action or combo did.

use crate::action::Action;
use serde::Serialize;

/// Outcome of running actions during one step.
///
/// Created empty, extended only through [`ExecutionResult::merge`], and
/// discarded once the caller has inspected it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    actions: Vec<Action>,
    just_performed: bool,
    module_terminated: bool,
}

impl ExecutionResult {
    /// Nothing ran.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `action` ran.
    #[must_use]
    pub fn performed(action: Action) -> Self {
        Self {
            actions: vec![action],
            just_performed: true,
            module_terminated: false,
        }
    }

    /// `action` ran and asks the enclosing module to terminate.
    #[must_use]
    pub fn terminating(action: Action) -> Self {
        Self {
            actions: vec![action],
            just_performed: true,
            module_terminated: true,
        }
    }

    /// Append `other` to this result.
    ///
    /// Termination sticks once set. `just_performed` always takes the value of
    /// the most recently merged result: it answers whether the last step ran.
    pub fn merge(&mut self, other: ExecutionResult) {
        self.actions.extend(other.actions);
        self.just_performed = other.just_performed;
        self.module_terminated |= other.module_terminated;
    }

    /// Executed actions, in execution order.
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Whether the last merged step performed an action.
    #[must_use]
    pub fn just_performed(&self) -> bool {
        self.just_performed
    }

    /// Whether the enclosing module should terminate.
    #[must_use]
    pub fn module_terminated(&self) -> bool {
        self.module_terminated
    }

    /// Serializable summary.
    #[must_use]
    pub fn report(&self) -> ExecutionReport {
        ExecutionReport {
            actions: self.actions.iter().map(ToString::to_string).collect(),
            just_performed: self.just_performed,
            module_terminated: self.module_terminated,
        }
    }
}

/// Plain-data view of an [`ExecutionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub actions: Vec<String>,
    pub just_performed: bool,
    pub module_terminated: bool,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ExitModuleAction, ExitModuleKind, PrintAction};
    use crate::kr::Term;

    fn print(text: &str) -> Action {
        Action::Print(PrintAction::new(Term::string(text)))
    }

    #[test]
    fn merge_appends_in_order() {
        let mut result = ExecutionResult::empty();
        result.merge(ExecutionResult::performed(print("a")));
        result.merge(ExecutionResult::performed(print("b")));
        assert_eq!(result.actions(), &[print("a"), print("b")]);
        assert!(result.just_performed());
    }

    #[test]
    fn just_performed_reflects_last_merge() {
        let mut result = ExecutionResult::empty();
        result.merge(ExecutionResult::performed(print("a")));
        result.merge(ExecutionResult::empty());
        assert!(!result.just_performed());
        assert_eq!(result.actions().len(), 1);
    }

    #[test]
    fn termination_sticks() {
        let exit = Action::ExitModule(ExitModuleAction::new(ExitModuleKind::Module));
        let mut result = ExecutionResult::empty();
        result.merge(ExecutionResult::terminating(exit));
        result.merge(ExecutionResult::performed(print("after")));
        assert!(result.module_terminated());
    }

    #[test]
    fn report_renders_actions() {
        let report = ExecutionResult::performed(print("hi")).report();
        assert_eq!(report.actions, vec!["print(\"hi\")".to_string()]);
        assert!(report.just_performed);
        assert!(!report.module_terminated);
    }
}

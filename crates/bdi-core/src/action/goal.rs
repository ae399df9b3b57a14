//! Goal-base actions: `adopt`, `adoptone` and `drop`.

use super::write_call;
use crate::condition::{Condition, MentalLiteral};
use crate::kr::{Substitution, Var};
use crate::query::Update;
use crate::result::ExecutionResult;
use crate::selector::{Selector, SelectorKind};
use crate::state::MentalState;
use crate::ActionError;
use std::collections::BTreeSet;
use std::fmt;

fn require_local(selector: &Selector, action: &str) -> Result<(), ActionError> {
    if selector.is_local() {
        Ok(())
    } else {
        Err(ActionError::Unsupported(format!(
            "{action} with selector {selector}"
        )))
    }
}

fn goal_vars(selector: &Selector, goal: &Update) -> BTreeSet<Var> {
    let mut vars = goal.free_vars();
    selector.collect_vars(&mut vars);
    vars
}

/// `not(bel(g)), not(goal(g))` under the action's selector.
fn not_believed_nor_pursued(selector: &Selector, goal: &Update) -> Condition {
    let query = goal.to_query();
    Condition::new(vec![
        MentalLiteral::bel(query.clone())
            .scoped(selector.clone())
            .negated(),
        MentalLiteral::goal(query).scoped(selector.clone()).negated(),
    ])
}

// =============================================================================
// ADOPT
// =============================================================================

/// Adds a goal unless it is already believed or pursued.
///
/// `this.adopt(..)` adopts a sub-goal of the current module; `adopt(..)`
/// (self) adopts a top-level goal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdoptAction {
    selector: Selector,
    goal: Update,
}

impl AdoptAction {
    /// Only `self` and `this` selectors are supported.
    pub fn new(selector: Selector, goal: Update) -> Result<Self, ActionError> {
        require_local(&selector, "adopt")?;
        Ok(Self { selector, goal })
    }

    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    #[must_use]
    pub fn goal(&self) -> &Update {
        &self.goal
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        goal_vars(&self.selector, &self.goal)
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            selector: self.selector.apply_subst(subst),
            goal: self.goal.apply_subst(subst),
        }
    }

    pub(super) fn precondition(&self) -> Condition {
        not_believed_nor_pursued(&self.selector, &self.goal)
    }

    pub(super) fn execute(&self, state: &mut dyn MentalState) -> Result<(), ActionError> {
        let agent = state.agent_id().clone();
        let as_subgoal = self.selector.kind() == SelectorKind::This;
        state
            .adopt(&self.goal, as_subgoal, &agent)
            .and_then(|()| state.update_goal_state())
            .map_err(|e| ActionError::update(self, e))
    }
}

impl fmt::Display for AdoptAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.selector, "adopt", &self.goal)
    }
}

// =============================================================================
// ADOPTONE
// =============================================================================

/// Adopt a goal only if no goal of the same template is pursued.
///
/// Template subsumption is not implemented: construction is always rejected,
/// so the variant exists in the action surface but never runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdoptOneAction {
    selector: Selector,
    goal: Update,
}

impl AdoptOneAction {
    /// Always fails with [`ActionError::Unsupported`].
    pub fn new(selector: Selector, goal: Update) -> Result<Self, ActionError> {
        require_local(&selector, "adoptone")?;
        Err(ActionError::Unsupported(format!("adoptone({goal})")))
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        goal_vars(&self.selector, &self.goal)
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            selector: self.selector.apply_subst(subst),
            goal: self.goal.apply_subst(subst),
        }
    }

    pub(super) fn precondition(&self) -> Condition {
        not_believed_nor_pursued(&self.selector, &self.goal)
    }

    pub(super) fn execute(&self) -> Result<ExecutionResult, ActionError> {
        Err(ActionError::Unsupported(self.to_string()))
    }
}

impl fmt::Display for AdoptOneAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.selector, "adoptone", &self.goal)
    }
}

// =============================================================================
// DROP
// =============================================================================

/// Removes every goal that entails the given conjunction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropAction {
    selector: Selector,
    goal: Update,
}

impl DropAction {
    #[must_use]
    pub fn new(goal: Update) -> Self {
        Self {
            selector: Selector::self_agent(),
            goal,
        }
    }

    #[must_use]
    pub fn scoped(self, selector: Selector) -> Self {
        Self { selector, ..self }
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        goal_vars(&self.selector, &self.goal)
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            selector: self.selector.apply_subst(subst),
            goal: self.goal.apply_subst(subst),
        }
    }

    pub(super) fn execute(&self, state: &mut dyn MentalState) -> Result<(), ActionError> {
        state
            .drop_goal(&self.goal)
            .map_err(|e| ActionError::update(self, e))
    }
}

impl fmt::Display for DropAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.selector, "drop", &self.goal)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BaseKind;
    use crate::action::Action;
    use crate::context::RecordingCollaborators;
    use crate::debug::Channel;
    use crate::kr::Term;
    use crate::query::Query;
    use crate::state::MemoryState;

    fn update(text: &str) -> Update {
        Update::parse(text).expect("update")
    }

    fn adopt(text: &str) -> Action {
        Action::Adopt(AdoptAction::new(Selector::self_agent(), update(text)).expect("adopt"))
    }

    fn run(action: &Action, state: &mut MemoryState) -> (ExecutionResult, RecordingCollaborators) {
        let mut collab = RecordingCollaborators::new();
        let result = action
            .run(state, &Substitution::empty(), &mut collab.context(), false)
            .expect("run");
        (result, collab)
    }

    #[test]
    fn adopt_rejects_remote_selectors() {
        let result = AdoptAction::new(Selector::of_kind(SelectorKind::All), update("on(a, b)"));
        assert!(matches!(result, Err(ActionError::Unsupported(_))));
    }

    #[test]
    fn adopt_adds_goal_when_neither_believed_nor_pursued() {
        let mut state = MemoryState::new("me");
        let (result, collab) = run(&adopt("on(a, b)"), &mut state);

        assert!(result.just_performed());
        assert_eq!(state.goals().len(), 1);
        assert!(state.goals()[0].contains(&Term::compound(
            "on",
            vec![Term::atom("a"), Term::atom("b")]
        )));
        assert_eq!(collab.debugger.on(Channel::PreconditionHolds).count(), 1);
        assert_eq!(collab.debugger.on(Channel::BuiltinExecuted).count(), 1);
    }

    #[test]
    fn adopt_is_skipped_for_pursued_goal() {
        let mut state = MemoryState::new("me");
        run(&adopt("on(a, b)"), &mut state);
        let (result, collab) = run(&adopt("on(a, b)"), &mut state);

        assert!(!result.just_performed());
        assert!(result.actions().is_empty());
        assert_eq!(collab.debugger.on(Channel::PreconditionFails).count(), 1);
        assert_eq!(state.goals().len(), 1);
    }

    #[test]
    fn this_adopts_a_subgoal() {
        let mut state = MemoryState::new("me");
        let action =
            Action::Adopt(AdoptAction::new(Selector::this(), update("done")).expect("adopt"));
        run(&action, &mut state);
        assert!(state.goals()[0].is_subgoal());
    }

    #[test]
    fn adopt_with_unbound_goal_fails_after_precondition() {
        let mut state = MemoryState::new("me");
        let mut collab = RecordingCollaborators::new();
        let result = adopt("on(X, b)").run(
            &mut state,
            &Substitution::empty(),
            &mut collab.context(),
            false,
        );
        assert!(matches!(result, Err(ActionError::ActionFailed { .. })));
        assert!(state.goals().is_empty());
    }

    #[test]
    fn adoptone_is_never_constructed() {
        let result = AdoptOneAction::new(Selector::self_agent(), update("on(a, b)"));
        assert!(
            matches!(result, Err(ActionError::Unsupported(ref what)) if what == "adoptone(on(a, b))")
        );
    }

    #[test]
    fn drop_removes_entailing_goals() {
        let mut state = MemoryState::new("me");
        run(&adopt("on(a, b), on(b, c)"), &mut state);
        run(&adopt("on(c, d)"), &mut state);

        let drop = Action::Drop(DropAction::new(update("on(a, b)")));
        let (result, _) = run(&drop, &mut state);

        assert!(result.just_performed());
        assert_eq!(state.goals().len(), 1);
        let remaining = state
            .query(&Query::parse("on(c, d)").expect("query"), BaseKind::Goal)
            .expect("query");
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn display_includes_selector_when_not_self() {
        let action = AdoptAction::new(Selector::this(), update("done")).expect("adopt");
        assert_eq!(action.to_string(), "this.adopt(done)");
        assert_eq!(DropAction::new(update("done")).to_string(), "drop(done)");
    }
}

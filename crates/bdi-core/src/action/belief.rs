//! Belief-base actions: `insert` and `delete`.
//!
//! Both split their update into a belief part and a mailbox part
//! (`sent/2`, `received/2`) and apply each to its own base.

use super::write_call;
use crate::kr::{Substitution, Var};
use crate::query::Update;
use crate::selector::Selector;
use crate::state::MentalState;
use crate::{ActionError, BaseKind};
use std::collections::BTreeSet;
use std::fmt;

fn require_local(selector: &Selector, action: &dyn fmt::Display) -> Result<(), ActionError> {
    if selector.is_local() {
        return Ok(());
    }
    Err(ActionError::ActionFailed {
        action: action.to_string(),
        reason: format!("cannot change the beliefs of {selector}"),
    })
}

// =============================================================================
// INSERT
// =============================================================================

/// Adds the positive literals of an update and removes the negative ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InsertAction {
    selector: Selector,
    update: Update,
}

impl InsertAction {
    #[must_use]
    pub fn new(update: Update) -> Self {
        Self {
            selector: Selector::self_agent(),
            update,
        }
    }

    #[must_use]
    pub fn scoped(self, selector: Selector) -> Self {
        Self { selector, ..self }
    }

    #[must_use]
    pub fn update(&self) -> &Update {
        &self.update
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = self.update.free_vars();
        self.selector.collect_vars(&mut vars);
        vars
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            selector: self.selector.apply_subst(subst),
            update: self.update.apply_subst(subst),
        }
    }

    pub(super) fn execute(&self, state: &mut dyn MentalState) -> Result<(), ActionError> {
        require_local(&self.selector, self)?;
        let (beliefs, mail) = self.update.split_mailbox();
        state
            .insert(&beliefs, BaseKind::Belief)
            .and_then(|()| state.insert(&mail, BaseKind::Mailbox))
            .and_then(|()| state.update_goal_state())
            .map_err(|e| ActionError::update(self, e))
    }
}

impl fmt::Display for InsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.selector, "insert", &self.update)
    }
}

// =============================================================================
// DELETE
// =============================================================================

/// Removes the positive literals of an update and adds the negative ones.
///
/// The mailbox part may keep variables: `delete(received(X, int(p)))`
/// removes every matching question regardless of sender.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteAction {
    selector: Selector,
    update: Update,
}

impl DeleteAction {
    #[must_use]
    pub fn new(update: Update) -> Self {
        Self {
            selector: Selector::self_agent(),
            update,
        }
    }

    #[must_use]
    pub fn scoped(self, selector: Selector) -> Self {
        Self { selector, ..self }
    }

    #[must_use]
    pub fn update(&self) -> &Update {
        &self.update
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = self.update.free_vars();
        self.selector.collect_vars(&mut vars);
        vars
    }

    /// Closed once the selector and the belief part are ground.
    pub(super) fn is_closed(&self) -> bool {
        let (beliefs, _) = self.update.split_mailbox();
        self.selector.is_closed() && beliefs.is_closed()
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            selector: self.selector.apply_subst(subst),
            update: self.update.apply_subst(subst),
        }
    }

    pub(super) fn execute(&self, state: &mut dyn MentalState) -> Result<(), ActionError> {
        require_local(&self.selector, self)?;
        let (beliefs, mail) = self.update.split_mailbox();
        state
            .delete(&beliefs, BaseKind::Belief)
            .and_then(|()| state.delete(&mail, BaseKind::Mailbox))
            .and_then(|()| state.update_goal_state())
            .map_err(|e| ActionError::update(self, e))
    }
}

impl fmt::Display for DeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, &self.selector, "delete", &self.update)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, AdoptAction};
    use crate::context::RecordingCollaborators;
    use crate::kr::{Term, parse_term};
    use crate::result::ExecutionResult;
    use crate::selector::SelectorKind;
    use crate::state::MemoryState;

    fn update(text: &str) -> Update {
        Update::parse(text).expect("update")
    }

    fn term(text: &str) -> Term {
        parse_term(text).expect("term")
    }

    fn run(action: &Action, state: &mut MemoryState) -> Result<ExecutionResult, ActionError> {
        let mut collab = RecordingCollaborators::new();
        action.run(state, &Substitution::empty(), &mut collab.context(), false)
    }

    #[test]
    fn insert_splits_beliefs_and_mail() {
        let mut state = MemoryState::new("me");
        let action = Action::Insert(InsertAction::new(update("done, sent(bob, hello)")));
        let result = run(&action, &mut state).expect("insert");

        assert!(result.just_performed());
        assert!(state.believes(&term("done")));
        assert!(!state.believes(&term("sent(bob, hello)")));
        assert_eq!(state.mailbox().count(), 1);
    }

    #[test]
    fn insert_removes_negated_literals() {
        let mut state = MemoryState::new("me");
        state.add_beliefs(&update("on(a, table)")).expect("beliefs");
        let action = Action::Insert(InsertAction::new(update("on(a, b), not(on(a, table))")));
        run(&action, &mut state).expect("insert");

        assert!(state.believes(&term("on(a, b)")));
        assert!(!state.believes(&term("on(a, table)")));
    }

    #[test]
    fn insert_recomputes_goal_state() {
        let mut state = MemoryState::new("me");
        let adopt = AdoptAction::new(Selector::self_agent(), update("on(a, b)")).expect("adopt");
        run(&Action::Adopt(adopt), &mut state).expect("adopt");
        assert_eq!(state.goals().len(), 1);

        run(&Action::Insert(InsertAction::new(update("on(a, b)"))), &mut state).expect("insert");
        assert!(state.goals().is_empty());
    }

    #[test]
    fn delete_allows_variables_in_mailbox_part() {
        let mut state = MemoryState::new("me");
        state
            .insert(&update("received(bob, int(p)), received(carol, int(p))"), BaseKind::Mailbox)
            .expect("mail");

        let action = Action::Delete(DeleteAction::new(update("received(X, int(p))")));
        assert!(action.is_closed());
        assert!(!action.free_vars().is_empty());
        run(&action, &mut state).expect("delete");
        assert_eq!(state.mailbox().count(), 0);
    }

    #[test]
    fn delete_with_unbound_belief_is_not_closed() {
        let mut state = MemoryState::new("me");
        let action = Action::Delete(DeleteAction::new(update("on(X, b)")));
        assert!(!action.is_closed());
        assert!(matches!(
            run(&action, &mut state),
            Err(ActionError::ActionFailed { .. })
        ));
    }

    #[test]
    fn remote_belief_change_fails() {
        let mut state = MemoryState::new("me").with_agents(["bob"]);
        let action = Action::Insert(
            InsertAction::new(update("done")).scoped(Selector::of_kind(SelectorKind::All)),
        );
        assert!(matches!(
            run(&action, &mut state),
            Err(ActionError::ActionFailed { .. })
        ));
        assert!(!state.believes(&term("done")));
    }
}

//! # Action Combos
//!
//! An action combo is the body of a rule: a non-empty sequence of actions
//! joined with `+` and executed left to right.
//!
//! ## Short-Circuit
//!
//! Execution stops after the first action that did not run (unless it is a
//! module call, which may legitimately perform nothing) and after any action
//! that terminated the enclosing module.

use crate::action::Action;
use crate::context::ExecutionContext;
use crate::debug::Channel;
use crate::kr::{Substitution, Var};
use crate::result::ExecutionResult;
use crate::state::MentalState;
use crate::ActionError;
use std::collections::BTreeSet;
use std::fmt;

/// A non-empty ordered sequence of actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionCombo {
    actions: Vec<Action>,
}

impl ActionCombo {
    /// Fails with [`ActionError::EmptyCombo`] for an empty vector.
    pub fn new(actions: Vec<Action>) -> Result<Self, ActionError> {
        if actions.is_empty() {
            return Err(ActionError::EmptyCombo);
        }
        Ok(Self { actions })
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always false for a constructed combo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            actions: self.actions.iter().map(|a| a.apply_subst(subst)).collect(),
        }
    }

    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<Var> {
        self.actions.iter().flat_map(Action::free_vars).collect()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.actions.iter().all(Action::is_closed)
    }

    /// Whether any member enters a module with filter focus.
    #[must_use]
    pub fn has_filter_focus_action(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::ModuleCall(call) if call.uses_filter_focus()))
    }

    /// Instantiations of this combo whose first action is executable now.
    ///
    /// A user-specified first action yields one candidate per answer of its
    /// applicable specification. Any other first action yields at most one
    /// candidate. Never mutates the mental state.
    pub fn get_options(
        &self,
        state: &dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<Vec<ActionCombo>, ActionError> {
        let Some((first, rest)) = self.actions.split_first() else {
            return Err(ActionError::EmptyCombo);
        };

        if let Action::UserSpec(action) = first {
            let Some(options) = action.options(state)? else {
                return Ok(Vec::new());
            };
            let selected = action.selected(options.index);
            let mut candidates = Vec::with_capacity(options.solutions.len());
            for solution in &options.solutions {
                let head = Action::UserSpec(selected.apply_subst(solution));
                if !head.is_closed() {
                    return Err(ActionError::free_variables(&head));
                }
                let mut actions = Vec::with_capacity(self.actions.len());
                actions.push(head);
                actions.extend(rest.iter().map(|a| a.apply_subst(solution)));
                candidates.push(Self { actions });
            }
            return Ok(candidates);
        }

        match first.evaluate_precondition(state, ctx, false)? {
            Some(ready) if ready.is_closed() => {
                let mut actions = Vec::with_capacity(self.actions.len());
                actions.push(ready);
                actions.extend(rest.iter().cloned());
                Ok(vec![Self { actions }])
            }
            Some(ready) => Err(ActionError::free_variables(&ready)),
            None => Ok(Vec::new()),
        }
    }

    /// Run the members in order under `subst`, stopping early as described
    /// in the module docs.
    pub fn run(
        &self,
        state: &mut dyn MentalState,
        subst: &Substitution,
        ctx: &mut ExecutionContext<'_>,
        last_attempt: bool,
    ) -> Result<ExecutionResult, ActionError> {
        let mut result = ExecutionResult::empty();
        for action in &self.actions {
            let step = action.run(state, subst, ctx, last_attempt)?;
            result.merge(step);
            if (!result.just_performed() && !action.is_module_call()) || result.module_terminated() {
                break;
            }
        }

        let subject = self.to_string();
        ctx.debugger.breakpoint(
            Channel::ComboFinished,
            &subject,
            format_args!(
                "combo {subject} finished after {} action(s)",
                result.actions().len()
            ),
        );
        Ok(result)
    }
}

impl From<Action> for ActionCombo {
    fn from(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }
}

impl fmt::Display for ActionCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{
        ActionSpec, AdoptAction, ExitModuleAction, ExitModuleKind, FocusMethod, InsertAction,
        ModuleCallAction, ModuleRef, PrintAction, UserSpecAction,
    };
    use crate::context::RecordingCollaborators;
    use crate::kr::{Term, parse_terms};
    use crate::query::{Query, Update};
    use crate::selector::Selector;
    use crate::state::MemoryState;

    fn insert(text: &str) -> Action {
        Action::Insert(InsertAction::new(Update::parse(text).expect("update")))
    }

    fn adopt(text: &str) -> Action {
        Action::Adopt(
            AdoptAction::new(Selector::self_agent(), Update::parse(text).expect("update"))
                .expect("adopt"),
        )
    }

    fn print(text: &str) -> Action {
        Action::Print(PrintAction::new(Term::string(text)))
    }

    fn combo(actions: Vec<Action>) -> ActionCombo {
        ActionCombo::new(actions).expect("combo")
    }

    #[test]
    fn empty_combo_is_rejected() {
        assert!(matches!(ActionCombo::new(Vec::new()), Err(ActionError::EmptyCombo)));
        assert_eq!(combo(vec![print("a")]), ActionCombo::from(print("a")));
    }

    #[test]
    fn runs_members_in_order() {
        let mut state = MemoryState::new("me");
        let mut collab = RecordingCollaborators::new();
        let body = combo(vec![insert("p"), print("one"), print("two")]);
        let result = body
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("run");

        assert_eq!(result.actions().len(), 3);
        assert_eq!(collab.console.printed, vec!["one", "two"]);
        assert_eq!(collab.debugger.on(Channel::ComboFinished).count(), 1);
    }

    #[test]
    fn stops_after_action_that_did_not_run() {
        let mut state = MemoryState::new("me");
        state
            .add_beliefs(&Update::parse("done").expect("update"))
            .expect("beliefs");
        let mut collab = RecordingCollaborators::new();
        let body = combo(vec![adopt("done"), print("never")]);
        let result = body
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("run");

        assert!(result.actions().is_empty());
        assert!(!result.just_performed());
        assert!(collab.console.printed.is_empty());
    }

    #[test]
    fn module_call_that_did_nothing_does_not_stop() {
        let mut state = MemoryState::new("me");
        let mut collab = RecordingCollaborators::new();
        let call = Action::ModuleCall(ModuleCallAction::new(
            ModuleRef::new("sub", FocusMethod::None),
            Vec::new(),
        ));
        let body = combo(vec![call, print("after")]);
        body.run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("run");
        assert_eq!(collab.console.printed, vec!["after"]);
    }

    #[test]
    fn stops_after_module_termination() {
        let mut state = MemoryState::new("me");
        let mut collab = RecordingCollaborators::new();
        let exit = Action::ExitModule(ExitModuleAction::new(ExitModuleKind::Module));
        let body = combo(vec![print("before"), exit, print("after")]);
        let result = body
            .run(&mut state, &Substitution::empty(), &mut collab.context(), false)
            .expect("run");

        assert!(result.module_terminated());
        assert_eq!(collab.console.printed, vec!["before"]);
    }

    #[test]
    fn builtin_options() {
        let state = MemoryState::new("me");
        let mut collab = RecordingCollaborators::new();

        let ready = combo(vec![adopt("done"), print("x")]);
        let options = ready.get_options(&state, &mut collab.context()).expect("options");
        assert_eq!(options, vec![ready.clone()]);

        let open = combo(vec![insert("on(X, b)")]);
        assert!(matches!(
            open.get_options(&state, &mut collab.context()),
            Err(ActionError::ActionFailed { .. })
        ));
    }

    #[test]
    fn userspec_options_instantiate_the_whole_combo() {
        let mut state = MemoryState::new("me");
        state
            .add_beliefs(&Update::parse("item(a), item(b)").expect("update"))
            .expect("beliefs");
        let spec = ActionSpec::new(
            "pick",
            parse_terms("X").expect("params"),
            Query::parse("item(X)").expect("pre"),
            Update::parse("holding(X)").expect("post"),
        );
        let mut pick = UserSpecAction::new("pick", parse_terms("Y").expect("args"));
        assert!(pick.add_specification(&spec));

        let body = combo(vec![
            Action::UserSpec(pick),
            Action::Print(PrintAction::new(Term::var("Y"))),
        ]);
        let mut collab = RecordingCollaborators::new();
        let options = body.get_options(&state, &mut collab.context()).expect("options");

        let rendered: Vec<String> = options.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["pick(a) + print(a)", "pick(b) + print(b)"]);
        assert!(options.iter().all(ActionCombo::is_closed));
    }

    #[test]
    fn filter_focus_is_detected() {
        let call = Action::ModuleCall(ModuleCallAction::new(
            ModuleRef::new("focus", FocusMethod::Filter),
            Vec::new(),
        ));
        assert!(combo(vec![print("x"), call]).has_filter_focus_action());
        assert!(!combo(vec![print("x")]).has_filter_focus_action());
    }
}

//! Output actions: `print` and `log`.

use crate::context::ExecutionContext;
use crate::kr::{Substitution, Term, Var};
use crate::state::MentalState;
use crate::BaseKind;
use std::collections::BTreeSet;
use std::fmt;

/// Remove one layer of enclosing single or double quotes.
fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// The text a term stands for: a string's contents, otherwise its rendering
/// with one layer of quotes removed.
fn literal_text(term: &Term) -> String {
    match term {
        Term::Str(text) => text.clone(),
        other => strip_quotes(&other.to_string()).to_string(),
    }
}

// =============================================================================
// PRINT
// =============================================================================

/// Writes its argument to the console.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrintAction {
    term: Term,
}

impl PrintAction {
    #[must_use]
    pub fn new(term: Term) -> Self {
        Self { term }
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        self.term.free_vars()
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            term: self.term.apply_subst(subst),
        }
    }

    pub(super) fn execute(&self, ctx: &mut ExecutionContext<'_>) {
        ctx.console.print(&literal_text(&self.term));
    }
}

impl fmt::Display for PrintAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "print({})", self.term)
    }
}

// =============================================================================
// LOG
// =============================================================================

/// Writes a base of the mental state, or literal text, to the log.
///
/// The parameters `bb`, `gb`, `mb`, `kb` and `pb` select the belief, goal,
/// mailbox, knowledge and percept base.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogAction {
    parameter: Term,
}

impl LogAction {
    #[must_use]
    pub fn new(parameter: Term) -> Self {
        Self { parameter }
    }

    /// The base the parameter selects, if any.
    #[must_use]
    pub fn base(&self) -> Option<BaseKind> {
        match &self.parameter {
            Term::Compound { functor, args } if args.is_empty() => {
                BaseKind::from_short_name(functor)
            }
            _ => None,
        }
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        self.parameter.free_vars()
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            parameter: self.parameter.apply_subst(subst),
        }
    }

    pub(super) fn execute(&self, state: &dyn MentalState, ctx: &mut ExecutionContext<'_>) {
        let text = match self.base() {
            Some(base) => {
                let mut text = format!("{base} of {}:", state.agent_id());
                for entry in state.base_contents(base) {
                    text.push_str("\n  ");
                    text.push_str(&entry);
                }
                text
            }
            None => literal_text(&self.parameter),
        };
        ctx.console.log(&text);
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "log({})", self.parameter)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::context::RecordingCollaborators;
    use crate::query::Update;
    use crate::state::MemoryState;

    fn run(action: &Action, state: &mut MemoryState) -> RecordingCollaborators {
        let mut collab = RecordingCollaborators::new();
        action
            .run(state, &Substitution::empty(), &mut collab.context(), false)
            .expect("run");
        collab
    }

    #[test]
    fn print_strips_one_layer_of_quotes() {
        let mut state = MemoryState::new("me");
        let collab = run(&Action::Print(PrintAction::new(Term::string("hello"))), &mut state);
        assert_eq!(collab.console.printed, vec!["hello".to_string()]);

        assert_eq!(strip_quotes("'hi'"), "hi");
        assert_eq!(strip_quotes("\"'hi'\""), "'hi'");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn print_renders_terms() {
        let mut state = MemoryState::new("me");
        let term = Term::compound("on", vec![Term::atom("a"), Term::int(3)]);
        let collab = run(&Action::Print(PrintAction::new(term)), &mut state);
        assert_eq!(collab.console.printed, vec!["on(a, 3)".to_string()]);
    }

    #[test]
    fn print_needs_bound_argument() {
        let mut state = MemoryState::new("me");
        let mut collab = RecordingCollaborators::new();
        let action = Action::Print(PrintAction::new(Term::var("X")));
        let subst = Substitution::single(Var::new("X"), Term::string("bound"));
        action
            .run(&mut state, &subst, &mut collab.context(), false)
            .expect("print");
        assert_eq!(collab.console.printed, vec!["bound".to_string()]);
    }

    #[test]
    fn log_dumps_selected_base() {
        let mut state = MemoryState::new("me");
        state
            .add_beliefs(&Update::parse("clear(a), clear(b)").expect("update"))
            .expect("beliefs");
        let collab = run(&Action::Log(LogAction::new(Term::atom("bb"))), &mut state);
        assert_eq!(
            collab.console.logged,
            vec!["belief base of me:\n  clear(a)\n  clear(b)".to_string()]
        );
    }

    #[test]
    fn log_other_parameters_as_text() {
        let mut state = MemoryState::new("me");
        let collab = run(
            &Action::Log(LogAction::new(Term::string("checkpoint"))),
            &mut state,
        );
        assert_eq!(collab.console.logged, vec!["checkpoint".to_string()]);
        assert_eq!(LogAction::new(Term::atom("xb")).base(), None);
        assert_eq!(LogAction::new(Term::atom("gb")).base(), Some(BaseKind::Goal));
    }
}

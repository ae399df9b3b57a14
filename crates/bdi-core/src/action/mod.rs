//! # Actions
//!
//! Every action kind the agent language knows, as one closed enum.
//!
//! ## Protocol
//!
//! All variants share the same two-phase protocol:
//!
//! 1. `apply_subst` instantiates the action with the caller's substitution
//! 2. `evaluate_precondition` checks the precondition against the mental
//!    state and returns the instance ready for execution (or `None`)
//! 3. the instance must be closed
//! 4. `execute` performs the effect and returns an [`ExecutionResult`]
//!
//! [`Action::run`] strings the phases together. Actions are values: applying
//! a substitution always yields a new action.

mod belief;
mod goal;
mod message;
mod module;
mod output;
mod userspec;

pub use belief::{DeleteAction, InsertAction};
pub use goal::{AdoptAction, AdoptOneAction, DropAction};
pub use message::{Message, Mood, SendAction, SendOnceAction};
pub use module::{ExitModuleAction, ExitModuleKind, FocusMethod, ModuleCallAction, ModuleRef};
pub use output::{LogAction, PrintAction};
pub use userspec::{ActionSpec, SourceInfo, SpecOptions, UserSpecAction};

use crate::condition::Condition;
use crate::context::ExecutionContext;
use crate::debug::Channel;
use crate::kr::{Substitution, Var};
use crate::result::ExecutionResult;
use crate::state::MentalState;
use crate::ActionError;
use std::collections::BTreeSet;
use std::fmt;

/// An action of the agent language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Adopt(AdoptAction),
    AdoptOne(AdoptOneAction),
    Drop(DropAction),
    Insert(InsertAction),
    Delete(DeleteAction),
    Send(SendAction),
    SendOnce(SendOnceAction),
    Print(PrintAction),
    Log(LogAction),
    ExitModule(ExitModuleAction),
    ModuleCall(ModuleCallAction),
    UserSpec(UserSpecAction),
}

impl Action {
    /// The action's name as written in programs.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Adopt(_) => "adopt",
            Self::AdoptOne(_) => "adoptone",
            Self::Drop(_) => "drop",
            Self::Insert(_) => "insert",
            Self::Delete(_) => "delete",
            Self::Send(_) => "send",
            Self::SendOnce(_) => "sendonce",
            Self::Print(_) => "print",
            Self::Log(_) => "log",
            Self::ExitModule(_) => "exit-module",
            Self::ModuleCall(a) => a.target().name(),
            Self::UserSpec(a) => a.name(),
        }
    }

    /// Free variables across every sub-term, selector included.
    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<Var> {
        match self {
            Self::Adopt(a) => a.free_vars(),
            Self::AdoptOne(a) => a.free_vars(),
            Self::Drop(a) => a.free_vars(),
            Self::Insert(a) => a.free_vars(),
            Self::Delete(a) => a.free_vars(),
            Self::Send(a) => a.free_vars(),
            Self::SendOnce(a) => a.free_vars(),
            Self::Print(a) => a.free_vars(),
            Self::Log(a) => a.free_vars(),
            Self::ExitModule(_) => BTreeSet::new(),
            Self::ModuleCall(a) => a.free_vars(),
            Self::UserSpec(a) => a.free_vars(),
        }
    }

    /// Whether the action can be executed as is.
    ///
    /// Normally the same as having no free variables. `delete` and the send
    /// actions allow mailbox-only parts to keep variables.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Delete(a) => a.is_closed(),
            Self::Send(a) => a.is_closed(),
            Self::SendOnce(a) => a.is_closed(),
            Self::UserSpec(a) => a.is_closed(),
            _ => self.free_vars().is_empty(),
        }
    }

    /// A new action with `subst` applied.
    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            Self::Adopt(a) => Self::Adopt(a.apply_subst(subst)),
            Self::AdoptOne(a) => Self::AdoptOne(a.apply_subst(subst)),
            Self::Drop(a) => Self::Drop(a.apply_subst(subst)),
            Self::Insert(a) => Self::Insert(a.apply_subst(subst)),
            Self::Delete(a) => Self::Delete(a.apply_subst(subst)),
            Self::Send(a) => Self::Send(a.apply_subst(subst)),
            Self::SendOnce(a) => Self::SendOnce(a.apply_subst(subst)),
            Self::Print(a) => Self::Print(a.apply_subst(subst)),
            Self::Log(a) => Self::Log(a.apply_subst(subst)),
            Self::ExitModule(a) => Self::ExitModule(a.clone()),
            Self::ModuleCall(a) => Self::ModuleCall(a.apply_subst(subst)),
            Self::UserSpec(a) => Self::UserSpec(a.apply_subst(subst)),
        }
    }

    /// The precondition as a mental-state condition.
    ///
    /// Built-ins other than adopt use `bel(true)` scoped to the acting agent.
    #[must_use]
    pub fn precondition(&self) -> Condition {
        match self {
            Self::Adopt(a) => a.precondition(),
            Self::AdoptOne(a) => a.precondition(),
            Self::UserSpec(a) => a.precondition(),
            _ => Condition::truth(),
        }
    }

    /// Whether this action is a call into a module.
    #[must_use]
    pub fn is_module_call(&self) -> bool {
        matches!(self, Self::ModuleCall(_))
    }

    /// Whether this action is built into the language.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::UserSpec(_))
    }

    /// Check the precondition against `state`.
    ///
    /// Returns the instance to execute when it holds. Never mutates the
    /// mental state.
    pub fn evaluate_precondition(
        &self,
        state: &dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
        last_attempt: bool,
    ) -> Result<Option<Action>, ActionError> {
        if let Self::UserSpec(action) = self {
            return Ok(action
                .evaluate_precondition(state, ctx, last_attempt)?
                .map(Self::UserSpec));
        }

        let solutions = self.precondition().evaluate(state, self)?;
        let subject = self.to_string();
        match solutions.first() {
            Some(solution) => {
                ctx.debugger.breakpoint(
                    Channel::PreconditionHolds,
                    &subject,
                    format_args!("precondition of {subject} holds"),
                );
                Ok(Some(self.apply_subst(solution)))
            }
            None => {
                ctx.debugger.breakpoint(
                    Channel::PreconditionFails,
                    &subject,
                    format_args!("precondition of {subject} does not hold"),
                );
                Ok(None)
            }
        }
    }

    /// Perform the action's effect.
    pub fn execute(
        &self,
        state: &mut dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<ExecutionResult, ActionError> {
        let result = match self {
            Self::Adopt(a) => a.execute(state).map(|()| ExecutionResult::performed(self.clone())),
            Self::AdoptOne(a) => a.execute(),
            Self::Drop(a) => a.execute(state).map(|()| ExecutionResult::performed(self.clone())),
            Self::Insert(a) => a.execute(state).map(|()| ExecutionResult::performed(self.clone())),
            Self::Delete(a) => a.execute(state).map(|()| ExecutionResult::performed(self.clone())),
            Self::Send(a) => a
                .execute(state, ctx)
                .map(|_| ExecutionResult::performed(self.clone())),
            Self::SendOnce(a) => a
                .execute(state, ctx)
                .map(|_| ExecutionResult::performed(self.clone())),
            Self::Print(a) => {
                a.execute(ctx);
                Ok(ExecutionResult::performed(self.clone()))
            }
            Self::Log(a) => {
                a.execute(state, ctx);
                Ok(ExecutionResult::performed(self.clone()))
            }
            Self::ExitModule(_) => Ok(ExecutionResult::terminating(self.clone())),
            Self::ModuleCall(a) => ctx.modules.enter(a, state),
            Self::UserSpec(a) => a
                .execute(state, ctx)
                .map(|()| ExecutionResult::performed(self.clone())),
        }?;
        self.report_executed(ctx);
        Ok(result)
    }

    /// Instantiate with `subst`, check the precondition, then execute.
    ///
    /// Returns an empty result when the precondition does not hold. Fails if
    /// the instance that passed its precondition still has free variables.
    pub fn run(
        &self,
        state: &mut dyn MentalState,
        subst: &Substitution,
        ctx: &mut ExecutionContext<'_>,
        last_attempt: bool,
    ) -> Result<ExecutionResult, ActionError> {
        let instance = self.apply_subst(subst);
        let Some(ready) = instance.evaluate_precondition(&*state, ctx, last_attempt)? else {
            return Ok(ExecutionResult::empty());
        };
        if !ready.is_closed() {
            return Err(ActionError::free_variables(&ready));
        }
        ready.execute(state, ctx)
    }

    fn report_executed(&self, ctx: &mut ExecutionContext<'_>) {
        let subject = self.to_string();
        match self {
            Self::UserSpec(_) => ctx.debugger.breakpoint(
                Channel::UserSpecExecuted,
                &subject,
                format_args!("performed user-specified action {subject}"),
            ),
            _ => ctx.debugger.breakpoint(
                Channel::BuiltinExecuted,
                &subject,
                format_args!("performed built-in action {subject}"),
            ),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adopt(a) => write!(f, "{a}"),
            Self::AdoptOne(a) => write!(f, "{a}"),
            Self::Drop(a) => write!(f, "{a}"),
            Self::Insert(a) => write!(f, "{a}"),
            Self::Delete(a) => write!(f, "{a}"),
            Self::Send(a) => write!(f, "{a}"),
            Self::SendOnce(a) => write!(f, "{a}"),
            Self::Print(a) => write!(f, "{a}"),
            Self::Log(a) => write!(f, "{a}"),
            Self::ExitModule(a) => write!(f, "{a}"),
            Self::ModuleCall(a) => write!(f, "{a}"),
            Self::UserSpec(a) => write!(f, "{a}"),
        }
    }
}

/// Render `name(args)` or, for a non-self selector, `selector.name(args)`.
pub(crate) fn write_call(
    f: &mut fmt::Formatter<'_>,
    selector: &crate::selector::Selector,
    name: &str,
    args: &dyn fmt::Display,
) -> fmt::Result {
    if *selector != crate::selector::Selector::self_agent() {
        write!(f, "{selector}.")?;
    }
    write!(f, "{name}({args})")
}

//! Module control: `exit-module` and calls into modules.

use crate::kr::{Substitution, Term, Var, write_list};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// EXIT-MODULE
// =============================================================================

/// How far an `exit-module` unwinds. Enforced by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitModuleKind {
    /// Leave every module up to the top level.
    All,
    /// Leave the innermost named module.
    Module,
    /// Leave an anonymous module introduced by a nested rule body.
    ImplicitModule,
    /// Leave after a single rule fired.
    One,
}

impl ExitModuleKind {
    /// Keyword used in program text and in the action's rendering.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Module => "module",
            Self::ImplicitModule => "implicit_module",
            Self::One => "one",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::All, Self::Module, Self::ImplicitModule, Self::One]
            .into_iter()
            .find(|kind| kind.name() == name)
    }
}

/// Signals that the enclosing module should terminate. Carries no state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExitModuleAction {
    kind: ExitModuleKind,
}

impl ExitModuleAction {
    #[must_use]
    pub fn new(kind: ExitModuleKind) -> Self {
        Self { kind }
    }

    #[must_use]
    pub fn kind(&self) -> ExitModuleKind {
        self.kind
    }
}

impl fmt::Display for ExitModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit-module({})", self.kind.name())
    }
}

// =============================================================================
// MODULE CALL
// =============================================================================

/// How a module narrows attention when it is entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FocusMethod {
    /// Share the caller's goals.
    #[default]
    None,
    /// Start with an empty goal base.
    New,
    /// Focus on the goals that made the calling rule applicable.
    Filter,
    /// Focus on one goal selected by the calling rule.
    Select,
}

/// A module an action can call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    name: String,
    focus: FocusMethod,
}

impl ModuleRef {
    #[must_use]
    pub fn new(name: impl Into<String>, focus: FocusMethod) -> Self {
        Self {
            name: name.into(),
            focus,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn focus(&self) -> FocusMethod {
        self.focus
    }
}

/// Enters a module with the given actual parameters.
///
/// What the module does is up to the [`crate::env::ModuleExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleCallAction {
    target: ModuleRef,
    parameters: Vec<Term>,
}

impl ModuleCallAction {
    #[must_use]
    pub fn new(target: ModuleRef, parameters: Vec<Term>) -> Self {
        Self { target, parameters }
    }

    #[must_use]
    pub fn target(&self) -> &ModuleRef {
        &self.target
    }

    #[must_use]
    pub fn parameters(&self) -> &[Term] {
        &self.parameters
    }

    /// Whether entering the module filters the goal base.
    #[must_use]
    pub fn uses_filter_focus(&self) -> bool {
        self.target.focus == FocusMethod::Filter
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        for parameter in &self.parameters {
            parameter.collect_vars(&mut vars);
        }
        vars
    }

    pub(super) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            target: self.target.clone(),
            parameters: self.parameters.iter().map(|p| p.apply_subst(subst)).collect(),
        }
    }
}

impl fmt::Display for ModuleCallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target.name)?;
        if !self.parameters.is_empty() {
            f.write_str("(")?;
            write_list(f, &self.parameters)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

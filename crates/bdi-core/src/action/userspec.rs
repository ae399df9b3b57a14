//! # User-Specified Actions
//!
//! A user-specified action is a call such as `move(a, table)` together with
//! every declared specification whose formal parameters unify with the call.
//! Each specification pairs a precondition query with a postcondition
//! update.
//!
//! ## Dispatch
//!
//! Specifications are tried in declaration order and the first one whose
//! precondition has answers wins. One answer is then chosen uniformly at
//! random through the context's [`crate::context::ChoiceSource`].
//!
//! ## Variable Scoping
//!
//! A specification is standardized apart before it is unified with the
//! call, so its variables never capture variables of the calling rule.

use crate::condition::{Condition, MentalLiteral};
use crate::context::{ExecutionContext, choose};
use crate::debug::Channel;
use crate::kr::{Substitution, Term, Var, mgu_all, write_list};
use crate::query::{Query, Update};
use crate::state::MentalState;
use crate::{ActionError, BaseKind};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// SPECIFICATION
// =============================================================================

/// Where a specification was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    pub file: String,
    pub line: usize,
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A declared precondition/postcondition pair for an action name.
///
/// Equality and hashing ignore the source location.
#[derive(Debug, Clone)]
pub struct ActionSpec {
    name: String,
    parameters: Vec<Term>,
    precondition: Query,
    postcondition: Update,
    external: bool,
    source: Option<SourceInfo>,
}

impl ActionSpec {
    /// An external specification without source information.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Term>,
        precondition: Query,
        postcondition: Update,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            precondition,
            postcondition,
            external: true,
            source: None,
        }
    }

    /// Whether performing the action is forwarded to the environment.
    #[must_use]
    pub fn with_external(self, external: bool) -> Self {
        Self { external, ..self }
    }

    #[must_use]
    pub fn with_source(self, source: SourceInfo) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameters(&self) -> &[Term] {
        &self.parameters
    }

    #[must_use]
    pub fn precondition(&self) -> &Query {
        &self.precondition
    }

    #[must_use]
    pub fn postcondition(&self) -> &Update {
        &self.postcondition
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.external
    }

    #[must_use]
    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = self.precondition.free_vars();
        vars.extend(self.postcondition.free_vars());
        for parameter in &self.parameters {
            parameter.collect_vars(&mut vars);
        }
        vars
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            name: self.name.clone(),
            parameters: self.parameters.iter().map(|p| p.apply_subst(subst)).collect(),
            precondition: self.precondition.apply_subst(subst),
            postcondition: self.postcondition.apply_subst(subst),
            external: self.external,
            source: self.source.clone(),
        }
    }

    /// Copy with every variable renamed to a fresh one.
    #[must_use]
    pub fn standardized_apart(&self) -> Self {
        self.apply_subst(&Substitution::standardize_apart(&self.free_vars()))
    }
}

impl PartialEq for ActionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.parameters == other.parameters
            && self.precondition == other.precondition
            && self.postcondition == other.postcondition
            && self.external == other.external
    }
}

impl Eq for ActionSpec {}

impl Hash for ActionSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.parameters.hash(state);
        self.precondition.hash(state);
        self.postcondition.hash(state);
        self.external.hash(state);
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_signature(f, &self.name, &self.parameters)?;
        write!(
            f,
            " {{ pre {{ {} }} post {{ {} }} }}",
            self.precondition, self.postcondition
        )
    }
}

fn write_signature(f: &mut fmt::Formatter<'_>, name: &str, parameters: &[Term]) -> fmt::Result {
    f.write_str(name)?;
    if !parameters.is_empty() {
        f.write_str("(")?;
        write_list(f, parameters)?;
        f.write_str(")")?;
    }
    Ok(())
}

/// The applicable specification and the answers to its precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecOptions {
    /// Position of the specification in the action's list.
    pub index: usize,
    /// Answers combined with the parameter unifier. Never empty.
    pub solutions: Vec<Substitution>,
}

// =============================================================================
// USER-SPECIFIED ACTION
// =============================================================================

/// A call of a user-specified action with its matching specifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserSpecAction {
    name: String,
    parameters: Vec<Term>,
    external: bool,
    specs: Vec<ActionSpec>,
}

impl UserSpecAction {
    /// A call without specifications. External until a specification says
    /// otherwise.
    #[must_use]
    pub fn new(name: impl Into<String>, parameters: Vec<Term>) -> Self {
        Self {
            name: name.into(),
            parameters,
            external: true,
            specs: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameters(&self) -> &[Term] {
        &self.parameters
    }

    #[must_use]
    pub fn specs(&self) -> &[ActionSpec] {
        &self.specs
    }

    /// Whether executing the action is forwarded to the environment.
    ///
    /// Every accepted specification overwrites this flag, so it reflects the
    /// last specification added rather than the one eventually selected.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.external
    }

    /// Attach `spec` if its name and arity match and its parameters unify
    /// with the call. Returns whether it was attached.
    pub fn add_specification(&mut self, spec: &ActionSpec) -> bool {
        if spec.name != self.name || spec.parameters.len() != self.parameters.len() {
            return false;
        }
        let renamed = spec.standardized_apart();
        let Some(unifier) = mgu_all(&renamed.parameters, &self.parameters) else {
            return false;
        };
        self.external = spec.external;
        self.specs.push(renamed.apply_subst(&unifier));
        true
    }

    /// The first specification whose precondition holds, with its answers.
    pub fn options(&self, state: &dyn MentalState) -> Result<Option<SpecOptions>, ActionError> {
        for (index, spec) in self.specs.iter().enumerate() {
            let Some(binding) = mgu_all(&spec.parameters, &self.parameters) else {
                continue;
            };
            let query = spec.precondition.apply_subst(&binding);
            let answers = state
                .query(&query, BaseKind::Belief)
                .map_err(|e| ActionError::query(self, e))?;
            let solutions: Vec<Substitution> =
                answers.iter().filter_map(|a| binding.combine(a)).collect();
            if !solutions.is_empty() {
                return Ok(Some(SpecOptions { index, solutions }));
            }
        }
        Ok(None)
    }

    /// The same call restricted to the specification at `index`.
    #[must_use]
    pub fn selected(&self, index: usize) -> Self {
        Self {
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            external: self.external,
            specs: self.specs.get(index).cloned().into_iter().collect(),
        }
    }

    pub(super) fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        for parameter in &self.parameters {
            parameter.collect_vars(&mut vars);
        }
        vars
    }

    pub(super) fn is_closed(&self) -> bool {
        self.parameters.iter().all(Term::is_closed)
    }

    pub(crate) fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            name: self.name.clone(),
            parameters: self.parameters.iter().map(|p| p.apply_subst(subst)).collect(),
            external: self.external,
            specs: self.specs.iter().map(|s| s.apply_subst(subst)).collect(),
        }
    }

    /// `bel(pre)` of the first specification.
    pub(super) fn precondition(&self) -> Condition {
        self.specs.first().map_or_else(Condition::truth, |spec| {
            Condition::new(vec![MentalLiteral::bel(spec.precondition.clone())])
        })
    }

    pub(super) fn evaluate_precondition(
        &self,
        state: &dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
        last_attempt: bool,
    ) -> Result<Option<Self>, ActionError> {
        let subject = self.to_string();
        let chosen = match self.options(state)? {
            Some(options) => choose(&mut *ctx.choices, &options.solutions)
                .map(|solution| self.selected(options.index).apply_subst(solution)),
            None => None,
        };

        if let Some(action) = chosen {
            ctx.debugger.breakpoint(
                Channel::PreconditionHolds,
                &subject,
                format_args!("precondition of {action} holds"),
            );
            return Ok(Some(action));
        }

        ctx.debugger.breakpoint(
            Channel::PreconditionFails,
            &subject,
            format_args!("no specification of {subject} is applicable"),
        );
        if last_attempt {
            tracing::warn!(action = %subject, "no applicable specification on last attempt");
            return Err(ActionError::ActionFailed {
                action: subject,
                reason: "no action specification applies".to_string(),
            });
        }
        Ok(None)
    }

    /// Forward to the environment if external, then apply the postcondition
    /// of the selected specification.
    pub(super) fn execute(
        &self,
        state: &mut dyn MentalState,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(), ActionError> {
        let Some(spec) = self.specs.first() else {
            return Err(ActionError::ActionFailed {
                action: self.to_string(),
                reason: "no action specification selected".to_string(),
            });
        };
        if self.external {
            ctx.environment.perform_action(self)?;
        }
        state
            .insert(&spec.postcondition, BaseKind::Belief)
            .and_then(|()| state.update_goal_state())
            .map_err(|e| ActionError::update(self, e))
    }
}

impl fmt::Display for UserSpecAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_signature(f, &self.name, &self.parameters)
    }
}

// =============================================================================
// TESTS
// =============================================================================

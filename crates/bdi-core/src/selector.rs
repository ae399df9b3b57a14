//! # Selectors
//!
//! A selector names the agent(s) an action or mental literal applies to.

use crate::context::{ChoiceSource, choose};
use crate::kr::{Substitution, Term, Var, write_list};
use crate::state::MentalState;
use crate::{ActionError, AgentId};
use std::collections::BTreeSet;
use std::fmt;

/// The kind of agent set a selector denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectorKind {
    /// The acting agent.
    SelfAgent,
    /// The acting agent, scoped to the current module.
    This,
    /// Every known agent, including the acting one.
    All,
    /// Every known agent except the acting one.
    AllOther,
    /// One known agent, chosen at random.
    Some,
    /// One known agent other than the acting one, chosen at random.
    SomeOther,
    /// The agents listed explicitly.
    Agents,
}

/// Selector expression: a kind plus, for `Agents`, the agent terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    kind: SelectorKind,
    agents: Vec<Term>,
}

impl Default for Selector {
    fn default() -> Self {
        Self::self_agent()
    }
}

impl Selector {
    #[must_use]
    pub fn self_agent() -> Self {
        Self::of_kind(SelectorKind::SelfAgent)
    }

    #[must_use]
    pub fn this() -> Self {
        Self::of_kind(SelectorKind::This)
    }

    /// A selector of any kind other than `Agents`.
    #[must_use]
    pub fn of_kind(kind: SelectorKind) -> Self {
        Self {
            kind,
            agents: Vec::new(),
        }
    }

    /// An explicit list of agent terms (constants, strings or variables).
    #[must_use]
    pub fn agents(agents: Vec<Term>) -> Self {
        Self {
            kind: SelectorKind::Agents,
            agents,
        }
    }

    /// Read a selector from a term: the keywords `self`, `this`, `all`,
    /// `allother`, `some`, `someother`; anything else names an agent.
    #[must_use]
    pub fn from_term(term: Term) -> Self {
        let kind = match term.functor() {
            Some(name) if term.args().is_empty() => match name {
                "self" => Some(SelectorKind::SelfAgent),
                "this" => Some(SelectorKind::This),
                "all" => Some(SelectorKind::All),
                "allother" => Some(SelectorKind::AllOther),
                "some" => Some(SelectorKind::Some),
                "someother" => Some(SelectorKind::SomeOther),
                _ => None,
            },
            _ => None,
        };
        match kind {
            Some(kind) => Self::of_kind(kind),
            None => Self::agents(vec![term]),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    #[must_use]
    pub fn agent_terms(&self) -> &[Term] {
        &self.agents
    }

    /// Whether the selector only ever denotes the acting agent.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self.kind, SelectorKind::SelfAgent | SelectorKind::This)
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            kind: self.kind,
            agents: self.agents.iter().map(|t| t.apply_subst(subst)).collect(),
        }
    }

    pub fn collect_vars(&self, vars: &mut BTreeSet<Var>) {
        for agent in &self.agents {
            agent.collect_vars(vars);
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.agents.iter().all(Term::is_closed)
    }

    /// Resolve the selector to concrete agents against the mental state.
    ///
    /// Explicitly named agents must be known to the mental state.
    pub fn resolve(
        &self,
        state: &dyn MentalState,
        choices: &mut dyn ChoiceSource,
    ) -> Result<BTreeSet<AgentId>, ActionError> {
        let me = state.agent_id().clone();
        let known = state.known_agents();
        let others = || known.iter().filter(|a| **a != me).cloned().collect::<Vec<_>>();

        let resolved = match self.kind {
            SelectorKind::SelfAgent | SelectorKind::This => BTreeSet::from([me.clone()]),
            SelectorKind::All => {
                let mut all = known.clone();
                all.insert(me.clone());
                all
            }
            SelectorKind::AllOther => others().into_iter().collect(),
            SelectorKind::Some => {
                let mut candidates = known.iter().cloned().collect::<Vec<_>>();
                if !known.contains(&me) {
                    candidates.push(me.clone());
                }
                choose(choices, &candidates).cloned().into_iter().collect()
            }
            SelectorKind::SomeOther => choose(choices, &others()).cloned().into_iter().collect(),
            SelectorKind::Agents => {
                let mut named = BTreeSet::new();
                for term in &self.agents {
                    let agent = AgentId::from_term(term).ok_or_else(|| {
                        ActionError::ActionFailed {
                            action: self.to_string(),
                            reason: format!("{term} does not name an agent"),
                        }
                    })?;
                    if agent != me && !known.contains(&agent) {
                        return Err(ActionError::UnknownReceiver(agent));
                    }
                    named.insert(agent);
                }
                named
            }
        };
        Ok(resolved)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SelectorKind::SelfAgent => f.write_str("self"),
            SelectorKind::This => f.write_str("this"),
            SelectorKind::All => f.write_str("all"),
            SelectorKind::AllOther => f.write_str("allother"),
            SelectorKind::Some => f.write_str("some"),
            SelectorKind::SomeOther => f.write_str("someother"),
            SelectorKind::Agents if self.agents.len() == 1 => write_list(f, &self.agents),
            SelectorKind::Agents => {
                f.write_str("[")?;
                write_list(f, &self.agents)?;
                f.write_str("]")
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Core Type Definitions
//!
//! Shared identifiers and error types for the action core:
//! - Agent identity (`AgentId`)
//! - Mental-state base selection (`BaseKind`)
//! - Error types (`ActionError`, `StateError`)
//!
//! ## Error Policy
//!
//! Every failure in this crate is a typed error propagated to the interpreter
//! loop. Nothing here retries or partially recovers.

use crate::kr::Term;
use std::fmt;
use thiserror::Error;

// =============================================================================
// AGENT IDENTITY
// =============================================================================

/// Name of an agent as used by selectors and message addressing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create a new agent id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the agent name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read an agent id out of a ground term.
    ///
    /// Constants (`bob`) and string literals (`"bob"`) name agents; anything
    /// else, including variables, does not.
    #[must_use]
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::Compound { functor, args } if args.is_empty() => Some(Self::new(functor)),
            Term::Str(text) => Some(Self::new(text)),
            _ => None,
        }
    }

    /// The constant term naming this agent.
    #[must_use]
    pub fn to_term(&self) -> Term {
        Term::atom(&self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// =============================================================================
// BASES
// =============================================================================

/// The sub-bases of a mental state that queries and updates address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseKind {
    Belief,
    Goal,
    Mailbox,
    Knowledge,
    Percept,
}

impl BaseKind {
    /// Short name used by the `log` action (`bb`, `gb`, `mb`, `kb`, `pb`).
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Belief => "bb",
            Self::Goal => "gb",
            Self::Mailbox => "mb",
            Self::Knowledge => "kb",
            Self::Percept => "pb",
        }
    }

    /// Inverse of [`BaseKind::short_name`].
    #[must_use]
    pub fn from_short_name(name: &str) -> Option<Self> {
        match name {
            "bb" => Some(Self::Belief),
            "gb" => Some(Self::Goal),
            "mb" => Some(Self::Mailbox),
            "kb" => Some(Self::Knowledge),
            "pb" => Some(Self::Percept),
            _ => None,
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Belief => "belief base",
            Self::Goal => "goal base",
            Self::Mailbox => "mailbox",
            Self::Knowledge => "knowledge base",
            Self::Percept => "percept base",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by a mental-state implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// An atom stored in a base must be ground.
    #[error("Cannot store non-ground atom {0} in the {1}")]
    NotGround(String, BaseKind),

    /// Only compound terms and constants can be stored or queried.
    #[error("Invalid atom: {0}")]
    InvalidAtom(String),

    /// The base does not support the requested operation.
    #[error("Operation not supported on the {0}")]
    UnsupportedBase(BaseKind),

    /// Goals can only be adopted for the owning agent.
    #[error("Cannot adopt a goal on behalf of agent {0}")]
    ForeignAgent(AgentId),
}

/// Errors raised while evaluating or executing actions.
///
/// - No silent failures
/// - All variants are fatal for the current rule; the interpreter loop turns
///   them into an agent-level failure event
#[derive(Debug, Error)]
pub enum ActionError {
    /// The precondition held but the action cannot be executed as instantiated.
    #[error("Action {action} failed: {reason}")]
    ActionFailed { action: String, reason: String },

    /// The mental state raised an error while evaluating a precondition.
    #[error("Query failed while evaluating {action}: {source}")]
    QueryFailed {
        action: String,
        #[source]
        source: StateError,
    },

    /// The mental state rejected an update issued by an action.
    #[error("Update failed while executing {action}: {source}")]
    UpdateFailed {
        action: String,
        #[source]
        source: StateError,
    },

    /// An action combo needs at least one action.
    #[error("Cannot build an action combo from zero actions")]
    EmptyCombo,

    /// The operation is deliberately not implemented.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A selector named an agent the mental state does not know.
    #[error("Unknown receiver: {0}")]
    UnknownReceiver(AgentId),

    /// The environment bridge refused an action or message. Returned by
    /// [`Environment`](crate::Environment) implementations.
    #[error("Environment rejected {action}: {reason}")]
    Environment { action: String, reason: String },
}

impl ActionError {
    /// The action still has free variables where it must be closed.
    pub fn free_variables(action: &(impl fmt::Display + ?Sized)) -> Self {
        Self::ActionFailed {
            action: action.to_string(),
            reason: "free variables".to_string(),
        }
    }

    pub(crate) fn query(action: &(impl fmt::Display + ?Sized), source: StateError) -> Self {
        Self::QueryFailed {
            action: action.to_string(),
            source,
        }
    }

    pub(crate) fn update(action: &(impl fmt::Display + ?Sized), source: StateError) -> Self {
        Self::UpdateFailed {
            action: action.to_string(),
            source,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_from_constant_and_string() {
        assert_eq!(AgentId::from_term(&Term::atom("bob")), Some(AgentId::new("bob")));
        assert_eq!(
            AgentId::from_term(&Term::string("Bob Smith")),
            Some(AgentId::new("Bob Smith"))
        );
    }

    #[test]
    fn agent_id_rejects_variables_and_compounds() {
        assert_eq!(AgentId::from_term(&Term::var("X")), None);
        assert_eq!(
            AgentId::from_term(&Term::compound("f", vec![Term::atom("a")])),
            None
        );
    }

    #[test]
    fn base_short_names_round_trip() {
        for base in [
            BaseKind::Belief,
            BaseKind::Goal,
            BaseKind::Mailbox,
            BaseKind::Knowledge,
            BaseKind::Percept,
        ] {
            assert_eq!(BaseKind::from_short_name(base.short_name()), Some(base));
        }
        assert_eq!(BaseKind::from_short_name("xb"), None);
    }

    #[test]
    fn free_variables_error_names_action() {
        let err = ActionError::free_variables(&"insert(on(X, b))");
        assert_eq!(err.to_string(), "Action insert(on(X, b)) failed: free variables");
    }
}

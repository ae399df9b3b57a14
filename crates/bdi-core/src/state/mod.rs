//! # Mental State
//!
//! The contract the action core consumes from an agent's mental state, and
//! an in-memory reference implementation.
//!
//! The core never stores a mental state: it borrows one for the duration of a
//! cycle, queries it while evaluating preconditions and mutates it while
//! executing actions.

mod memory;

pub use memory::{Goal, MemoryState};

use crate::kr::Substitution;
use crate::query::{Query, Update};
use crate::{AgentId, BaseKind, StateError};
use std::collections::BTreeSet;

// =============================================================================
// MENTALSTATE TRAIT
// =============================================================================

/// Belief base, goal base and mailbox of a single agent.
///
/// Implementations must call nothing back into the core; they are plain
/// storage plus query evaluation.
pub trait MentalState {
    /// The agent owning this state.
    fn agent_id(&self) -> &AgentId;

    /// Agents this agent can address, excluding or including itself.
    fn known_agents(&self) -> BTreeSet<AgentId>;

    /// All answers to `query` against `base`, in deterministic order.
    /// An empty result means the query does not hold.
    fn query(&self, query: &Query, base: BaseKind) -> Result<Vec<Substitution>, StateError>;

    /// Apply `update` to `base`: add positive literals, remove negative ones.
    fn insert(&mut self, update: &Update, base: BaseKind) -> Result<(), StateError>;

    /// Apply the inverse of `update` to `base`: remove positive literals,
    /// add negative ones.
    fn delete(&mut self, update: &Update, base: BaseKind) -> Result<(), StateError>;

    /// Add `goal` to the goal base, as a sub-goal of the current module when
    /// `as_subgoal` is set.
    fn adopt(&mut self, goal: &Update, as_subgoal: bool, agent: &AgentId)
    -> Result<(), StateError>;

    /// Remove every goal that entails `goal`.
    fn drop_goal(&mut self, goal: &Update) -> Result<(), StateError>;

    /// Remove goals that are now believed to be achieved. Must run after
    /// every belief or mailbox change.
    fn update_goal_state(&mut self) -> Result<(), StateError>;

    /// Human-readable contents of a base, one entry per element.
    fn base_contents(&self, base: BaseKind) -> Vec<String>;
}

//! # In-Memory Mental State
//!
//! Reference `MentalState` backed by ordered sets of atoms.
//!
//! - Belief, knowledge and percept bases hold ground atoms only
//! - The mailbox may hold atoms with variables (stored interrogatives)
//! - The goal base is an ordered list of conjunctive goals
//!
//! All collections are `BTreeSet`/`Vec` so query answers come back in a
//! deterministic order.

use super::MentalState;
use crate::kr::{Substitution, Term, mgu};
use crate::primitives::TRUE_ATOM;
use crate::query::{Literal, Query, Update};
use crate::{AgentId, BaseKind, StateError};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// GOAL
// =============================================================================

/// A conjunctive goal: every atom must be believed for it to be achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    atoms: BTreeSet<Term>,
    subgoal: bool,
}

impl Goal {
    #[must_use]
    pub fn atoms(&self) -> &BTreeSet<Term> {
        &self.atoms
    }

    /// Whether the goal was adopted in the scope of the current module.
    #[must_use]
    pub fn is_subgoal(&self) -> bool {
        self.subgoal
    }

    #[must_use]
    pub fn contains(&self, atom: &Term) -> bool {
        self.atoms.contains(atom)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms: Vec<_> = self.atoms.iter().collect();
        crate::kr::write_list(f, &atoms)
    }
}

// =============================================================================
// MEMORY STATE
// =============================================================================

/// In-memory mental state of one agent.
#[derive(Debug, Clone)]
pub struct MemoryState {
    agent: AgentId,
    agents: BTreeSet<AgentId>,
    beliefs: BTreeSet<Term>,
    knowledge: BTreeSet<Term>,
    percepts: BTreeSet<Term>,
    mailbox: BTreeSet<Term>,
    goals: Vec<Goal>,
}

impl MemoryState {
    /// Create an empty state for `agent`.
    #[must_use]
    pub fn new(agent: impl Into<AgentId>) -> Self {
        Self {
            agent: agent.into(),
            agents: BTreeSet::new(),
            beliefs: BTreeSet::new(),
            knowledge: BTreeSet::new(),
            percepts: BTreeSet::new(),
            mailbox: BTreeSet::new(),
            goals: Vec::new(),
        }
    }

    /// Register agents this agent can address.
    #[must_use]
    pub fn with_agents<I, A>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AgentId>,
    {
        self.agents.extend(agents.into_iter().map(Into::into));
        self
    }

    /// Insert into the belief base without recomputing goals.
    pub fn add_beliefs(&mut self, update: &Update) -> Result<(), StateError> {
        self.insert(update, BaseKind::Belief)
    }

    /// Insert static knowledge.
    pub fn add_knowledge(&mut self, update: &Update) -> Result<(), StateError> {
        self.insert(update, BaseKind::Knowledge)
    }

    /// Insert percepts for the current cycle.
    pub fn add_percepts(&mut self, update: &Update) -> Result<(), StateError> {
        self.insert(update, BaseKind::Percept)
    }

    pub fn beliefs(&self) -> impl Iterator<Item = &Term> {
        self.beliefs.iter()
    }

    #[must_use]
    pub fn believes(&self, atom: &Term) -> bool {
        self.beliefs.contains(atom) || self.knowledge.contains(atom)
    }

    pub fn mailbox(&self) -> impl Iterator<Item = &Term> {
        self.mailbox.iter()
    }

    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    fn facts(&self, base: BaseKind) -> Vec<&Term> {
        match base {
            BaseKind::Belief => self.beliefs.iter().chain(&self.knowledge).collect(),
            BaseKind::Knowledge => self.knowledge.iter().collect(),
            BaseKind::Percept => self.percepts.iter().collect(),
            BaseKind::Mailbox => self.mailbox.iter().collect(),
            BaseKind::Goal => Vec::new(),
        }
    }

    fn set_mut(&mut self, base: BaseKind) -> Result<&mut BTreeSet<Term>, StateError> {
        match base {
            BaseKind::Belief => Ok(&mut self.beliefs),
            BaseKind::Knowledge => Ok(&mut self.knowledge),
            BaseKind::Percept => Ok(&mut self.percepts),
            BaseKind::Mailbox => Ok(&mut self.mailbox),
            BaseKind::Goal => Err(StateError::UnsupportedBase(base)),
        }
    }

    /// Validate, then apply. Nothing is changed if any literal is rejected.
    fn apply(&mut self, update: &Update, base: BaseKind, invert: bool) -> Result<(), StateError> {
        for literal in update.literals() {
            check_atom(&literal.atom)?;
            if base != BaseKind::Mailbox && !literal.atom.is_closed() {
                return Err(StateError::NotGround(literal.atom.to_string(), base));
            }
        }
        let set = self.set_mut(base)?;
        for literal in update.literals() {
            if literal.positive != invert {
                set.insert(literal.atom.clone());
            } else {
                remove_matching(set, &literal.atom);
            }
        }
        Ok(())
    }
}

impl MentalState for MemoryState {
    fn agent_id(&self) -> &AgentId {
        &self.agent
    }

    fn known_agents(&self) -> BTreeSet<AgentId> {
        self.agents.clone()
    }

    fn query(&self, query: &Query, base: BaseKind) -> Result<Vec<Substitution>, StateError> {
        let mut answers = BTreeSet::new();
        if base == BaseKind::Goal {
            for goal in &self.goals {
                let facts: Vec<&Term> = goal.atoms.iter().collect();
                solve(query.literals(), &facts, &Substitution::empty(), &mut answers)?;
            }
        } else {
            let facts = self.facts(base);
            solve(query.literals(), &facts, &Substitution::empty(), &mut answers)?;
        }
        let vars = query.free_vars();
        let restricted: BTreeSet<_> = answers.iter().map(|a| a.restrict(&vars)).collect();
        Ok(restricted.into_iter().collect())
    }

    fn insert(&mut self, update: &Update, base: BaseKind) -> Result<(), StateError> {
        self.apply(update, base, false)
    }

    fn delete(&mut self, update: &Update, base: BaseKind) -> Result<(), StateError> {
        self.apply(update, base, true)
    }

    fn adopt(
        &mut self,
        goal: &Update,
        as_subgoal: bool,
        agent: &AgentId,
    ) -> Result<(), StateError> {
        if *agent != self.agent {
            return Err(StateError::ForeignAgent(agent.clone()));
        }
        let mut atoms = BTreeSet::new();
        for literal in goal.literals() {
            check_atom(&literal.atom)?;
            if !literal.positive {
                return Err(StateError::InvalidAtom(literal.to_string()));
            }
            if !literal.atom.is_closed() {
                return Err(StateError::NotGround(
                    literal.atom.to_string(),
                    BaseKind::Goal,
                ));
            }
            atoms.insert(literal.atom.clone());
        }
        if atoms.is_empty() || self.goals.iter().any(|g| g.atoms == atoms) {
            return Ok(());
        }
        self.goals.push(Goal {
            atoms,
            subgoal: as_subgoal,
        });
        Ok(())
    }

    fn drop_goal(&mut self, goal: &Update) -> Result<(), StateError> {
        let mut keep = Vec::with_capacity(self.goals.len());
        for existing in &self.goals {
            let facts: Vec<&Term> = existing.atoms.iter().collect();
            let mut answers = BTreeSet::new();
            solve(goal.literals(), &facts, &Substitution::empty(), &mut answers)?;
            keep.push(answers.is_empty());
        }
        let mut flags = keep.into_iter();
        self.goals.retain(|_| flags.next().unwrap_or(true));
        Ok(())
    }

    fn update_goal_state(&mut self) -> Result<(), StateError> {
        let beliefs = &self.beliefs;
        let knowledge = &self.knowledge;
        self.goals.retain(|goal| {
            !goal
                .atoms
                .iter()
                .all(|a| beliefs.contains(a) || knowledge.contains(a))
        });
        Ok(())
    }

    fn base_contents(&self, base: BaseKind) -> Vec<String> {
        match base {
            BaseKind::Goal => self.goals.iter().map(ToString::to_string).collect(),
            other => self
                .facts(other)
                .into_iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

// =============================================================================
// QUERY EVALUATION
// =============================================================================

fn check_atom(atom: &Term) -> Result<(), StateError> {
    match atom {
        Term::Compound { .. } => Ok(()),
        other => Err(StateError::InvalidAtom(other.to_string())),
    }
}

/// Stored atoms with variables are renamed before matching so they never
/// share variables with the query.
fn standardized(fact: &Term) -> Term {
    if fact.is_closed() {
        fact.clone()
    } else {
        Substitution::standardize_apart(&fact.free_vars()).apply(fact)
    }
}

fn solve(
    literals: &[Literal],
    facts: &[&Term],
    partial: &Substitution,
    answers: &mut BTreeSet<Substitution>,
) -> Result<(), StateError> {
    let Some((first, rest)) = literals.split_first() else {
        answers.insert(partial.clone());
        return Ok(());
    };
    let atom = first.atom.apply_subst(partial);
    check_atom(&atom)?;

    if atom.is_atom(TRUE_ATOM) {
        if first.positive {
            solve(rest, facts, partial, answers)?;
        }
        return Ok(());
    }

    if first.positive {
        for fact in facts {
            let fact = standardized(fact);
            if let Some(extended) = mgu(&atom, &fact).and_then(|m| partial.combine(&m)) {
                solve(rest, facts, &extended, answers)?;
            }
        }
    } else if !facts.iter().any(|f| mgu(&atom, &standardized(f)).is_some()) {
        solve(rest, facts, partial, answers)?;
    }
    Ok(())
}

fn remove_matching(set: &mut BTreeSet<Term>, pattern: &Term) {
    if pattern.is_closed() {
        set.remove(pattern);
    } else {
        set.retain(|fact| mgu(pattern, &standardized(fact)).is_none());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kr::{Var, parse_term};

    fn update(text: &str) -> Update {
        Update::parse(text).expect("update")
    }

    fn query(text: &str) -> Query {
        Query::parse(text).expect("query")
    }

    fn me() -> AgentId {
        AgentId::new("me")
    }

    #[test]
    fn belief_queries_include_knowledge() {
        let mut state = MemoryState::new("me");
        state.add_knowledge(&update("block(a), block(b)")).expect("kb");
        state.add_beliefs(&update("clear(a)")).expect("bb");

        let answers = state
            .query(&query("block(X), clear(X)"), BaseKind::Belief)
            .expect("query");
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].get(&Var::new("X")), Some(&Term::atom("a")));
    }

    #[test]
    fn insert_with_negative_literal_removes() {
        let mut state = MemoryState::new("me");
        state.add_beliefs(&update("on(a, table)")).expect("bb");
        state
            .insert(&update("not(on(a, table)), on(a, b)"), BaseKind::Belief)
            .expect("insert");
        assert!(!state.believes(&parse_term("on(a, table)").expect("term")));
        assert!(state.believes(&parse_term("on(a, b)").expect("term")));
    }

    #[test]
    fn non_ground_belief_insert_is_rejected_atomically() {
        let mut state = MemoryState::new("me");
        let result = state.insert(&update("p, q(X)"), BaseKind::Belief);
        assert!(matches!(result, Err(StateError::NotGround(_, BaseKind::Belief))));
        assert_eq!(state.beliefs().count(), 0);
    }

    #[test]
    fn mailbox_accepts_patterns() {
        let mut state = MemoryState::new("me");
        state
            .insert(&update("sent(bob, int(at(X)))"), BaseKind::Mailbox)
            .expect("insert");
        let answers = state
            .query(&query("sent(bob, int(at(Y)))"), BaseKind::Mailbox)
            .expect("query");
        assert_eq!(answers.len(), 1);

        state
            .delete(&update("sent(bob, Z)"), BaseKind::Mailbox)
            .expect("delete");
        assert_eq!(state.mailbox().count(), 0);
    }

    #[test]
    fn goal_queries_need_a_single_goal() {
        let mut state = MemoryState::new("me");
        state.adopt(&update("on(a, b)"), false, &me()).expect("adopt");
        state.adopt(&update("on(b, c)"), false, &me()).expect("adopt");

        assert_eq!(
            state.query(&query("on(a, b)"), BaseKind::Goal).expect("q").len(),
            1
        );
        assert!(
            state
                .query(&query("on(a, b), on(b, c)"), BaseKind::Goal)
                .expect("q")
                .is_empty()
        );
    }

    #[test]
    fn adopt_rejects_duplicates_and_foreign_agents() {
        let mut state = MemoryState::new("me");
        state.adopt(&update("p"), false, &me()).expect("adopt");
        state.adopt(&update("p"), true, &me()).expect("adopt again");
        assert_eq!(state.goals().len(), 1);
        assert!(!state.goals()[0].is_subgoal());

        let result = state.adopt(&update("q"), false, &AgentId::new("bob"));
        assert!(matches!(result, Err(StateError::ForeignAgent(_))));
    }

    #[test]
    fn drop_removes_every_entailing_goal() {
        let mut state = MemoryState::new("me");
        state.adopt(&update("on(a, b), on(b, c)"), false, &me()).expect("adopt");
        state.adopt(&update("on(a, b)"), false, &me()).expect("adopt");
        state.adopt(&update("clear(c)"), false, &me()).expect("adopt");

        state.drop_goal(&update("on(a, b)")).expect("drop");
        assert_eq!(state.goals().len(), 1);
        assert!(state.goals()[0].contains(&Term::compound("clear", vec![Term::atom("c")])));
    }

    #[test]
    fn achieved_goals_are_removed() {
        let mut state = MemoryState::new("me");
        state.adopt(&update("p, q"), false, &me()).expect("adopt");
        state.add_beliefs(&update("p")).expect("bb");
        state.update_goal_state().expect("update");
        assert_eq!(state.goals().len(), 1);

        state.add_beliefs(&update("q")).expect("bb");
        state.update_goal_state().expect("update");
        assert!(state.goals().is_empty());
    }

    #[test]
    fn queries_reject_non_atoms() {
        let state = MemoryState::new("me");
        let result = state.query(&Query::new(vec![Literal::pos(Term::int(3))]), BaseKind::Belief);
        assert!(matches!(result, Err(StateError::InvalidAtom(_))));
    }

    #[test]
    fn base_contents_lists_elements() {
        let mut state = MemoryState::new("me");
        state.add_beliefs(&update("b, a")).expect("bb");
        state.adopt(&update("g1, g2"), false, &me()).expect("adopt");
        assert_eq!(state.base_contents(BaseKind::Belief), vec!["a", "b"]);
        assert_eq!(state.base_contents(BaseKind::Goal), vec!["g1, g2"]);
    }
}

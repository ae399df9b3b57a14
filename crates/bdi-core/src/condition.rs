//! # Mental-State Conditions
//!
//! A condition is a conjunction of mental literals such as
//! `bel(clear(X)), not(goal(on(X, Y)))`. Action preconditions for built-ins
//! are conditions; user-specified preconditions are plain belief queries.

use crate::kr::{Substitution, Var};
use crate::query::Query;
use crate::selector::Selector;
use crate::state::MentalState;
use crate::{ActionError, BaseKind};
use std::collections::BTreeSet;
use std::fmt;

/// The mental operator of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentalOperator {
    /// Holds when the belief base (with knowledge) entails the query.
    Bel,
    /// Holds when a single goal entails the query.
    Goal,
}

impl MentalOperator {
    fn base(self) -> BaseKind {
        match self {
            Self::Bel => BaseKind::Belief,
            Self::Goal => BaseKind::Goal,
        }
    }
}

/// A possibly negated `bel(..)` or `goal(..)` literal scoped by a selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MentalLiteral {
    pub selector: Selector,
    pub operator: MentalOperator,
    pub positive: bool,
    pub query: Query,
}

impl MentalLiteral {
    /// `bel(query)` for the acting agent.
    #[must_use]
    pub fn bel(query: Query) -> Self {
        Self {
            selector: Selector::self_agent(),
            operator: MentalOperator::Bel,
            positive: true,
            query,
        }
    }

    /// `goal(query)` for the acting agent.
    #[must_use]
    pub fn goal(query: Query) -> Self {
        Self {
            selector: Selector::self_agent(),
            operator: MentalOperator::Goal,
            positive: true,
            query,
        }
    }

    /// Same literal, negated.
    #[must_use]
    pub fn negated(self) -> Self {
        Self {
            positive: !self.positive,
            ..self
        }
    }

    /// Same literal, scoped by another selector.
    #[must_use]
    pub fn scoped(self, selector: Selector) -> Self {
        Self { selector, ..self }
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            selector: self.selector.apply_subst(subst),
            operator: self.operator,
            positive: self.positive,
            query: self.query.apply_subst(subst),
        }
    }
}

impl fmt::Display for MentalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.operator {
            MentalOperator::Bel => "bel",
            MentalOperator::Goal => "goal",
        };
        let scope = if self.selector == Selector::self_agent() {
            String::new()
        } else {
            format!("{}.", self.selector)
        };
        if self.positive {
            write!(f, "{scope}{op}({})", self.query)
        } else {
            write!(f, "not({scope}{op}({}))", self.query)
        }
    }
}

/// A conjunction of mental literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    literals: Vec<MentalLiteral>,
}

impl Condition {
    #[must_use]
    pub fn new(literals: Vec<MentalLiteral>) -> Self {
        Self { literals }
    }

    /// `bel(true)` scoped to the acting agent.
    #[must_use]
    pub fn truth() -> Self {
        Self::new(vec![MentalLiteral::bel(Query::truth())])
    }

    #[must_use]
    pub fn literals(&self) -> &[MentalLiteral] {
        &self.literals
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            literals: self.literals.iter().map(|l| l.apply_subst(subst)).collect(),
        }
    }

    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        for literal in &self.literals {
            literal.selector.collect_vars(&mut vars);
            vars.extend(literal.query.free_vars());
        }
        vars
    }

    /// All substitutions under which the condition holds, in deterministic
    /// order. Negative literals are negation as failure and never bind.
    ///
    /// `subject` names the action (or rule) the condition belongs to and is
    /// used to describe errors.
    pub fn evaluate(
        &self,
        state: &dyn MentalState,
        subject: &dyn fmt::Display,
    ) -> Result<Vec<Substitution>, ActionError> {
        let mut solutions = vec![Substitution::empty()];
        for literal in &self.literals {
            if !literal.selector.is_local() {
                return Err(ActionError::ActionFailed {
                    action: subject.to_string(),
                    reason: format!(
                        "selector {} cannot scope a mental literal",
                        literal.selector
                    ),
                });
            }
            let base = literal.operator.base();
            let mut next = BTreeSet::new();
            for partial in &solutions {
                let query = literal.query.apply_subst(partial);
                let answers = state
                    .query(&query, base)
                    .map_err(|e| ActionError::query(subject, e))?;
                if literal.positive {
                    next.extend(answers.iter().filter_map(|a| partial.combine(a)));
                } else if answers.is_empty() {
                    next.insert(partial.clone());
                }
            }
            solutions = next.into_iter().collect();
            if solutions.is_empty() {
                break;
            }
        }
        Ok(solutions)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::kr::write_list(f, &self.literals)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kr::Term;
    use crate::query::Update;
    use crate::selector::SelectorKind;
    use crate::state::MemoryState;

    fn q(text: &str) -> Query {
        Query::parse(text).expect("query")
    }

    fn blocks() -> MemoryState {
        let mut state = MemoryState::new("me");
        state
            .add_beliefs(&Update::parse("clear(a), clear(b), on(a, table)").expect("update"))
            .expect("beliefs");
        state
    }

    #[test]
    fn truth_has_one_empty_solution() {
        let state = MemoryState::new("me");
        let sols = Condition::truth().evaluate(&state, &"test").expect("eval");
        assert_eq!(sols, vec![Substitution::empty()]);
    }

    #[test]
    fn positive_literals_join() {
        let state = blocks();
        let cond = Condition::new(vec![
            MentalLiteral::bel(q("clear(X)")),
            MentalLiteral::bel(q("on(X, table)")),
        ]);
        let sols = cond.evaluate(&state, &"test").expect("eval");
        assert_eq!(sols.len(), 1);
        assert_eq!(sols[0].get(&Var::new("X")), Some(&Term::atom("a")));
    }

    #[test]
    fn negative_literals_filter() {
        let state = blocks();
        let cond = Condition::new(vec![
            MentalLiteral::bel(q("clear(X)")),
            MentalLiteral::bel(q("on(X, table)")).negated(),
        ]);
        let sols = cond.evaluate(&state, &"test").expect("eval");
        assert_eq!(sols.len(), 1);
        assert_eq!(sols[0].get(&Var::new("X")), Some(&Term::atom("b")));
    }

    #[test]
    fn non_local_selector_is_rejected() {
        let state = blocks();
        let cond = Condition::new(vec![
            MentalLiteral::bel(q("clear(a)")).scoped(Selector::of_kind(SelectorKind::All)),
        ]);
        assert!(matches!(
            cond.evaluate(&state, &"test"),
            Err(ActionError::ActionFailed { .. })
        ));
    }

    #[test]
    fn display_shows_scope_and_negation() {
        let lit = MentalLiteral::goal(q("on(a, b)"))
            .scoped(Selector::this())
            .negated();
        assert_eq!(lit.to_string(), "not(this.goal(on(a, b)))");
    }
}

//! # Query Module
//!
//! Conjunctive queries and updates over a single mental-state base.
//!
//! - A `Query` is an ordered conjunction of literals; the empty query is `true`
//! - An `Update` is a conjunction whose positive literals are added and whose
//!   negative literals are removed
//! - `not(p)` in the textual syntax marks a negative literal

use crate::kr::{ParseError, Substitution, Term, Var, parse_terms, write_list};
use crate::primitives::{MAILBOX_FUNCTORS, NEGATION, TRUE_ATOM};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// LITERAL
// =============================================================================

/// A possibly negated atom.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub positive: bool,
    pub atom: Term,
}

impl Literal {
    /// A positive literal.
    #[must_use]
    pub fn pos(atom: Term) -> Self {
        Self {
            positive: true,
            atom,
        }
    }

    /// A negative literal.
    #[must_use]
    pub fn neg(atom: Term) -> Self {
        Self {
            positive: false,
            atom,
        }
    }

    /// Read `not(p)` as a negative literal and anything else as positive.
    #[must_use]
    pub fn from_term(term: Term) -> Self {
        match term {
            Term::Compound { functor, mut args } if functor == NEGATION && args.len() == 1 => {
                Self::neg(args.remove(0))
            }
            other => Self::pos(other),
        }
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            positive: self.positive,
            atom: self.atom.apply_subst(subst),
        }
    }

    /// Whether the atom addresses the mailbox (`sent/2`, `received/2`).
    #[must_use]
    pub fn is_mailbox(&self) -> bool {
        MAILBOX_FUNCTORS
            .iter()
            .any(|name| self.atom.has_signature(name, 2))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "{}", self.atom)
        } else {
            write!(f, "{NEGATION}({})", self.atom)
        }
    }
}

fn parse_literals(input: &str) -> Result<Vec<Literal>, ParseError> {
    Ok(parse_terms(input)?
        .into_iter()
        .map(Literal::from_term)
        .collect())
}

fn collect_vars(literals: &[Literal]) -> BTreeSet<Var> {
    let mut vars = BTreeSet::new();
    for literal in literals {
        literal.atom.collect_vars(&mut vars);
    }
    vars
}

// =============================================================================
// QUERY
// =============================================================================

/// A conjunctive query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Query {
    literals: Vec<Literal>,
}

impl Query {
    /// The query `true`.
    #[must_use]
    pub fn truth() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    /// Parse a comma-separated conjunction. Blank text and `true` both give
    /// the trivial query.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let literals = parse_literals(input)?
            .into_iter()
            .filter(|l| !(l.positive && l.atom.is_atom(TRUE_ATOM)))
            .collect();
        Ok(Self { literals })
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Whether this is the trivial query `true`.
    #[must_use]
    pub fn is_truth(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            literals: self.literals.iter().map(|l| l.apply_subst(subst)).collect(),
        }
    }

    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<Var> {
        collect_vars(&self.literals)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.literals.iter().all(|l| l.atom.is_closed())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literals.is_empty() {
            f.write_str("true")
        } else {
            write_list(f, &self.literals)
        }
    }
}

// =============================================================================
// UPDATE
// =============================================================================

/// A conjunctive update: positive literals are added, negative removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Update {
    literals: Vec<Literal>,
}

impl Update {
    #[must_use]
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    /// An update adding every atom.
    #[must_use]
    pub fn adding(atoms: impl IntoIterator<Item = Term>) -> Self {
        Self {
            literals: atoms.into_iter().map(Literal::pos).collect(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Ok(Self {
            literals: parse_literals(input)?,
        })
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Atoms this update adds.
    pub fn added(&self) -> impl Iterator<Item = &Term> {
        self.literals.iter().filter(|l| l.positive).map(|l| &l.atom)
    }

    /// Atoms this update removes.
    pub fn removed(&self) -> impl Iterator<Item = &Term> {
        self.literals.iter().filter(|l| !l.positive).map(|l| &l.atom)
    }

    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        Self {
            literals: self.literals.iter().map(|l| l.apply_subst(subst)).collect(),
        }
    }

    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<Var> {
        collect_vars(&self.literals)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.literals.iter().all(|l| l.atom.is_closed())
    }

    /// The same conjunction read as a query.
    #[must_use]
    pub fn to_query(&self) -> Query {
        Query::new(self.literals.clone())
    }

    /// Split into the belief-base part and the mailbox part.
    #[must_use]
    pub fn split_mailbox(&self) -> (Self, Self) {
        let (mail, beliefs): (Vec<_>, Vec<_>) =
            self.literals.iter().cloned().partition(Literal::is_mailbox);
        (Self::new(beliefs), Self::new(mail))
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.literals)
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Substitutions and Unification
//!
//! A `Substitution` is an immutable, idempotent mapping from variables to
//! terms: no bound variable occurs in any binding's right-hand side, so a
//! single application fully instantiates a term.

use super::{Term, Var};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Mapping from variables to terms.
///
/// Uses `BTreeMap` so iteration order (and therefore solution order) is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Substitution {
    bindings: BTreeMap<Var, Term>,
}

impl Substitution {
    /// The empty substitution.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A substitution with a single binding.
    #[must_use]
    pub fn single(var: Var, term: Term) -> Self {
        let mut subst = Self::empty();
        subst.bind(var, term);
        subst
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn get(&self, var: &Var) -> Option<&Term> {
        self.bindings.get(var)
    }

    /// Bindings in variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&Var, &Term)> {
        self.bindings.iter()
    }

    /// Apply this substitution to a term.
    #[must_use]
    pub fn apply(&self, term: &Term) -> Term {
        term.apply_subst(self)
    }

    /// Merge two substitutions.
    ///
    /// Returns `None` when they bind a shared variable to non-unifiable terms.
    #[must_use]
    pub fn combine(&self, other: &Self) -> Option<Self> {
        let mut combined = self.clone();
        for (var, term) in &other.bindings {
            if !unify_into(&Term::Var(var.clone()), term, &mut combined) {
                return None;
            }
        }
        Some(combined)
    }

    /// Keep only bindings for the given variables.
    #[must_use]
    pub fn restrict(&self, vars: &BTreeSet<Var>) -> Self {
        Self {
            bindings: self
                .bindings
                .iter()
                .filter(|(v, _)| vars.contains(*v))
                .map(|(v, t)| (v.clone(), t.clone()))
                .collect(),
        }
    }

    /// A renaming that maps every variable in `vars` to a fresh variable.
    #[must_use]
    pub fn standardize_apart(vars: &BTreeSet<Var>) -> Self {
        Self {
            bindings: vars
                .iter()
                .map(|v| (v.clone(), Term::Var(v.fresh())))
                .collect(),
        }
    }

    /// Add `var -> term`, keeping the substitution idempotent.
    ///
    /// The caller guarantees `var` is unbound and does not occur in `term`
    /// after `term` has been instantiated by `self`.
    fn bind(&mut self, var: Var, term: Term) {
        let single = Self {
            bindings: BTreeMap::from([(var.clone(), term.clone())]),
        };
        for bound in self.bindings.values_mut() {
            *bound = bound.apply_subst(&single);
        }
        self.bindings.insert(var, term);
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (var, term)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{var}/{term}")?;
        }
        f.write_str("]")
    }
}

// =============================================================================
// UNIFICATION
// =============================================================================

/// Most general unifier of two terms.
#[must_use]
pub fn mgu(a: &Term, b: &Term) -> Option<Substitution> {
    let mut subst = Substitution::empty();
    unify_into(a, b, &mut subst).then_some(subst)
}

/// Most general unifier of two equally long term lists.
#[must_use]
pub fn mgu_all(a: &[Term], b: &[Term]) -> Option<Substitution> {
    if a.len() != b.len() {
        return None;
    }
    let mut subst = Substitution::empty();
    for (x, y) in a.iter().zip(b) {
        if !unify_into(x, y, &mut subst) {
            return None;
        }
    }
    Some(subst)
}

/// Extend `subst` so that it unifies `a` and `b`. On failure `subst` may be
/// partially extended; callers discard it.
fn unify_into(a: &Term, b: &Term, subst: &mut Substitution) -> bool {
    let a = a.apply_subst(subst);
    let b = b.apply_subst(subst);
    match (&a, &b) {
        (Term::Var(x), Term::Var(y)) if x == y => true,
        (Term::Var(x), other) | (other, Term::Var(x)) => {
            if other.occurs(x) {
                return false;
            }
            subst.bind(x.clone(), other.clone());
            true
        }
        (Term::Int(x), Term::Int(y)) => x == y,
        (Term::Str(x), Term::Str(y)) => x == y,
        (
            Term::Compound {
                functor: f,
                args: xs,
            },
            Term::Compound {
                functor: g,
                args: ys,
            },
        ) => {
            f == g
                && xs.len() == ys.len()
                && xs.iter().zip(ys).all(|(x, y)| unify_into(x, y, subst))
        }
        _ => false,
    }
}

// =============================================================================
// TESTS
// =============================================================================

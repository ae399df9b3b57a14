//! # Terms and Variables
//!
//! First-order terms for the built-in knowledge representation.
//!
//! Terms are immutable values: applying a substitution always builds a new
//! term. Variables carry a generation so that renamed copies produced while
//! standardizing apart can never collide with variables written in source.

use super::Substitution;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generation counter for fresh variables. Generation 0 is reserved for
/// variables that come from source text.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// VARIABLES
// =============================================================================

/// A logic variable.
///
/// Two variables are the same only if both name and generation match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var {
    name: String,
    generation: u64,
}

impl Var {
    /// A source-level variable.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generation: 0,
        }
    }

    /// A fresh copy of this variable that no other variable in the process
    /// shares.
    #[must_use]
    pub fn fresh(&self) -> Self {
        Self {
            name: self.name.clone(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this variable was produced by [`Var::fresh`].
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.generation != 0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            f.write_str(&self.name)
        } else {
            write!(f, "{}_{}", self.name, self.generation)
        }
    }
}

// =============================================================================
// TERMS
// =============================================================================

/// A first-order term.
///
/// Constants are compounds without arguments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Var(Var),
    Int(i64),
    Str(String),
    Compound { functor: String, args: Vec<Term> },
}

impl Term {
    /// A source-level variable term.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(Var::new(name))
    }

    /// A constant.
    #[must_use]
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Compound {
            functor: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn compound(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Self::Compound {
            functor: functor.into(),
            args,
        }
    }

    /// A string literal. The stored text excludes the quotes.
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::Str(text.into())
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }

    /// Functor name of a compound or constant.
    #[must_use]
    pub fn functor(&self) -> Option<&str> {
        match self {
            Self::Compound { functor, .. } => Some(functor),
            _ => None,
        }
    }

    /// Arguments of a compound; empty for everything else.
    #[must_use]
    pub fn args(&self) -> &[Term] {
        match self {
            Self::Compound { args, .. } => args,
            _ => &[],
        }
    }

    /// Whether this term is a compound (or constant) with the given
    /// functor and arity.
    #[must_use]
    pub fn has_signature(&self, name: &str, arity: usize) -> bool {
        matches!(self, Self::Compound { functor, args } if functor == name && args.len() == arity)
    }

    /// Whether this is a constant with the given name.
    #[must_use]
    pub fn is_atom(&self, name: &str) -> bool {
        self.has_signature(name, 0)
    }

    /// Whether the term contains no variables.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Var(_) => false,
            Self::Int(_) | Self::Str(_) => true,
            Self::Compound { args, .. } => args.iter().all(Term::is_closed),
        }
    }

    /// All variables occurring in the term.
    #[must_use]
    pub fn free_vars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    /// Add the variables of this term to `vars`.
    pub fn collect_vars(&self, vars: &mut BTreeSet<Var>) {
        match self {
            Self::Var(v) => {
                vars.insert(v.clone());
            }
            Self::Int(_) | Self::Str(_) => {}
            Self::Compound { args, .. } => {
                for arg in args {
                    arg.collect_vars(vars);
                }
            }
        }
    }

    /// Whether `var` occurs anywhere in the term.
    #[must_use]
    pub fn occurs(&self, var: &Var) -> bool {
        match self {
            Self::Var(v) => v == var,
            Self::Int(_) | Self::Str(_) => false,
            Self::Compound { args, .. } => args.iter().any(|a| a.occurs(var)),
        }
    }

    /// Build a new term with the substitution applied.
    #[must_use]
    pub fn apply_subst(&self, subst: &Substitution) -> Self {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            Self::Var(v) => subst.get(v).cloned().unwrap_or_else(|| self.clone()),
            Self::Int(_) | Self::Str(_) => self.clone(),
            Self::Compound { functor, args } => Self::Compound {
                functor: functor.clone(),
                args: args.iter().map(|a| a.apply_subst(subst)).collect(),
            },
        }
    }
}

impl From<Var> for Term {
    fn from(var: Var) -> Self {
        Self::Var(var)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(v) => write!(f, "{v}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Self::Compound { functor, args } => {
                f.write_str(functor)?;
                if !args.is_empty() {
                    f.write_str("(")?;
                    write_list(f, args)?;
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

/// Write `items` separated by `, `.
pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

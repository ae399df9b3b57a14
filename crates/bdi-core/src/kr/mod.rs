//! # Knowledge Representation
//!
//! The built-in term language consumed by the action core: terms,
//! variables with a standardize-apart generator, substitutions, most general
//! unifiers and a parser for the textual syntax.

mod parse;
mod substitution;
mod term;

pub use parse::{ParseError, parse_term, parse_terms};
pub use substitution::{Substitution, mgu, mgu_all};
pub use term::{Term, Var};

pub(crate) use term::write_list;

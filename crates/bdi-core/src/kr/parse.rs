//! # Term Parser
//!
//! Reads the Prolog-like surface syntax used for queries, updates and
//! action parameters:
//!
//! - `foo`, `on(a, b)`: constants and compounds (lowercase start)
//! - `X`, `_Tmp`: variables (uppercase or underscore start); a lone `_` is
//!   anonymous and fresh on every occurrence
//! - `42`, `-7`: integers
//! - `"text"`, `'text'`: string literals, `\` escapes the next character

use super::{Term, Var};
use thiserror::Error;

/// Malformed term text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at offset {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

/// Parse a single term. Trailing input is an error.
pub fn parse_term(input: &str) -> Result<Term, ParseError> {
    let mut parser = Parser::new(input);
    let term = parser.term()?;
    parser.expect_end()?;
    Ok(term)
}

/// Parse a comma-separated list of terms. Blank input yields an empty list.
pub fn parse_terms(input: &str) -> Result<Vec<Term>, ParseError> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    if parser.at_end() {
        return Ok(Vec::new());
    }
    let terms = parser.term_list()?;
    parser.expect_end()?;
    Ok(terms)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_ws();
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        self.skip_ws();
        match self.bump() {
            Some(found) if found == c => Ok(()),
            Some(found) => {
                self.pos -= 1;
                Err(self.error(format!("expected '{c}', found '{found}'")))
            }
            None => Err(self.error(format!("expected '{c}', found end of input"))),
        }
    }

    fn term_list(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut terms = vec![self.term()?];
        loop {
            self.skip_ws();
            if self.peek() == Some(',') {
                self.pos += 1;
                terms.push(self.term()?);
            } else {
                return Ok(terms);
            }
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn term(&mut self) -> Result<Term, ParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("expected a term, found end of input")),
            Some(c) if c == '"' || c == '\'' => self.string(c),
            Some(c) if c.is_ascii_digit() || c == '-' => self.integer(),
            Some(c) if c.is_uppercase() || c == '_' => {
                let name = self.identifier();
                let var = Var::new(name);
                if var.name() == "_" {
                    Ok(Term::Var(var.fresh()))
                } else {
                    Ok(Term::Var(var))
                }
            }
            Some(c) if c.is_lowercase() => {
                let functor = self.identifier();
                self.skip_ws();
                if self.peek() == Some('(') {
                    self.pos += 1;
                    let args = self.term_list()?;
                    self.expect(')')?;
                    Ok(Term::compound(functor, args))
                } else {
                    Ok(Term::atom(functor))
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    fn integer(&mut self) -> Result<Term, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<i64>().map(Term::Int).map_err(|_| ParseError {
            position: start,
            message: format!("invalid integer '{text}'"),
        })
    }

    fn string(&mut self, quote: char) -> Result<Term, ParseError> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal")),
                Some('\\') => match self.bump() {
                    Some(escaped) => text.push(escaped),
                    None => return Err(self.error("unterminated string literal")),
                },
                Some(c) if c == quote => return Ok(Term::Str(text)),
                Some(c) => text.push(c),
            }
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
    fn parses_compounds_and_variables() {
        let t = parse_term("on(X, b)").expect("parse");
        assert_eq!(
            t,
            Term::compound("on", vec![Term::var("X"), Term::atom("b")])
        );
    }

    #[test]
    fn parses_literals() {
        assert_eq!(parse_term("-12").expect("int"), Term::int(-12));
        assert_eq!(parse_term("\"a \\\"b\\\"\"").expect("str"), Term::string("a \"b\""));
        assert_eq!(parse_term("'single'").expect("str"), Term::string("single"));
    }

    #[test]
    fn anonymous_variables_are_distinct() {
        let t = parse_term("f(_, _)").expect("parse");
        let args = t.args();
        assert_eq!(args.len(), 2);
        assert_ne!(args[0], args[1]);
    }

    #[test]
    fn parses_term_lists() {
        let ts = parse_terms("on(a, b), not(clear(c))").expect("parse");
        assert_eq!(ts.len(), 2);
        assert!(parse_terms("   ").expect("blank").is_empty());
    }

    #[test]
    fn display_reparses_to_same_term() {
        let t = parse_term("msg(bob, \"hi\", 3, f(X))").expect("parse");
        assert_eq!(parse_term(&t.to_string()).expect("reparse"), t);
    }

    #[test]
    fn reports_errors_with_position() {
        let err = parse_term("on(a, b").expect_err("missing paren");
        assert_eq!(err.position, 7);
        assert!(parse_term("on(a) x").is_err());
        assert!(parse_term("\"open").is_err());
        assert!(parse_term("#").is_err());
    }
}

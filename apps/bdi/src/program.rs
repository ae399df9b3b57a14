//! # Agent Programs
//!
//! TOML program files and their translation into core values.
//!
//! ```toml
//! agent = "alice"
//! agents = ["bob"]
//! beliefs = ["on(a, b)", "on(b, table)", "clear(a)"]
//! goals = ["on(b, a)"]
//!
//! [[actions]]
//! name = "move"
//! parameters = "X, Y"
//! pre = "on(X, Z), clear(X), clear(Y)"
//! post = "on(X, Y), not(on(X, Z)), clear(Z), not(clear(Y))"
//!
//! [[rules]]
//! condition = "goal(on(X, Y)), bel(clear(X), clear(Y))"
//! actions = ["move(X, Y)", "print(\"moved\")"]
//! ```
//!
//! Rule actions use the term syntax of the core:
//! - `adopt(..)`, `drop(..)`, `insert(..)`, `delete(..)` take a conjunction
//! - `send(To, Content)` and `send(To, "!", Content)` (also `sendonce`); the
//!   mood is one of `":"`, `"!"`, `"?"`
//! - `print(T)`, `log(T)`, `exit_module`, `exit_module(all)`
//! - anything else calls a user-specified action declared in `[[actions]]`

use bdi_core::{
    Action, ActionCombo, ActionError, ActionSpec, AdoptAction, AdoptOneAction, AgentId,
    Condition, DeleteAction, DropAction, ExitModuleAction, ExitModuleKind, InsertAction, Literal,
    LogAction, MemoryState, MentalLiteral, MentalState, Mood, ParseError, PrintAction, Query,
    Selector, SendAction, SendOnceAction, SourceInfo, StateError, Term, Update, UserSpecAction,
    parse_term, parse_terms,
};
use bdi_core::primitives::{NEGATION, TRUE_ATOM};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised while loading or compiling a program.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("Cannot read program {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid program file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: ParseError,
    },

    #[error("{context}: {source}")]
    State {
        context: String,
        #[source]
        source: StateError,
    },

    #[error("{context}: {source}")]
    Action {
        context: String,
        #[source]
        source: ActionError,
    },

    #[error("{0}")]
    Invalid(String),
}

fn parse_error(context: impl fmt::Display) -> impl FnOnce(ParseError) -> ProgramError {
    move |source| ProgramError::Parse {
        context: context.to_string(),
        source,
    }
}

// =============================================================================
// FILE FORMAT
// =============================================================================

/// A program file as written on disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramFile {
    /// Name of the agent running the program.
    pub agent: String,
    /// Other agents this agent can address.
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub knowledge: Vec<String>,
    #[serde(default)]
    pub beliefs: Vec<String>,
    /// One conjunction per goal.
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// An `[[actions]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionEntry {
    pub name: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default = "default_pre")]
    pub pre: String,
    #[serde(default)]
    pub post: String,
    #[serde(default = "default_external")]
    pub external: bool,
}

fn default_pre() -> String {
    "true".to_string()
}

fn default_external() -> bool {
    true
}

/// A `[[rules]]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    #[serde(default = "default_pre")]
    pub condition: String,
    pub actions: Vec<String>,
}

impl ProgramFile {
    pub fn from_toml_str(text: &str) -> Result<Self, ProgramError> {
        Ok(toml::from_str(text)?)
    }
}

// =============================================================================
// COMPILED PROGRAM
// =============================================================================

/// A rule: when the condition holds, try the body.
#[derive(Debug, Clone)]
pub struct Rule {
    pub condition: Condition,
    pub body: ActionCombo,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if {} then {}.", self.condition, self.body)
    }
}

/// A program ready to run: initial mental state, specifications and rules.
#[derive(Debug, Clone)]
pub struct AgentProgram {
    pub state: MemoryState,
    pub specs: Vec<ActionSpec>,
    pub rules: Vec<Rule>,
}

impl AgentProgram {
    /// Load and compile a program file.
    pub fn load(path: &Path) -> Result<Self, ProgramError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(program = %path.display(), bytes = text.len(), "program read");
        let file = ProgramFile::from_toml_str(&text)?;
        Self::compile(&file, &path.display().to_string(), &text)
    }

    /// Compile a parsed program. `source` names the file and `text` is its
    /// contents, used to locate action specifications.
    pub fn compile(file: &ProgramFile, source: &str, text: &str) -> Result<Self, ProgramError> {
        if file.agent.trim().is_empty() {
            return Err(ProgramError::Invalid("agent name must not be empty".to_string()));
        }
        let mut state = MemoryState::new(file.agent.as_str())
            .with_agents(file.agents.iter().map(|a| AgentId::new(a.as_str())));

        for (entries, base) in [(&file.knowledge, "knowledge"), (&file.beliefs, "beliefs")] {
            for entry in entries {
                let update =
                    Update::parse(entry).map_err(parse_error(format!("{base} '{entry}'")))?;
                let added = if base == "knowledge" {
                    state.add_knowledge(&update)
                } else {
                    state.add_beliefs(&update)
                };
                added.map_err(|source| ProgramError::State {
                    context: format!("{base} '{entry}'"),
                    source,
                })?;
            }
        }

        let me = state.agent_id().clone();
        for entry in &file.goals {
            let goal = Update::parse(entry).map_err(parse_error(format!("goal '{entry}'")))?;
            state
                .adopt(&goal, false, &me)
                .map_err(|source| ProgramError::State {
                    context: format!("goal '{entry}'"),
                    source,
                })?;
        }

        let lines = section_lines(text, "[[actions]]");
        let mut specs = Vec::with_capacity(file.actions.len());
        for (index, entry) in file.actions.iter().enumerate() {
            let spec = compile_spec(entry)?;
            specs.push(match lines.get(index) {
                Some(&line) => spec.with_source(SourceInfo {
                    file: source.to_string(),
                    line,
                }),
                None => spec,
            });
        }

        let mut rules = Vec::with_capacity(file.rules.len());
        for entry in &file.rules {
            rules.push(compile_rule(entry, &specs)?);
        }

        Ok(Self {
            state,
            specs,
            rules,
        })
    }
}

/// 1-based line numbers of every line equal to `header`.
fn section_lines(text: &str, header: &str) -> Vec<usize> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.trim() == header)
        .map(|(i, _)| i + 1)
        .collect()
}

fn compile_spec(entry: &ActionEntry) -> Result<ActionSpec, ProgramError> {
    let context = format!("action '{}'", entry.name);
    let parameters = parse_terms(&entry.parameters).map_err(parse_error(&context))?;
    let pre = Query::parse(&entry.pre).map_err(parse_error(&context))?;
    let post = Update::parse(&entry.post).map_err(parse_error(&context))?;
    Ok(ActionSpec::new(entry.name.as_str(), parameters, pre, post).with_external(entry.external))
}

fn compile_rule(entry: &RuleEntry, specs: &[ActionSpec]) -> Result<Rule, ProgramError> {
    let condition = parse_condition(&entry.condition)
        .map_err(parse_error(format!("condition '{}'", entry.condition)))?;
    let mut actions = Vec::with_capacity(entry.actions.len());
    for text in &entry.actions {
        actions.push(parse_action(text, specs)?);
    }
    let body = ActionCombo::new(actions).map_err(|source| ProgramError::Action {
        context: format!("rule '{}'", entry.condition),
        source,
    })?;
    Ok(Rule { condition, body })
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// Read `bel(..)`, `goal(..)` and `not(..)` literals. Bare atoms are belief
/// queries and `true` is dropped.
pub fn parse_condition(text: &str) -> Result<Condition, ParseError> {
    let literals = parse_terms(text)?
        .into_iter()
        .filter_map(mental_literal)
        .collect();
    Ok(Condition::new(literals))
}

fn mental_literal(term: Term) -> Option<MentalLiteral> {
    let query = |args: Vec<Term>| Query::new(args.into_iter().map(Literal::from_term).collect());
    match term {
        Term::Compound { functor, args } if functor == TRUE_ATOM && args.is_empty() => None,
        Term::Compound { functor, args } if functor == NEGATION && args.len() == 1 => {
            args.into_iter().next().and_then(mental_literal).map(MentalLiteral::negated)
        }
        Term::Compound { functor, args } if functor == "bel" && !args.is_empty() => {
            Some(MentalLiteral::bel(query(args)))
        }
        Term::Compound { functor, args } if functor == "goal" && !args.is_empty() => {
            Some(MentalLiteral::goal(query(args)))
        }
        other => Some(MentalLiteral::bel(Query::new(vec![Literal::pos(other)]))),
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

fn invalid_action(text: &str, reason: &str) -> ProgramError {
    ProgramError::Invalid(format!("action '{text}': {reason}"))
}

fn action_error(text: &str) -> impl FnOnce(ActionError) -> ProgramError {
    move |source| ProgramError::Action {
        context: format!("action '{text}'"),
        source,
    }
}

fn conjunction(args: &[Term]) -> Update {
    Update::new(args.iter().cloned().map(Literal::from_term).collect())
}

fn mood_of(term: &Term) -> Option<Mood> {
    match term {
        Term::Str(symbol) => {
            let mut chars = symbol.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Mood::from_symbol(c),
                _ => None,
            }
        }
        _ => None,
    }
}

fn exit_kind(term: &Term) -> Option<ExitModuleKind> {
    term.functor()
        .filter(|_| term.args().is_empty())
        .and_then(ExitModuleKind::from_name)
}

/// Parse one action of a rule body.
pub fn parse_action(text: &str, specs: &[ActionSpec]) -> Result<Action, ProgramError> {
    let term = parse_term(text).map_err(parse_error(format!("action '{text}'")))?;
    let Some(name) = term.functor() else {
        return Err(invalid_action(text, "not an action"));
    };
    let args = term.args();

    let action = match (name, args) {
        ("adopt", [_, ..]) => Action::Adopt(
            AdoptAction::new(Selector::self_agent(), conjunction(args))
                .map_err(action_error(text))?,
        ),
        ("adoptone", [_, ..]) => Action::AdoptOne(
            AdoptOneAction::new(Selector::self_agent(), conjunction(args))
                .map_err(action_error(text))?,
        ),
        ("drop", [_, ..]) => Action::Drop(DropAction::new(conjunction(args))),
        ("insert", [_, ..]) => Action::Insert(InsertAction::new(conjunction(args))),
        ("delete", [_, ..]) => Action::Delete(DeleteAction::new(conjunction(args))),
        ("send" | "sendonce", [to, content]) => {
            send(name, Selector::from_term(to.clone()), Mood::Indicative, content)
        }
        ("send" | "sendonce", [to, mood, content]) => {
            let mood = mood_of(mood)
                .ok_or_else(|| invalid_action(text, "mood must be \":\", \"!\" or \"?\""))?;
            send(name, Selector::from_term(to.clone()), mood, content)
        }
        ("print", [argument]) => Action::Print(PrintAction::new(argument.clone())),
        ("log", [argument]) => Action::Log(LogAction::new(argument.clone())),
        ("exit_module", []) => Action::ExitModule(ExitModuleAction::new(ExitModuleKind::Module)),
        ("exit_module", [kind]) => {
            let kind = exit_kind(kind).ok_or_else(|| invalid_action(text, "unknown exit kind"))?;
            Action::ExitModule(ExitModuleAction::new(kind))
        }
        _ => {
            let mut call = UserSpecAction::new(name, args.to_vec());
            for spec in specs {
                call.add_specification(spec);
            }
            if call.specs().is_empty() {
                return Err(invalid_action(text, "no action specification matches"));
            }
            Action::UserSpec(call)
        }
    };
    Ok(action)
}

fn send(name: &str, selector: Selector, mood: Mood, content: &Term) -> Action {
    if name == "sendonce" {
        Action::SendOnce(SendOnceAction::new(selector, mood, content.clone()))
    } else {
        Action::Send(SendAction::new(selector, mood, content.clone()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCKS: &str = r#"
agent = "alice"
beliefs = ["on(a, b)", "on(b, table)", "clear(a)", "clear(table)"]
goals = ["on(a, table)"]

[[actions]]
name = "move"
parameters = "X, Y"
pre = "on(X, Z), clear(X), clear(Y)"
post = "on(X, Y), not(on(X, Z)), clear(Z)"
external = false

[[rules]]
condition = "goal(on(X, Y))"
actions = ["move(X, Y)"]
"#;

    #[test]
    fn compiles_blocks_program() {
        let file = ProgramFile::from_toml_str(BLOCKS).expect("toml");
        let program = AgentProgram::compile(&file, "blocks.toml", BLOCKS).expect("compile");

        assert_eq!(program.state.agent_id().as_str(), "alice");
        assert_eq!(program.state.goals().len(), 1);
        assert_eq!(program.specs.len(), 1);
        assert_eq!(
            program.specs[0].source().map(ToString::to_string),
            Some("blocks.toml:6".to_string())
        );
        assert_eq!(program.rules.len(), 1);
        assert_eq!(
            program.rules[0].to_string(),
            "if goal(on(X, Y)) then move(X, Y)."
        );
    }

    #[test]
    fn conditions_read_mental_literals() {
        let condition =
            parse_condition("goal(on(X, Y)), not(bel(on(X, Y))), clear(X), true").expect("parse");
        assert_eq!(
            condition.to_string(),
            "goal(on(X, Y)), not(bel(on(X, Y))), bel(clear(X))"
        );
    }

    #[test]
    fn builtin_actions_parse() {
        let cases = [
            ("adopt(on(a, b))", "adopt(on(a, b))"),
            ("insert(p, not(q))", "insert(p, not(q))"),
            ("send(bob, \"?\", on(X, b))", "bob.send(?on(X, b))"),
            ("sendonce(allother, hello)", "allother.sendonce(:hello)"),
            ("print(\"hi\")", "print(\"hi\")"),
            ("exit_module(all)", "exit-module(all)"),
        ];
        for (text, expected) in cases {
            let action = parse_action(text, &[]).expect(text);
            assert_eq!(action.to_string(), expected);
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(matches!(
            parse_action("fly(high)", &[]),
            Err(ProgramError::Invalid(_))
        ));
        assert!(matches!(
            parse_action("adoptone(p)", &[]),
            Err(ProgramError::Action {
                source: ActionError::Unsupported(_),
                ..
            })
        ));
        assert!(matches!(
            parse_action("send(bob, \"#\", p)", &[]),
            Err(ProgramError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = ProgramFile::from_toml_str("agent = \"a\"\nbogus = 1\n");
        assert!(matches!(result, Err(ProgramError::Toml(_))));
    }

    #[test]
    fn non_ground_belief_is_a_state_error() {
        let file = ProgramFile {
            agent: "a".to_string(),
            beliefs: vec!["on(X, b)".to_string()],
            ..ProgramFile::default()
        };
        assert!(matches!(
            AgentProgram::compile(&file, "inline", ""),
            Err(ProgramError::State { .. })
        ));
    }
}

//! # bdi-core
//!
//! The action core of a BDI (belief, goal) agent interpreter.
//!
//! Given an agent's mental state, this crate decides whether an action or a
//! rule body (action combo) is executable, picks one admissible
//! instantiation and applies its effects.
//!
//! ## What Lives Here
//!
//! - `action`: built-in actions (adopt, drop, insert, delete, send, sendonce,
//!   print, log, exit-module, module calls) and user-specified actions
//! - `combo`: the `+` composition of actions with short-circuiting
//! - `result`: the accumulator that drives short-circuiting
//! - `kr`, `query`, `condition`, `selector`: the term language the actions
//!   are written in
//! - `state`: the mental-state contract plus an in-memory implementation
//!
//! ## Architectural Constraints
//!
//! - Actions are values: applying a substitution yields a new action
//! - Single-threaded: one agent's cycle runs to completion, no locking
//! - Every random choice goes through an injected `ChoiceSource`
//! - Collaborators (mental state, environment, console, debugger, module
//!   executor) sit behind traits and are borrowed per cycle
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod action;
pub mod combo;
pub mod condition;
pub mod context;
pub mod debug;
pub mod env;
pub mod kr;
pub mod primitives;
pub mod query;
pub mod result;
pub mod selector;
pub mod state;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ActionError, AgentId, BaseKind, StateError};

// =============================================================================
// RE-EXPORTS: Actions
// =============================================================================

pub use action::{
    Action, ActionSpec, AdoptAction, AdoptOneAction, DeleteAction, DropAction, ExitModuleAction,
    ExitModuleKind, FocusMethod, InsertAction, LogAction, Message, ModuleCallAction, ModuleRef,
    Mood, PrintAction, SendAction, SendOnceAction, SourceInfo, SpecOptions, UserSpecAction,
};
pub use combo::ActionCombo;
pub use result::{ExecutionReport, ExecutionResult};

// =============================================================================
// RE-EXPORTS: Knowledge Representation
// =============================================================================

pub use condition::{Condition, MentalLiteral, MentalOperator};
pub use kr::{ParseError, Substitution, Term, Var, mgu, mgu_all, parse_term, parse_terms};
pub use query::{Literal, Query, Update};
pub use selector::{Selector, SelectorKind};

// =============================================================================
// RE-EXPORTS: Collaborators
// =============================================================================

pub use context::{
    ChoiceSource, DefaultCollaborators, ExecutionContext, RecordingCollaborators,
    ScriptedChoices, choose,
};
pub use debug::{Breakpoint, Channel, Debugger, RecordingDebugger, TracingDebugger};
pub use env::{
    BufferConsole, Console, Environment, ModuleExecutor, NoEnvironment, NoModules,
    RecordingEnvironment, StdConsole,
};
pub use state::{Goal, MemoryState, MentalState};

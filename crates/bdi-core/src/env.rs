//! # Environment, Console and Module Seams
//!
//! Outward-facing collaborators of the action core. All of them are
//! fire-and-forget from the core's point of view: a call either succeeds
//! immediately or fails with an error; nothing is retried.

use crate::action::{Message, ModuleCallAction, UserSpecAction};
use crate::result::ExecutionResult;
use crate::state::MentalState;
use crate::ActionError;

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Bridge to the agent's environment and to other agents.
pub trait Environment {
    /// Forward an external user-specified action.
    fn perform_action(&mut self, action: &UserSpecAction) -> Result<(), ActionError>;

    /// Hand a message to the transport for delivery.
    fn post_message(&mut self, message: &Message) -> Result<(), ActionError>;
}

/// Environment that accepts everything and only traces it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnvironment;

impl Environment for NoEnvironment {
    fn perform_action(&mut self, action: &UserSpecAction) -> Result<(), ActionError> {
        tracing::debug!(%action, "no environment attached, action not forwarded");
        Ok(())
    }

    fn post_message(&mut self, message: &Message) -> Result<(), ActionError> {
        tracing::debug!(%message, "no transport attached, message not delivered");
        Ok(())
    }
}

/// Environment that records what it was asked to do.
///
/// Built with [`RecordingEnvironment::rejecting`] it refuses every call
/// instead, recording nothing.
#[derive(Debug, Clone, Default)]
pub struct RecordingEnvironment {
    pub actions: Vec<UserSpecAction>,
    pub messages: Vec<Message>,
    rejection: Option<String>,
}

impl RecordingEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment that fails every call with `reason`.
    #[must_use]
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::default()
        }
    }

    fn check(&self, subject: &dyn std::fmt::Display) -> Result<(), ActionError> {
        match &self.rejection {
            Some(reason) => Err(ActionError::Environment {
                action: subject.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Environment for RecordingEnvironment {
    fn perform_action(&mut self, action: &UserSpecAction) -> Result<(), ActionError> {
        self.check(action)?;
        self.actions.push(action.clone());
        Ok(())
    }

    fn post_message(&mut self, message: &Message) -> Result<(), ActionError> {
        self.check(message)?;
        self.messages.push(message.clone());
        Ok(())
    }
}

// =============================================================================
// CONSOLE
// =============================================================================

/// Sink for `print` and `log` actions.
pub trait Console {
    fn print(&mut self, text: &str);
    fn log(&mut self, text: &str);
}

/// Prints to stdout and logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn print(&mut self, text: &str) {
        println!("{text}");
    }

    fn log(&mut self, text: &str) {
        tracing::info!(target: "bdi::log", "{}", text);
    }
}

/// Buffers output in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferConsole {
    pub printed: Vec<String>,
    pub logged: Vec<String>,
}

impl BufferConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for BufferConsole {
    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }

    fn log(&mut self, text: &str) {
        self.logged.push(text.to_string());
    }
}

// =============================================================================
// MODULES
// =============================================================================

/// Runs the module a module-call action targets.
///
/// The returned result reports what the module did; a module may be entered
/// without performing any action.
pub trait ModuleExecutor {
    fn enter(
        &mut self,
        call: &ModuleCallAction,
        state: &mut dyn MentalState,
    ) -> Result<ExecutionResult, ActionError>;
}

/// Module executor for agents without modules: every call is entered and
/// performs nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModules;

impl ModuleExecutor for NoModules {
    fn enter(
        &mut self,
        call: &ModuleCallAction,
        _state: &mut dyn MentalState,
    ) -> Result<ExecutionResult, ActionError> {
        tracing::debug!(%call, "no module executor attached");
        Ok(ExecutionResult::empty())
    }
}

//! # Debugger Hook
//!
//! Fire-and-forget observer invoked at fixed points of action evaluation.
//! Implementations must never influence execution.

use std::fmt;

/// Points at which the core reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// An action's precondition held.
    PreconditionHolds,
    /// An action's precondition did not hold.
    PreconditionFails,
    /// A built-in action was executed.
    BuiltinExecuted,
    /// A user-specified action was executed.
    UserSpecExecuted,
    /// An action combo ran to its stopping point.
    ComboFinished,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PreconditionHolds => "action_precondition_holds",
            Self::PreconditionFails => "action_precondition_fails",
            Self::BuiltinExecuted => "action_executed_builtin",
            Self::UserSpecExecuted => "action_executed_userspec",
            Self::ComboFinished => "action_combo_finished",
        };
        f.write_str(name)
    }
}

/// Observer of core events.
pub trait Debugger {
    /// Report an event. `subject` is the action (or combo) concerned.
    fn breakpoint(&mut self, channel: Channel, subject: &str, message: fmt::Arguments<'_>);
}

/// Default debugger: forwards every breakpoint as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDebugger;

impl Debugger for TracingDebugger {
    fn breakpoint(&mut self, channel: Channel, subject: &str, message: fmt::Arguments<'_>) {
        match channel {
            Channel::PreconditionFails => {
                tracing::trace!(target: "bdi::debugger", %channel, subject, "{}", message);
            }
            _ => tracing::debug!(target: "bdi::debugger", %channel, subject, "{}", message),
        }
    }
}

/// A recorded breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub channel: Channel,
    pub subject: String,
    pub message: String,
}

/// Debugger that keeps every breakpoint, for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct RecordingDebugger {
    events: Vec<Breakpoint>,
}

impl RecordingDebugger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[Breakpoint] {
        &self.events
    }

    /// Events reported on one channel, in order.
    pub fn on(&self, channel: Channel) -> impl Iterator<Item = &Breakpoint> {
        self.events.iter().filter(move |e| e.channel == channel)
    }
}

impl Debugger for RecordingDebugger {
    fn breakpoint(&mut self, channel: Channel, subject: &str, message: fmt::Arguments<'_>) {
        self.events.push(Breakpoint {
            channel,
            subject: subject.to_string(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_debugger_filters_by_channel() {
        let mut debugger = RecordingDebugger::new();
        debugger.breakpoint(Channel::BuiltinExecuted, "insert(p)", format_args!("performed {}", 1));
        debugger.breakpoint(Channel::ComboFinished, "insert(p)", format_args!("done"));

        assert_eq!(debugger.events().len(), 2);
        let executed: Vec<_> = debugger.on(Channel::BuiltinExecuted).collect();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].message, "performed 1");
    }

    #[test]
    fn channel_names_are_stable() {
        assert_eq!(Channel::UserSpecExecuted.to_string(), "action_executed_userspec");
    }
}

//! # Execution Context
//!
//! Per-cycle bundle of collaborators handed to every action evaluation, and
//! the injectable source of nondeterminism.

use crate::debug::{Debugger, RecordingDebugger, TracingDebugger};
use crate::env::{
    BufferConsole, Console, Environment, ModuleExecutor, NoEnvironment, NoModules,
    RecordingEnvironment, StdConsole,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;

// =============================================================================
// CHOICE SOURCE
// =============================================================================

/// Uniform choice among `len` alternatives.
///
/// Every random decision in the core goes through this trait so that tests
/// can supply deterministic sequences. Any `rand::Rng` is a choice source.
pub trait ChoiceSource {
    /// Index in `0..len`. Callers never pass `len == 0`.
    fn choose_index(&mut self, len: usize) -> usize;
}

impl<R: rand::Rng + ?Sized> ChoiceSource for R {
    fn choose_index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// Pick one element uniformly. `None` only for an empty slice.
pub fn choose<'t, T>(source: &mut dyn ChoiceSource, items: &'t [T]) -> Option<&'t T> {
    if items.is_empty() {
        return None;
    }
    let index = source.choose_index(items.len()).min(items.len() - 1);
    items.get(index)
}

/// Replays a fixed list of indices, then keeps answering 0.
///
/// Indices larger than the number of alternatives wrap around.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChoices {
    picks: VecDeque<usize>,
}

impl ScriptedChoices {
    #[must_use]
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

impl ChoiceSource for ScriptedChoices {
    fn choose_index(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len.max(1)
    }
}

// =============================================================================
// EXECUTION CONTEXT
// =============================================================================

/// Collaborators borrowed for one reasoning cycle.
pub struct ExecutionContext<'a> {
    pub debugger: &'a mut dyn Debugger,
    pub environment: &'a mut dyn Environment,
    pub console: &'a mut dyn Console,
    pub modules: &'a mut dyn ModuleExecutor,
    pub choices: &'a mut dyn ChoiceSource,
}

impl<'a> ExecutionContext<'a> {
    #[must_use]
    pub fn new(
        debugger: &'a mut dyn Debugger,
        environment: &'a mut dyn Environment,
        console: &'a mut dyn Console,
        modules: &'a mut dyn ModuleExecutor,
        choices: &'a mut dyn ChoiceSource,
    ) -> Self {
        Self {
            debugger,
            environment,
            console,
            modules,
            choices,
        }
    }
}

/// Owned default collaborators: tracing debugger, no environment, stdout
/// console, no modules and a seedable RNG.
#[derive(Debug)]
pub struct DefaultCollaborators {
    pub debugger: TracingDebugger,
    pub environment: NoEnvironment,
    pub console: StdConsole,
    pub modules: NoModules,
    pub rng: StdRng,
}

impl DefaultCollaborators {
    /// Collaborators with an RNG seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Collaborators with a reproducible RNG.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            debugger: TracingDebugger,
            environment: NoEnvironment,
            console: StdConsole,
            modules: NoModules,
            rng,
        }
    }

    /// Borrow the collaborators as an execution context.
    pub fn context(&mut self) -> ExecutionContext<'_> {
        ExecutionContext::new(
            &mut self.debugger,
            &mut self.environment,
            &mut self.console,
            &mut self.modules,
            &mut self.rng,
        )
    }
}

impl Default for DefaultCollaborators {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned collaborators that record everything and choose from a script.
#[derive(Debug, Default)]
pub struct RecordingCollaborators {
    pub debugger: RecordingDebugger,
    pub environment: RecordingEnvironment,
    pub console: BufferConsole,
    pub modules: NoModules,
    pub choices: ScriptedChoices,
}

impl RecordingCollaborators {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_choices(choices: ScriptedChoices) -> Self {
        Self {
            choices,
            ..Self::default()
        }
    }

    /// Borrow the collaborators as an execution context.
    pub fn context(&mut self) -> ExecutionContext<'_> {
        ExecutionContext::new(
            &mut self.debugger,
            &mut self.environment,
            &mut self.console,
            &mut self.modules,
            &mut self.choices,
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_choices_replay_then_default() {
        let mut choices = ScriptedChoices::new([2, 5]);
        assert_eq!(choices.choose_index(3), 2);
        assert_eq!(choices.choose_index(3), 2);
        assert_eq!(choices.choose_index(3), 0);
    }

    #[test]
    fn choose_handles_empty_and_bounds() {
        let mut choices = ScriptedChoices::new([1]);
        let empty: [u8; 0] = [];
        assert_eq!(choose(&mut choices, &empty), None);
        assert_eq!(choose(&mut choices, &['a', 'b']), Some(&'b'));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let xs: Vec<usize> = (0..16).map(|_| a.choose_index(10)).collect();
        let ys: Vec<usize> = (0..16).map(|_| b.choose_index(10)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| x < 10));
    }
}

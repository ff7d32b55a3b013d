//! Debounce state machine for re-index triggering.

use std::time::{Duration, Instant};

/// Default debounce window applied to re-index triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// State of the debounce machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// No re-index pending or running.
    Idle,

    /// A re-index is scheduled for `deadline`.
    Debouncing {
        /// When the pending re-index should start.
        deadline: Instant,
    },

    /// A re-index is running.
    Reindexing,
}

/// Collapses bursts of change events into at most one re-index per window.
///
/// The machine is driven by the caller's clock: the event transition takes
/// the current instant as an argument, which keeps it deterministic under
/// test. Transitions:
///
/// ```text
/// Idle --(relevant event)--> Debouncing --(deadline)--> Reindexing --> Idle
/// ```
///
/// Events arriving while the machine is in `Debouncing` or `Reindexing`
/// are dropped — not queued, not merged. The scheduled flush always fires,
/// so a continuous stream of changes cannot starve re-indexing.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    state: DebounceState,
}

impl Debouncer {
    /// Create a debouncer with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
        }
    }

    /// The configured debounce window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current state of the machine.
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// A relevant change arrived.
    ///
    /// Returns the deadline to arm when the event opens a new debounce
    /// window; `None` when the event is dropped.
    pub fn on_event(&mut self, now: Instant) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => {
                let deadline = now + self.window;
                self.state = DebounceState::Debouncing { deadline };
                Some(deadline)
            }
            DebounceState::Debouncing { .. } | DebounceState::Reindexing => None,
        }
    }

    /// The armed deadline fired.
    ///
    /// Returns `true` when a re-index should start now.
    pub fn on_deadline(&mut self) -> bool {
        match self.state {
            DebounceState::Debouncing { .. } => {
                self.state = DebounceState::Reindexing;
                true
            }
            DebounceState::Idle | DebounceState::Reindexing => false,
        }
    }

    /// The re-index finished, successfully or not.
    pub fn on_reindex_complete(&mut self) {
        self.state = DebounceState::Idle;
    }
}

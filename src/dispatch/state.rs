//! Dispatcher state machine and the events it emits.
//!
//! ```text
//! Idle ──submit──▶ Busy        (Started emitted)
//! Busy ──submit──▶ Busy        (rejected, nothing emitted)
//! Busy ──Completed observed──▶ Idle
//! ```

use crate::translate::TranslationResult;

// ---------------------------------------------------------------------------
// DispatcherState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatcherState {
    /// No task in flight; the next `submit` is accepted.
    #[default]
    Idle,

    /// A task was accepted and its `Completed` event has not been observed
    /// yet.
    Busy,
}

impl DispatcherState {
    /// ```
    /// use polar_translate::dispatch::DispatcherState;
    ///
    /// assert!(!DispatcherState::Idle.is_busy());
    /// assert!(DispatcherState::Busy.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, DispatcherState::Busy)
    }

    /// A short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            DispatcherState::Idle => "Ready",
            DispatcherState::Busy => "Working",
        }
    }
}

// ---------------------------------------------------------------------------
// TaskEvent
// ---------------------------------------------------------------------------

/// Notifications delivered to the dispatcher's consumer.
///
/// Every accepted task produces exactly `Started`, then one of `Result` or
/// `Error`, then `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// The task was accepted; `status` is its human-readable description.
    Started { status: String },

    /// The work finished and produced a well-formed result.
    Result(TranslationResult),

    /// The work failed, panicked or produced a malformed result.
    Error { message: String },

    /// The task is over and its cleanup has run.
    Completed,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Debouncing for cursor movement events.
//!
//! Rapid cursor travel (holding an arrow key, a multi-line paste) would
//! otherwise fire a provider request per movement. Only the last position
//! within a quiet window may trigger a refresh; recording a new position
//! supersedes the previous one rather than queueing behind it.
//!
//! Timestamps come from `tokio::time`, so tests drive the window with a
//! paused runtime clock instead of real sleeps.

use tokio::time::{Duration, Instant};

use crate::types::Position;
use crate::workspace::EditorHandle;

/// Debounces cursor positions into at most one pending refresh target.
///
/// Holds the most recent (editor, position) pair and the deadline at which
/// it becomes due. A newer record replaces the pair and pushes the
/// deadline out, which is what cancels the superseded refresh.
#[derive(Debug)]
pub struct RefreshDebouncer {
    pending: Option<PendingRefresh>,
    delay: Duration,
}

#[derive(Debug)]
struct PendingRefresh {
    editor: EditorHandle,
    position: Position,
    deadline: Instant,
}

impl RefreshDebouncer {
    /// Create a debouncer with the given quiet window.
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: None,
            delay,
        }
    }

    /// Record a cursor position, replacing any pending one.
    ///
    /// Resets the quiet window.
    pub fn record(&mut self, editor: EditorHandle, position: Position) {
        self.pending = Some(PendingRefresh {
            editor,
            position,
            deadline: Instant::now() + self.delay,
        });
    }

    /// The instant the pending refresh becomes due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Take the pending refresh target if its quiet window has elapsed.
    pub fn take_due(&mut self) -> Option<(EditorHandle, Position)> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| Instant::now() >= p.deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|p| (p.editor, p.position))
    }

    /// Drop the pending refresh without firing it (editor switch, panel
    /// deactivation).
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Check whether a refresh is waiting on its quiet window.
    #[allow(dead_code)]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

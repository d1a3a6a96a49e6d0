//! Leading/trailing debounce bookkeeping.
//!
//! Pure timing logic; the controller owns the actual timer.

use std::time::Duration;

use tokio::time::Instant;

/// What the caller should do with a debounced call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceAction {
    /// The window was quiet: fire right away.
    FireNow,
    /// Suppressed for now: fire at this deadline unless superseded.
    FireAt(Instant),
}

/// Coalesces bursts of calls into at most one call per quiet window.
///
/// The first call after a quiet window fires immediately. Calls arriving
/// within `wait` of the previous call are held back and each one pushes the
/// deadline out; only the last of them fires once `wait` has passed without
/// a further call.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    last_call: Option<Instant>,
    pending: bool,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last_call: None,
            pending: false,
        }
    }

    /// Register a call made at `now`.
    pub fn call(&mut self, now: Instant) -> DebounceAction {
        let quiet = !self.pending
            && self
                .last_call
                .map_or(true, |last| now.saturating_duration_since(last) >= self.wait);

        self.last_call = Some(now);

        if quiet {
            DebounceAction::FireNow
        } else {
            self.pending = true;
            DebounceAction::FireAt(now + self.wait)
        }
    }

    /// Timer callback. Returns true when the held-back call should fire now;
    /// false for a timer that a later call has superseded.
    pub fn deadline_reached(&mut self, now: Instant) -> bool {
        match self.last_call {
            Some(last) if self.pending && now.saturating_duration_since(last) >= self.wait => {
                self.pending = false;
                true
            }
            _ => false,
        }
    }
}

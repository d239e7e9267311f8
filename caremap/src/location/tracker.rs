//! Location tracker state machine.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::provider::PositionEvent;
use super::state::{LocationError, PositionFix, TrackerState};

/// Applies the acceptance policy to incoming position events and holds
/// the current best-known fix.
///
/// The tracker is a synchronous state machine driven by the controller's
/// event loop; it owns the single location slot (last-write-wins, no
/// backlog) and is its only writer.
pub struct LocationTracker {
    state: TrackerState,
    current: Option<PositionFix>,
    max_fix_age: Duration,
    max_accuracy_m: Option<f64>,
}

impl LocationTracker {
    /// Creates a tracker in `Acquiring`, rejecting fixes older than
    /// `max_fix_age` at acceptance time.
    pub fn new(max_fix_age: Duration) -> Self {
        Self {
            state: TrackerState::Acquiring,
            current: None,
            max_fix_age,
            max_accuracy_m: None,
        }
    }

    /// Additionally rejects fixes whose reported accuracy is worse than
    /// `meters`. Fixes without accuracy information are always accepted.
    pub fn with_accuracy_bound(mut self, meters: f64) -> Self {
        self.max_accuracy_m = Some(meters);
        self
    }

    /// Current tracker state.
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Current best-known fix, if any.
    pub fn current(&self) -> Option<PositionFix> {
        self.current
    }

    /// The error carried by a terminal state, if any.
    pub fn error(&self) -> Option<LocationError> {
        self.state.error()
    }

    /// Applies one provider event.
    ///
    /// Returns `true` when the visible state changed (a fix was accepted
    /// or the tracker transitioned), `false` when the event was rejected
    /// or redundant.
    pub fn apply(&mut self, event: PositionEvent) -> bool {
        match event {
            PositionEvent::Fix(fix) => self.accept_fix(fix),
            PositionEvent::Error(error) => self.fail(error),
        }
    }

    /// Resets the tracker for a new subscription.
    pub fn reset(&mut self) {
        info!(from = %self.state, "location tracker reset");
        self.state = TrackerState::Acquiring;
        self.current = None;
    }

    fn accept_fix(&mut self, fix: PositionFix) -> bool {
        if self.state.is_terminal() {
            debug!(state = %self.state, "fix rejected in terminal state");
            return false;
        }

        if fix.is_stale(self.max_fix_age) {
            debug!(age_ms = fix.age().as_millis() as u64, "stale fix rejected");
            return false;
        }

        if let (Some(bound), Some(accuracy)) = (self.max_accuracy_m, fix.accuracy_m) {
            if accuracy > bound {
                debug!(accuracy_m = accuracy, bound_m = bound, "inaccurate fix rejected");
                return false;
            }
        }

        if self.state == TrackerState::Acquiring {
            info!(position = %fix.coordinate, "first fix accepted, tracking");
        }

        // Last-write-wins: the newer fix always replaces the slot
        self.current = Some(fix);
        self.state = TrackerState::Tracking;
        true
    }

    fn fail(&mut self, error: LocationError) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        warn!(%error, "location provider failed");
        self.state = match error {
            LocationError::Unavailable => TrackerState::Unavailable,
            other => TrackerState::Error(other),
        };
        // No ranking is possible without a live location
        self.current = None;
        true
    }
}

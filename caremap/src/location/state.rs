//! Core types for location tracking.

use std::fmt;
use std::time::{Duration, Instant};

use crate::coord::Coordinate;

/// Errors from the position provider.
///
/// Surfaced as data in the published snapshot; never used for control
/// flow between components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// The platform has no location capability at all.
    Unavailable,
    /// The user denied location access.
    PermissionDenied,
    /// The provider timed out waiting for a fix.
    Timeout,
    /// The provider's event stream ended unexpectedly.
    ProviderGone,
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::Unavailable => write!(f, "no location capability available"),
            LocationError::PermissionDenied => write!(f, "location permission denied"),
            LocationError::Timeout => write!(f, "timed out waiting for a position fix"),
            LocationError::ProviderGone => write!(f, "position provider stopped unexpectedly"),
        }
    }
}

impl std::error::Error for LocationError {}

/// A single position fix as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Measured position.
    pub coordinate: Coordinate,

    /// Reported accuracy in meters, if the provider supplies one.
    /// Lower is better.
    pub accuracy_m: Option<f64>,

    /// When the fix was measured. Consumers judge freshness from this.
    pub measured: Instant,
}

impl PositionFix {
    /// Creates a fix measured now, with no accuracy information.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            accuracy_m: None,
            measured: Instant::now(),
        }
    }

    /// Sets the reported accuracy in meters.
    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy_m = Some(meters);
        self
    }

    /// Sets the measurement timestamp.
    pub fn measured_at(mut self, measured: Instant) -> Self {
        self.measured = measured;
        self
    }

    /// Age of this fix.
    pub fn age(&self) -> Duration {
        self.measured.elapsed()
    }

    /// True when the fix is older than the given bound.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}

/// Tracker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// The platform lacks a location capability; never transitions
    /// further.
    Unavailable,
    /// A request for the first fix is outstanding.
    Acquiring,
    /// At least one fix has been accepted; the slot holds the latest.
    Tracking,
    /// The provider failed; terminal until an explicit reset (new
    /// subscription).
    Error(LocationError),
}

impl TrackerState {
    /// True for states that accept no further fixes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackerState::Unavailable | TrackerState::Error(_))
    }

    /// The error carried by this state, if any.
    pub fn error(&self) -> Option<LocationError> {
        match self {
            TrackerState::Unavailable => Some(LocationError::Unavailable),
            TrackerState::Error(err) => Some(*err),
            _ => None,
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Unavailable => write!(f, "Unavailable"),
            TrackerState::Acquiring => write!(f, "Acquiring"),
            TrackerState::Tracking => write!(f, "Tracking"),
            TrackerState::Error(err) => write!(f, "Error({})", err),
        }
    }
}

//! Live location tracking.
//!
//! Consumes a continuous stream of position fixes from an external
//! provider, applies a freshness/accuracy acceptance policy, and exposes
//! the current best-known location as a single last-write-wins slot.
//!
//! # State Machine
//!
//! ```text
//! Unavailable                 (platform has no location capability)
//! Acquiring ──▶ Tracking      (first accepted fix)
//!     │             │
//!     └──▶ Error ◀──┘         (provider failure; terminal until reset)
//! ```
//!
//! # Acceptance Policy
//!
//! A raw fix is accepted when it is fresh enough (not older than the
//! configured maximum fix age) and, when an accuracy bound is configured,
//! at least that accurate. Among accepted fixes the later one always wins;
//! the tracker holds exactly one current value and never buffers a
//! backlog.
//!
//! # Components
//!
//! - [`PositionFix`] / [`PositionEvent`] - raw data pushed by the provider
//! - [`PositionProvider`] / [`PositionSubscription`] - subscription
//!   lifecycle with guaranteed single release
//! - [`LocationTracker`] - the acceptance state machine
//! - [`ChannelPositionProvider`] - manually fed provider for scripted
//!   scenarios and tests

mod provider;
mod state;
mod tracker;

pub use provider::{
    ChannelPositionProvider, PositionEvent, PositionProvider, PositionSubscription,
};
pub use state::{LocationError, PositionFix, TrackerState};
pub use tracker::LocationTracker;

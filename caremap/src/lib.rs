//! CareMap - nearest-facility geospatial search.
//!
//! Given a stream of live position fixes, a mutable search radius, and a
//! set of facility records (local or server-held), this library
//! continuously computes the subset of facilities within radius ordered
//! by distance, and - in nearest-mode - a driving route to the closest
//! one, while tolerating unreliable location updates, partial failures in
//! route computation, and concurrently changing inputs.
//!
//! # High-Level API
//!
//! The [`controller`] module provides the subsystem facade:
//!
//! ```ignore
//! use caremap::config::CoreConfig;
//! use caremap::controller::SearchBuilder;
//!
//! let handle = SearchBuilder::new(CoreConfig::default())
//!     .spawn(position_provider, facility_source, routing_provider);
//!
//! let mut snapshots = handle.subscribe();
//! handle.toggle_nearest_mode().await?;
//! snapshots.changed().await?;
//! ```

pub mod config;
pub mod controller;
pub mod coord;
pub mod facility;
pub mod location;
pub mod logging;
pub mod ranking;
pub mod route;

/// Version of the CareMap library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

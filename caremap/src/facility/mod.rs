//! Facility records and the facility store.
//!
//! A [`Facility`] is a location-bearing point of interest (a hospital, a
//! clinic) with a stable identifier, a display name, and a coordinate.
//! Records are immutable once loaded; a refresh replaces the whole set.
//!
//! # Components
//!
//! - [`Facility`] / [`FacilityId`] - the record shape consumed by ranking
//! - [`FacilityStore`] - atomically replaceable snapshot of the known set
//! - [`FacilitySource`] - external data source boundary (static or HTTP)
//!
//! # Single-Writer Discipline
//!
//! The store is written only when a refresh completes; readers always see
//! either the old set or the new set, never a partial mix. While a refresh
//! is in flight the previous snapshot keeps serving, and a failed refresh
//! leaves it untouched.

mod source;
mod store;

pub use source::{
    BoxFuture, FacilityError, FacilityQuery, FacilityRecord, FacilitySource, HttpFacilitySource,
    StaticFacilitySource,
};
pub use store::FacilityStore;

use std::fmt;

use crate::coord::Coordinate;

/// Unique facility identifier.
///
/// Ordered so that equidistant facilities rank deterministically
/// (ascending id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FacilityId(pub u64);

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A location-bearing facility record.
///
/// Immutable once loaded; a store refresh replaces the entire set rather
/// than mutating individual records.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    /// Stable identifier, used for ranking tie-breaks and route targeting.
    pub id: FacilityId,

    /// Display name.
    pub name: String,

    /// Geographic position.
    pub coordinate: Coordinate,
}

impl Facility {
    /// Creates a facility record.
    pub fn new(id: u64, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: FacilityId(id),
            name: name.into(),
            coordinate,
        }
    }
}

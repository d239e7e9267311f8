//! Published snapshot types.

use crate::coord::Coordinate;
use crate::facility::{FacilityError, FacilityId};
use crate::location::{LocationError, PositionFix, TrackerState};
use crate::ranking::RankedFacility;
use crate::route::{RouteError, RouteResult, RouteSeq};

/// Route portion of the published snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RouteState {
    /// Nearest-mode is off; no route is computed.
    #[default]
    Off,

    /// A route request is outstanding. Interim state; the snapshot may be
    /// published with this while the provider call is in flight.
    Pending {
        seq: RouteSeq,
        destination_id: FacilityId,
        origin: Coordinate,
    },

    /// The latest issued request resolved successfully.
    Ready(RouteResult),

    /// Nearest-mode is active but no facility is in range. Not an error.
    NoCandidate,

    /// The latest request failed; nearest-mode was forced off so the UI
    /// does not appear stuck requesting indefinitely.
    Failed(RouteError),
}

impl RouteState {
    /// The facility currently targeted, shown or pending.
    pub fn destination_id(&self) -> Option<FacilityId> {
        match self {
            RouteState::Pending { destination_id, .. } => Some(*destination_id),
            RouteState::Ready(result) => Some(result.destination_id),
            _ => None,
        }
    }

    /// True while a request is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self, RouteState::Pending { .. })
    }

    /// The resolved route, if one is currently shown.
    pub fn route(&self) -> Option<&RouteResult> {
        match self {
            RouteState::Ready(result) => Some(result),
            _ => None,
        }
    }
}

/// The externally visible aggregate of current derived state.
///
/// Immutably replaced as a whole on every completed (or interim) cycle;
/// the controller is its sole writer, so consumers never observe torn
/// reads. When a route is shown, its destination is guaranteed to be
/// present in `ranked`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Current best-known location, if tracking.
    pub location: Option<PositionFix>,

    /// Location tracker lifecycle state.
    pub tracker_state: TrackerState,

    /// Active search radius in kilometers.
    pub radius_km: f64,

    /// Whether nearest-mode is active.
    pub nearest_mode: bool,

    /// Facilities within radius, nearest first.
    pub ranked: Vec<RankedFacility>,

    /// Route to the nearest in-range facility.
    pub route: RouteState,

    /// Error from the most recent facility refresh, surfaced alongside
    /// the (still valid) previous set.
    pub facility_error: Option<FacilityError>,

    /// Error from the location provider, if the tracker is in a terminal
    /// state.
    pub location_error: Option<LocationError>,
}

impl Snapshot {
    /// The snapshot published before any input has arrived.
    pub fn initial(radius_km: f64) -> Self {
        Self {
            location: None,
            tracker_state: TrackerState::Acquiring,
            radius_km,
            nearest_mode: false,
            ranked: Vec::new(),
            route: RouteState::Off,
            facility_error: None,
            location_error: None,
        }
    }
}

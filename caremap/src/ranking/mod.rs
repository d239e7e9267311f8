//! Radius filter and distance ranking.
//!
//! [`rank`] is the dominant recompute path of the search core: on every
//! relevant input change it produces the subset of facilities within the
//! active radius, ordered nearest-first. It is a pure function with no I/O
//! and no mutation of its inputs, so the controller can call it
//! synchronously inside its event loop.
//!
//! # Ordering Contract
//!
//! Results are sorted ascending by distance; equidistant facilities break
//! ties by facility id ascending. The ordering is fully deterministic for
//! identical inputs, which keeps tests reproducible and gives consumers
//! stable keys. The head of the result is always the globally closest
//! in-range facility, so the route resolver never needs a separate
//! minimum search.

use crate::coord::{distance_km, Coordinate};
use crate::facility::Facility;

/// A facility annotated with its distance from the search origin.
///
/// Derived data: recomputed on every relevant input change, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFacility {
    pub facility: Facility,
    pub distance_km: f64,
}

/// Ranks facilities within `radius_km` of `location`, nearest first.
///
/// Contains exactly the facilities with `distance_km <= radius_km`. A
/// radius of zero (or below) yields an empty result. O(n log n) in the
/// facility count; the sort dominates.
pub fn rank(location: Coordinate, radius_km: f64, facilities: &[Facility]) -> Vec<RankedFacility> {
    if radius_km <= 0.0 {
        return Vec::new();
    }

    let mut ranked: Vec<RankedFacility> = facilities
        .iter()
        .map(|facility| RankedFacility {
            facility: facility.clone(),
            distance_km: distance_km(location, facility.coordinate),
        })
        .filter(|ranked| ranked.distance_km <= radius_km)
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.facility.id.cmp(&b.facility.id))
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::FacilityId;

    fn facility(id: u64, lat: f64, lon: f64) -> Facility {
        Facility::new(id, format!("Facility {}", id), Coordinate::new(lat, lon).unwrap())
    }

    fn origin() -> Coordinate {
        Coordinate::new(0.0, 0.0).unwrap()
    }

    #[test]
    fn test_zero_radius_yields_empty() {
        let facilities = vec![facility(1, 0.0, 0.0)];
        // Even a facility at the exact origin is excluded at radius zero
        assert!(rank(origin(), 0.0, &facilities).is_empty());
    }

    #[test]
    fn test_negative_radius_yields_empty() {
        let facilities = vec![facility(1, 0.0, 0.0)];
        assert!(rank(origin(), -5.0, &facilities).is_empty());
    }

    #[test]
    fn test_sorted_ascending_by_distance() {
        // One degree of longitude at the equator is ~111 km
        let facilities = vec![
            facility(1, 0.0, 2.0),
            facility(2, 0.0, 0.5),
            facility(3, 0.0, 1.0),
        ];

        let ranked = rank(origin(), 500.0, &facilities);

        let ids: Vec<u64> = ranked.iter().map(|r| r.facility.id.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_out_of_range_facilities_excluded() {
        let facilities = vec![
            facility(1, 0.0, 0.1), // ~11 km
            facility(2, 0.0, 5.0), // ~556 km
        ];

        let ranked = rank(origin(), 50.0, &facilities);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].facility.id, FacilityId(1));
    }

    #[test]
    fn test_ties_break_by_id_ascending() {
        // Same coordinate means identical distance; order must be by id
        let facilities = vec![
            facility(9, 0.0, 1.0),
            facility(3, 0.0, 1.0),
            facility(7, 0.0, 1.0),
        ];

        let ranked = rank(origin(), 500.0, &facilities);

        let ids: Vec<u64> = ranked.iter().map(|r| r.facility.id.0).collect();
        assert_eq!(ids, vec![3, 7, 9]);
    }

    #[test]
    fn test_tie_determinism_across_calls() {
        let facilities = vec![facility(2, 0.0, 1.0), facility(1, 0.0, 1.0)];

        let first = rank(origin(), 500.0, &facilities);
        for _ in 0..10 {
            let again = rank(origin(), 500.0, &facilities);
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_nearest_head_among_tied_candidates() {
        // F1 and F2 equidistant at ~2 km, F3 further out; head must be the
        // lowest id among the tie
        let facilities = vec![
            facility(2, 0.018, 0.0),
            facility(1, 0.018, 0.0),
            facility(3, 0.045, 0.0),
        ];

        let ranked = rank(origin(), 10.0, &facilities);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].facility.id, FacilityId(1));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let facilities = vec![facility(1, 0.0, 1.0), facility(2, 0.0, 0.5)];
        let before = facilities.clone();

        let _ = rank(origin(), 500.0, &facilities);

        assert_eq!(facilities, before);
    }

    #[test]
    fn test_empty_facility_set() {
        assert!(rank(origin(), 100.0, &[]).is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_facilities() -> impl Strategy<Value = Vec<Facility>> {
            prop::collection::vec((0u64..100, -60.0..60.0_f64, -60.0..60.0_f64), 0..40).prop_map(
                |entries| {
                    entries
                        .into_iter()
                        .map(|(id, lat, lon)| facility(id, lat, lon))
                        .collect()
                },
            )
        }

        proptest! {
            #[test]
            fn test_zero_radius_always_empty(facilities in arb_facilities()) {
                prop_assert!(rank(origin(), 0.0, &facilities).is_empty());
            }

            #[test]
            fn test_all_results_within_radius(
                facilities in arb_facilities(),
                radius in 0.1..5000.0_f64
            ) {
                let ranked = rank(origin(), radius, &facilities);
                for r in &ranked {
                    prop_assert!(
                        r.distance_km <= radius,
                        "distance {} exceeds radius {}",
                        r.distance_km, radius
                    );
                }
            }

            #[test]
            fn test_no_in_range_facility_omitted(
                facilities in arb_facilities(),
                radius in 0.1..5000.0_f64
            ) {
                let ranked = rank(origin(), radius, &facilities);
                let in_range = facilities
                    .iter()
                    .filter(|f| distance_km(origin(), f.coordinate) <= radius)
                    .count();
                prop_assert_eq!(ranked.len(), in_range);
            }

            #[test]
            fn test_result_is_sorted(
                facilities in arb_facilities(),
                radius in 0.1..5000.0_f64
            ) {
                let ranked = rank(origin(), radius, &facilities);
                for pair in ranked.windows(2) {
                    prop_assert!(pair[0].distance_km <= pair[1].distance_km);
                    if pair[0].distance_km == pair[1].distance_km {
                        prop_assert!(pair[0].facility.id <= pair[1].facility.id);
                    }
                }
            }
        }
    }
}

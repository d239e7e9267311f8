//! Sequenced route request issuance.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::provider::{RouteError, RoutePlan, RouteRequest, RoutingProvider, TravelMode};
use crate::coord::Coordinate;
use crate::facility::FacilityId;
use crate::ranking::RankedFacility;

/// Monotonic sequence number identifying route request issue order.
pub type RouteSeq = u64;

/// A successfully resolved route to a facility.
///
/// Superseded (discarded, never mutated) whenever a newer request is
/// issued for a different origin or destination; cleared when
/// nearest-mode is toggled off or no facility is in range.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Origin the route was computed from.
    pub origin: Coordinate,
    /// Facility the route leads to.
    pub destination_id: FacilityId,
    /// The computed route.
    pub plan: RoutePlan,
    /// Sequence number of the request that produced this result.
    pub seq: RouteSeq,
}

/// Completion of an issued route request, stale or not.
///
/// The controller compares `seq` against the latest issued sequence and
/// discards anything older.
#[derive(Debug)]
pub struct RouteCompletion {
    pub seq: RouteSeq,
    pub origin: Coordinate,
    pub destination_id: FacilityId,
    pub result: Result<RoutePlan, RouteError>,
}

/// Issues sequenced route requests toward the nearest ranked facility.
///
/// Each request runs on its own task with a timeout and reports back over
/// the completion channel handed out at construction. Issuance happens
/// only from the controller task, so the sequence counter needs no
/// atomics.
pub struct NearestRouteResolver {
    provider: Arc<dyn RoutingProvider>,
    timeout: Duration,
    next_seq: RouteSeq,
    completions: mpsc::Sender<RouteCompletion>,
}

impl NearestRouteResolver {
    /// Creates a resolver and the completion channel the controller
    /// drains.
    pub fn new(
        provider: Arc<dyn RoutingProvider>,
        timeout: Duration,
        completion_capacity: usize,
    ) -> (Self, mpsc::Receiver<RouteCompletion>) {
        let (tx, rx) = mpsc::channel(completion_capacity);
        (
            Self {
                provider,
                timeout,
                next_seq: 0,
                completions: tx,
            },
            rx,
        )
    }

    /// Requests a route from `origin` to the head of the ranked set.
    ///
    /// The head is already the globally closest in-range facility by the
    /// ranking contract, so no separate minimum search happens here.
    /// Returns the issued sequence number and destination, or `None` when
    /// the ranked set is empty (no candidate - not an error).
    pub fn request_nearest(
        &mut self,
        origin: Coordinate,
        ranked: &[RankedFacility],
    ) -> Option<(RouteSeq, FacilityId)> {
        let head = ranked.first()?;
        let seq = self.issue(origin, head.facility.coordinate, head.facility.id);
        Some((seq, head.facility.id))
    }

    /// Latest issued sequence number.
    pub fn last_issued(&self) -> RouteSeq {
        self.next_seq
    }

    fn issue(&mut self, origin: Coordinate, destination: Coordinate, id: FacilityId) -> RouteSeq {
        self.next_seq += 1;
        let seq = self.next_seq;

        debug!(%seq, destination = %id, provider = self.provider.name(), "route request issued");

        let provider = Arc::clone(&self.provider);
        let completions = self.completions.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let request = RouteRequest {
                origin,
                destination,
                mode: TravelMode::Driving,
            };

            let result = match tokio::time::timeout(timeout, provider.route(request)).await {
                Ok(result) => result,
                Err(_) => Err(RouteError::Timeout),
            };

            // A closed receiver means the subsystem is tearing down; the
            // completion effect is intentionally dropped.
            let _ = completions
                .send(RouteCompletion {
                    seq,
                    origin,
                    destination_id: id,
                    result,
                })
                .await;
        });

        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::Facility;
    use crate::route::provider::BoxFuture;

    struct FixedRoutingProvider {
        result: Result<RoutePlan, RouteError>,
    }

    impl RoutingProvider for FixedRoutingProvider {
        fn route(&self, _request: RouteRequest) -> BoxFuture<'_, Result<RoutePlan, RouteError>> {
            let result = self.result.clone();
            Box::pin(async move { result })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn ranked(id: u64, lat: f64, lon: f64, distance_km: f64) -> RankedFacility {
        RankedFacility {
            facility: Facility::new(id, format!("Facility {}", id), coord(lat, lon)),
            distance_km,
        }
    }

    fn plan() -> RoutePlan {
        RoutePlan {
            distance_km: 3.2,
            duration_s: 240.0,
            geometry: vec![coord(0.0, 0.0), coord(0.02, 0.0)],
        }
    }

    fn resolver(
        result: Result<RoutePlan, RouteError>,
    ) -> (NearestRouteResolver, mpsc::Receiver<RouteCompletion>) {
        NearestRouteResolver::new(
            Arc::new(FixedRoutingProvider { result }),
            Duration::from_secs(5),
            8,
        )
    }

    #[tokio::test]
    async fn test_empty_ranked_set_is_no_candidate() {
        let (mut resolver, _rx) = resolver(Ok(plan()));
        assert_eq!(resolver.request_nearest(coord(0.0, 0.0), &[]), None);
        assert_eq!(resolver.last_issued(), 0);
    }

    #[tokio::test]
    async fn test_targets_ranked_head() {
        let (mut resolver, mut rx) = resolver(Ok(plan()));
        let candidates = vec![
            ranked(1, 0.02, 0.0, 2.2),
            ranked(2, 0.05, 0.0, 5.6),
        ];

        let issued = resolver.request_nearest(coord(0.0, 0.0), &candidates);
        assert_eq!(issued, Some((1, FacilityId(1))));

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.seq, 1);
        assert_eq!(completion.destination_id, FacilityId(1));
        assert!(completion.result.is_ok());
    }

    #[tokio::test]
    async fn test_sequence_numbers_increase_monotonically() {
        let (mut resolver, mut rx) = resolver(Ok(plan()));
        let candidates = vec![ranked(1, 0.02, 0.0, 2.2)];

        let first = resolver.request_nearest(coord(0.0, 0.0), &candidates).unwrap();
        let second = resolver.request_nearest(coord(0.1, 0.0), &candidates).unwrap();

        assert!(second.0 > first.0);
        assert_eq!(resolver.last_issued(), second.0);

        // Both completions arrive; staleness is decided by the consumer
        let a = rx.recv().await.unwrap();
        let b = rx.recv().await.unwrap();
        let mut seqs = vec![a.seq, b.seq];
        seqs.sort_unstable();
        assert_eq!(seqs, vec![first.0, second.0]);
    }

    #[tokio::test]
    async fn test_provider_error_reported_in_completion() {
        let (mut resolver, mut rx) = resolver(Err(RouteError::NoRouteFound));
        let candidates = vec![ranked(1, 0.02, 0.0, 2.2)];

        resolver.request_nearest(coord(0.0, 0.0), &candidates);

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.result, Err(RouteError::NoRouteFound));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        struct SlowProvider;

        impl RoutingProvider for SlowProvider {
            fn route(&self, _request: RouteRequest) -> BoxFuture<'_, Result<RoutePlan, RouteError>> {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(RouteError::NoRouteFound)
                })
            }

            fn name(&self) -> &str {
                "slow"
            }
        }

        let (mut resolver, mut rx) =
            NearestRouteResolver::new(Arc::new(SlowProvider), Duration::from_millis(20), 8);

        resolver.request_nearest(coord(0.0, 0.0), &[ranked(1, 0.02, 0.0, 2.2)]);

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.result, Err(RouteError::Timeout));
    }
}

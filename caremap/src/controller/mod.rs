//! Reactive controller for the nearest-facility search.
//!
//! Wires the location tracker, facility store, ranker, and route resolver
//! together: on any relevant input change (location fix, radius, facility
//! set, mode toggle) it recomputes downstream state in a fixed order and
//! publishes one consistent [`Snapshot`] per cycle.
//!
//! # Recompute Order
//!
//! 1. Location tracker update
//! 2. Facility store read
//! 3. Radius filter & rank (synchronous, non-suspending)
//! 4. Nearest-route request, when nearest-mode is active
//!
//! Ranking always uses the location and facility set as of the cycle's
//! trigger. Route requests are ordered by issuance sequence number; stale
//! completions are discarded by sequence comparison, never by arrival
//! order.
//!
//! # Ownership
//!
//! The controller runs as a single task and is the sole writer of the
//! snapshot, the facility store, and the nearest-mode flag. Consumers
//! read snapshots through a `watch` channel and drive the controller only
//! through the [`SearchHandle`] control surface.
//!
//! # Example
//!
//! ```ignore
//! use caremap::config::CoreConfig;
//! use caremap::controller::SearchBuilder;
//!
//! let handle = SearchBuilder::new(CoreConfig::default())
//!     .spawn(position_provider, facility_source, routing_provider);
//!
//! let mut snapshots = handle.subscribe();
//! handle.set_radius(25.0).await?;
//! handle.toggle_nearest_mode().await?;
//!
//! snapshots.changed().await?;
//! println!("{} facilities in range", snapshots.borrow().ranked.len());
//!
//! handle.shutdown().await;
//! ```

mod snapshot;

pub use snapshot::{RouteState, Snapshot};

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CoreConfig;
use crate::facility::{Facility, FacilityError, FacilityQuery, FacilitySource, FacilityStore};
use crate::location::{
    LocationError, LocationTracker, PositionEvent, PositionProvider, PositionSubscription,
};
use crate::ranking::{rank, RankedFacility};
use crate::route::{NearestRouteResolver, RouteCompletion, RouteResult, RoutingProvider};

/// Errors from the control surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// A control input was rejected before reaching the controller.
    InvalidInput(String),
    /// The controller has shut down.
    Closed,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            ControlError::Closed => write!(f, "search controller has shut down"),
        }
    }
}

impl std::error::Error for ControlError {}

/// Control commands accepted by the controller loop.
enum Command {
    SetRadius(f64),
    ToggleNearestMode,
    RefreshFacilities,
}

/// Control surface and snapshot access for a running controller.
pub struct SearchHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SearchHandle {
    /// Returns a receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Returns the most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Sets the search radius in kilometers.
    ///
    /// Rejects negative or non-finite values with
    /// [`ControlError::InvalidInput`]. A radius of zero empties the
    /// ranked set and, if nearest-mode is active, clears the route and
    /// forces the mode off.
    pub async fn set_radius(&self, radius_km: f64) -> Result<(), ControlError> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(ControlError::InvalidInput(format!(
                "radius {} must be a non-negative number of kilometers",
                radius_km
            )));
        }
        self.send(Command::SetRadius(radius_km)).await
    }

    /// Toggles nearest-mode on or off.
    ///
    /// Toggling off cancels interest in any outstanding route request;
    /// its completion is discarded on arrival.
    pub async fn toggle_nearest_mode(&self) -> Result<(), ControlError> {
        self.send(Command::ToggleNearestMode).await
    }

    /// Triggers a facility refresh against the configured source.
    ///
    /// Skipped (with a debug log) while no location is known, while a
    /// refresh is already in flight, or at zero radius.
    pub async fn refresh_facilities(&self) -> Result<(), ControlError> {
        self.send(Command::RefreshFacilities).await
    }

    /// Stops the controller: releases the position subscription and drops
    /// outstanding route and refresh continuations without running their
    /// completion effects.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }

    async fn send(&self, command: Command) -> Result<(), ControlError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ControlError::Closed)
    }
}

/// Builder for a running [`SearchHandle`].
pub struct SearchBuilder {
    config: CoreConfig,
    initial_facilities: Vec<Facility>,
}

impl SearchBuilder {
    /// Starts a builder with the given configuration.
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            initial_facilities: Vec::new(),
        }
    }

    /// Pre-populates the facility store, for static built-in lists that
    /// are never refreshed.
    pub fn initial_facilities(mut self, facilities: Vec<Facility>) -> Self {
        self.initial_facilities = facilities;
        self
    }

    /// Spawns the controller event loop and returns its handle.
    pub fn spawn(
        self,
        position_provider: Arc<dyn PositionProvider>,
        facility_source: Arc<dyn FacilitySource>,
        routing_provider: Arc<dyn RoutingProvider>,
    ) -> SearchHandle {
        let config = self.config;
        let cancel = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(config.command_capacity);
        let (snapshot_tx, snapshot_rx) =
            watch::channel(Snapshot::initial(config.default_radius_km));
        let (resolver, completions) = NearestRouteResolver::new(
            routing_provider,
            config.route_timeout,
            config.completion_capacity,
        );
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        let mut tracker = LocationTracker::new(config.max_fix_age);
        if let Some(bound) = config.max_accuracy_m {
            tracker = tracker.with_accuracy_bound(bound);
        }

        // Subscribe before spawning so fixes pushed right after this call
        // are buffered rather than dropped.
        let subscription = match position_provider.subscribe() {
            Ok(subscription) => Some(subscription),
            Err(error) => {
                warn!(%error, "position provider subscription failed");
                tracker.apply(PositionEvent::Error(error));
                None
            }
        };

        let controller = SearchController {
            tracker,
            store: FacilityStore::with_facilities(self.initial_facilities),
            radius_km: config.default_radius_km,
            nearest_mode: false,
            ranked: Vec::new(),
            route: RouteState::Off,
            facility_error: None,
            refresh_in_flight: false,
            resolver,
            facility_source,
            refresh_tx,
            snapshots: snapshot_tx,
        };

        let task = tokio::spawn(controller.run(
            subscription,
            command_rx,
            completions,
            refresh_rx,
            cancel.clone(),
        ));

        SearchHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel,
            task,
        }
    }
}

/// The controller event loop state. Owned by a single task.
struct SearchController {
    tracker: LocationTracker,
    store: FacilityStore,
    radius_km: f64,
    nearest_mode: bool,
    ranked: Vec<RankedFacility>,
    route: RouteState,
    facility_error: Option<FacilityError>,
    refresh_in_flight: bool,
    resolver: NearestRouteResolver,
    facility_source: Arc<dyn FacilitySource>,
    refresh_tx: mpsc::Sender<Result<Vec<Facility>, FacilityError>>,
    snapshots: watch::Sender<Snapshot>,
}

impl SearchController {
    async fn run(
        mut self,
        mut subscription: Option<PositionSubscription>,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::Receiver<RouteCompletion>,
        mut refreshes: mpsc::Receiver<Result<Vec<Facility>, FacilityError>>,
        cancel: CancellationToken,
    ) {
        info!(radius_km = self.radius_km, "search controller started");
        self.publish();

        loop {
            let position_event = async {
                match subscription.as_mut() {
                    Some(subscription) => subscription.recv().await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                event = position_event => match event {
                    Some(event) => self.handle_position_event(event),
                    None => {
                        // The provider dropped its sender without a
                        // proper error event.
                        self.handle_position_event(PositionEvent::Error(
                            LocationError::ProviderGone,
                        ));
                        subscription = None;
                    }
                },
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    // All handles dropped: nothing can drive us anymore.
                    None => break,
                },
                completion = completions.recv() => {
                    if let Some(completion) = completion {
                        self.handle_completion(completion);
                    }
                },
                refresh = refreshes.recv() => {
                    if let Some(refresh) = refresh {
                        self.handle_refresh(refresh);
                    }
                },
            }
        }

        // Scoped teardown: dropping the subscription unsubscribes exactly
        // once; outstanding route and refresh sends hit a closed receiver
        // and their completion effects never run.
        drop(subscription);
        info!("search controller stopped");
    }

    fn handle_position_event(&mut self, event: PositionEvent) {
        let had_location = self.tracker.current().is_some();
        if !self.tracker.apply(event) {
            return;
        }

        // The first accepted fix triggers an initial facility refresh,
        // mirroring fetch-on-location-known behavior.
        if !had_location && self.tracker.current().is_some() {
            self.start_refresh();
        }
        self.recompute();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SetRadius(radius_km) => {
                if radius_km == self.radius_km {
                    return;
                }
                info!(radius_km, "search radius changed");
                self.radius_km = radius_km;
                // Re-query the source so a server-side filter sees the
                // new radius; no-op without a location or at zero radius.
                self.start_refresh();
                self.recompute();
            }
            Command::ToggleNearestMode => {
                self.nearest_mode = !self.nearest_mode;
                info!(nearest_mode = self.nearest_mode, "nearest mode toggled");
                if !self.nearest_mode {
                    self.route = RouteState::Off;
                }
                self.recompute();
            }
            Command::RefreshFacilities => self.start_refresh(),
        }
    }

    /// Runs one reactive cycle in the fixed order: location, store read,
    /// rank, route.
    fn recompute(&mut self) {
        self.ranked = match self.tracker.current() {
            Some(fix) => rank(fix.coordinate, self.radius_km, &self.store.current()),
            None => Vec::new(),
        };

        if self.nearest_mode && self.radius_km <= 0.0 {
            // A zero radius while nearest-mode is active clears the route
            // and forces the mode off so the UI never appears stuck.
            info!("zero radius forced nearest mode off");
            self.nearest_mode = false;
            self.route = RouteState::Off;
        } else if self.nearest_mode {
            self.update_route();
        } else if !matches!(self.route, RouteState::Off | RouteState::Failed(_)) {
            self.route = RouteState::Off;
        }

        self.publish();
    }

    fn update_route(&mut self) {
        let Some(fix) = self.tracker.current() else {
            self.route = RouteState::NoCandidate;
            return;
        };

        let Some(head) = self.ranked.first() else {
            // No facility in range: any shown route is cleared.
            self.route = RouteState::NoCandidate;
            return;
        };

        // One outstanding request per (origin, destination): skip the
        // reissue when the shown or pending route already matches.
        let up_to_date = match &self.route {
            RouteState::Ready(result) => {
                result.destination_id == head.facility.id && result.origin == fix.coordinate
            }
            RouteState::Pending {
                destination_id,
                origin,
                ..
            } => *destination_id == head.facility.id && *origin == fix.coordinate,
            _ => false,
        };
        if up_to_date {
            return;
        }

        match self.resolver.request_nearest(fix.coordinate, &self.ranked) {
            Some((seq, destination_id)) => {
                self.route = RouteState::Pending {
                    seq,
                    destination_id,
                    origin: fix.coordinate,
                };
            }
            None => self.route = RouteState::NoCandidate,
        }
    }

    fn handle_completion(&mut self, completion: RouteCompletion) {
        // Last-issued-wins: anything but the currently pending sequence
        // is stale and discarded unconditionally, result or error.
        let pending_seq = match &self.route {
            RouteState::Pending { seq, .. } => *seq,
            _ => {
                debug!(seq = completion.seq, "route completion ignored (no pending request)");
                return;
            }
        };
        if completion.seq != pending_seq {
            debug!(
                seq = completion.seq,
                pending = pending_seq,
                "stale route completion discarded"
            );
            return;
        }

        match completion.result {
            Ok(plan) => {
                // The shown route must target a facility currently in the
                // ranked set; clear instead of publishing an inconsistent
                // pair.
                let still_in_range = self
                    .ranked
                    .iter()
                    .any(|r| r.facility.id == completion.destination_id);
                if still_in_range {
                    debug!(
                        seq = completion.seq,
                        destination = %completion.destination_id,
                        "route resolved"
                    );
                    self.route = RouteState::Ready(RouteResult {
                        origin: completion.origin,
                        destination_id: completion.destination_id,
                        plan,
                        seq: completion.seq,
                    });
                } else {
                    debug!(
                        destination = %completion.destination_id,
                        "resolved route no longer in range, cleared"
                    );
                    self.route = RouteState::NoCandidate;
                }
            }
            Err(error) => {
                warn!(%error, "route request failed, nearest mode forced off");
                self.route = RouteState::Failed(error);
                self.nearest_mode = false;
            }
        }
        self.publish();
    }

    fn handle_refresh(&mut self, result: Result<Vec<Facility>, FacilityError>) {
        self.refresh_in_flight = false;
        match result {
            Ok(facilities) => {
                info!(count = facilities.len(), "facility set refreshed");
                self.store.replace(facilities);
                self.facility_error = None;
                self.recompute();
            }
            Err(error) => {
                // The prior facility set and ranking stay intact; the
                // error is surfaced alongside the stale data.
                warn!(%error, "facility refresh failed, keeping previous set");
                self.facility_error = Some(error);
                self.publish();
            }
        }
    }

    fn start_refresh(&mut self) {
        if self.refresh_in_flight {
            debug!("facility refresh already in flight");
            return;
        }
        let Some(fix) = self.tracker.current() else {
            debug!("facility refresh skipped: no location");
            return;
        };
        if self.radius_km <= 0.0 {
            debug!("facility refresh skipped: zero radius");
            return;
        }

        self.refresh_in_flight = true;
        let query = FacilityQuery::around(fix.coordinate, self.radius_km);
        let source = Arc::clone(&self.facility_source);
        let results = self.refresh_tx.clone();
        debug!(
            source = source.name(),
            radius_km = self.radius_km,
            "facility refresh started"
        );
        tokio::spawn(async move {
            let result = source.fetch(query).await;
            let _ = results.send(result).await;
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(Snapshot {
            location: self.tracker.current(),
            tracker_state: self.tracker.state(),
            radius_km: self.radius_km,
            nearest_mode: self.nearest_mode,
            ranked: self.ranked.clone(),
            route: self.route.clone(),
            facility_error: self.facility_error.clone(),
            location_error: self.tracker.error(),
        });
    }
}

//! Watch command, replaying a scripted scenario against the live
//! controller and printing each published snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use caremap::config::CoreConfig;
use caremap::controller::{RouteState, SearchBuilder, Snapshot};
use caremap::coord::{distance_km, Coordinate};
use caremap::location::{ChannelPositionProvider, PositionFix, PositionProvider};
use caremap::route::{
    BoxFuture, HttpRoutingProvider, RouteError, RoutePlan, RouteRequest, RoutingProvider,
};

use super::common::{format_distance, resolve_source};
use crate::error::CliError;
use crate::scenario::{self, Step};

/// Arguments for the watch command.
pub struct WatchArgs {
    pub scenario: PathBuf,
    pub facilities: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub route_endpoint: Option<String>,
    pub radius_km: Option<f64>,
    pub nearest: bool,
}

/// Fallback routing when no OSRM endpoint is configured: a straight
/// great-circle leg at an assumed average road speed.
struct GreatCircleRouting {
    speed_kmh: f64,
}

impl RoutingProvider for GreatCircleRouting {
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoutePlan, RouteError>> {
        let distance = distance_km(request.origin, request.destination);
        let duration_s = distance / self.speed_kmh * 3600.0;
        Box::pin(async move {
            Ok(RoutePlan {
                distance_km: distance,
                duration_s,
                geometry: vec![request.origin, request.destination],
            })
        })
    }

    fn name(&self) -> &str {
        "great-circle"
    }
}

/// Runs the watch command.
pub async fn run(args: WatchArgs) -> Result<(), CliError> {
    let steps = scenario::load(&args.scenario)?;
    let facility_source = resolve_source(args.endpoint.as_deref(), args.facilities.as_deref())?;

    let routing: Arc<dyn RoutingProvider> = match &args.route_endpoint {
        Some(url) => Arc::new(
            HttpRoutingProvider::new(url).map_err(|e| CliError::Config(e.to_string()))?,
        ),
        None => Arc::new(GreatCircleRouting { speed_kmh: 40.0 }),
    };

    let mut config = CoreConfig::default();
    if let Some(radius_km) = args.radius_km {
        config = config.with_default_radius_km(radius_km);
    }

    let positions = Arc::new(ChannelPositionProvider::new(config.position_capacity));
    let handle = SearchBuilder::new(config).spawn(
        Arc::clone(&positions) as Arc<dyn PositionProvider>,
        facility_source,
        routing,
    );

    let mut snapshots = handle.subscribe();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            print_snapshot(&snapshot);
        }
    });

    if args.nearest {
        handle
            .toggle_nearest_mode()
            .await
            .map_err(|e| CliError::Search(e.to_string()))?;
    }

    for step in steps {
        debug!(?step, "scenario step");
        match step {
            Step::Fix {
                latitude,
                longitude,
                accuracy_m,
            } => {
                let coordinate = Coordinate::new(latitude, longitude)
                    .map_err(|e| CliError::Config(e.to_string()))?;
                let mut fix = PositionFix::new(coordinate);
                if let Some(meters) = accuracy_m {
                    fix = fix.with_accuracy(meters);
                }
                positions.push_fix(fix);
            }
            Step::Error { kind } => {
                positions.push_error(kind.into());
            }
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
            Step::SetRadius { km } => handle
                .set_radius(km)
                .await
                .map_err(|e| CliError::Search(e.to_string()))?,
            Step::ToggleNearest => handle
                .toggle_nearest_mode()
                .await
                .map_err(|e| CliError::Search(e.to_string()))?,
            Step::Refresh => handle
                .refresh_facilities()
                .await
                .map_err(|e| CliError::Search(e.to_string()))?,
        }
    }

    // Let trailing refreshes and route requests settle before teardown
    tokio::time::sleep(Duration::from_millis(500)).await;

    handle.shutdown().await;
    printer.abort();
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("--------------------------------------------------");
    match snapshot.location {
        Some(fix) => println!(
            "position  {}  [{}]",
            fix.coordinate, snapshot.tracker_state
        ),
        None => println!("position  (none)  [{}]", snapshot.tracker_state),
    }
    if let Some(error) = snapshot.location_error {
        println!("location error: {}", error);
    }
    if let Some(ref error) = snapshot.facility_error {
        println!("facility error: {}", error);
    }

    println!(
        "radius    {}   nearest-mode {}",
        format_distance(snapshot.radius_km),
        if snapshot.nearest_mode { "on" } else { "off" }
    );

    if snapshot.ranked.is_empty() {
        println!("in range  (none)");
    } else {
        println!("in range  {} facilities", snapshot.ranked.len());
        for entry in &snapshot.ranked {
            println!(
                "          {:<40} {:>10}",
                entry.facility.name,
                format_distance(entry.distance_km)
            );
        }
    }

    match &snapshot.route {
        RouteState::Off => {}
        RouteState::Pending { destination_id, .. } => {
            println!("route     resolving to {}...", destination_id)
        }
        RouteState::Ready(result) => println!(
            "route     {} to {} ({:.0} min)",
            format_distance(result.plan.distance_km),
            result.destination_id,
            result.plan.duration_s / 60.0
        ),
        RouteState::NoCandidate => println!("route     no facility in range"),
        RouteState::Failed(error) => println!("route     failed: {}", error),
    }
}

//! CareMap CLI.
//!
//! Terminal frontend for the nearest-facility search library: one-shot
//! ranking from a fixed position, or a live controller run driven by a
//! scripted position scenario.

mod commands;
mod error;
mod scenario;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::rank::RankArgs;
use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "caremap", version = caremap::VERSION)]
#[command(about = "Nearest-facility search over live position fixes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank facilities by distance from a fixed position
    Rank {
        /// Facilities file (JSON array of {id, name, latitude, longitude})
        #[arg(long)]
        facilities: PathBuf,

        /// Origin latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Origin longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Search radius in kilometers
        #[arg(long, default_value_t = caremap::config::DEFAULT_RADIUS_KM)]
        radius: f64,
    },

    /// Replay a scripted position scenario against the live controller
    Watch {
        /// Scenario file (JSON array of steps)
        scenario: PathBuf,

        /// Facilities file, served as a static source
        #[arg(long, conflicts_with = "endpoint")]
        facilities: Option<PathBuf>,

        /// Facility query endpoint (receives lat/lng/range parameters)
        #[arg(long)]
        endpoint: Option<String>,

        /// OSRM-style routing endpoint; straight-line estimates when unset
        #[arg(long)]
        route_endpoint: Option<String>,

        /// Initial search radius in kilometers
        #[arg(long)]
        radius: Option<f64>,

        /// Start with nearest-mode active
        #[arg(long)]
        nearest: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = caremap::logging::init_logging(&cli.log_level) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Rank {
            facilities,
            lat,
            lng,
            radius,
        } => commands::rank::run(RankArgs {
            facilities,
            latitude: lat,
            longitude: lng,
            radius_km: radius,
        }),
        Commands::Watch {
            scenario,
            facilities,
            endpoint,
            route_endpoint,
            radius,
            nearest,
        } => {
            commands::watch::run(WatchArgs {
                scenario,
                facilities,
                endpoint,
                route_endpoint,
                radius_km: radius,
                nearest,
            })
            .await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! Rank command, a one-shot distance ranking from a fixed position.

use std::path::PathBuf;

use caremap::coord::Coordinate;
use caremap::ranking::rank;

use super::common::{format_distance, load_facilities};
use crate::error::CliError;

/// Arguments for the rank command.
pub struct RankArgs {
    pub facilities: PathBuf,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

/// Runs the rank command.
pub fn run(args: RankArgs) -> Result<(), CliError> {
    let origin = Coordinate::new(args.latitude, args.longitude)
        .map_err(|e| CliError::Config(e.to_string()))?;
    let facilities = load_facilities(&args.facilities)?;

    let ranked = rank(origin, args.radius_km, &facilities);

    if ranked.is_empty() {
        println!(
            "No facilities within {} of {}",
            format_distance(args.radius_km),
            origin
        );
        return Ok(());
    }

    println!(
        "{} of {} facilities within {} of {}:",
        ranked.len(),
        facilities.len(),
        format_distance(args.radius_km),
        origin
    );
    println!();
    for (position, entry) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {:<40} {:>10}  {}",
            position + 1,
            entry.facility.name,
            format_distance(entry.distance_km),
            entry.facility.id,
        );
    }

    Ok(())
}

//! Shared helpers for CLI commands.

use std::path::Path;
use std::sync::Arc;

use caremap::facility::{
    Facility, FacilityRecord, FacilitySource, HttpFacilitySource, StaticFacilitySource,
};

use crate::error::CliError;

/// Loads a facilities file: a JSON array of `{id, name, latitude, longitude}`
/// records.
pub fn load_facilities(path: &Path) -> Result<Vec<Facility>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<FacilityRecord> = serde_json::from_str(&contents)
        .map_err(|e| CliError::Parse(format!("{}: {}", path.display(), e)))?;

    records
        .into_iter()
        .map(|record| {
            record
                .into_facility()
                .map_err(|e| CliError::Parse(format!("{}: {}", path.display(), e)))
        })
        .collect()
}

/// Resolves the facility source: an HTTP query endpoint when given, a
/// local file otherwise.
pub fn resolve_source(
    endpoint: Option<&str>,
    file: Option<&Path>,
) -> Result<Arc<dyn FacilitySource>, CliError> {
    match (endpoint, file) {
        (Some(url), _) => {
            let source = HttpFacilitySource::new(url)
                .map_err(|e| CliError::Config(e.to_string()))?;
            Ok(Arc::new(source))
        }
        (None, Some(path)) => {
            let facilities = load_facilities(path)?;
            Ok(Arc::new(StaticFacilitySource::new(facilities)))
        }
        (None, None) => Err(CliError::Config(
            "either --endpoint or --facilities is required".to_string(),
        )),
    }
}

/// Formats a distance for table output.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.1} km", km)
    }
}

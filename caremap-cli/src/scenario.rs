//! Scripted position scenarios.
//!
//! A scenario file is a JSON array of steps, replayed in order against the
//! running search controller. See `demos/` for examples.
//!
//! ```json
//! [
//!   { "step": "fix", "latitude": 43.6, "longitude": 1.44, "accuracy_m": 12.0 },
//!   { "step": "wait", "ms": 500 },
//!   { "step": "set_radius", "km": 25.0 },
//!   { "step": "toggle_nearest" },
//!   { "step": "refresh" },
//!   { "step": "error", "kind": "permission_denied" }
//! ]
//! ```

use std::path::Path;

use serde::Deserialize;

use caremap::location::LocationError;

use crate::error::CliError;

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Push a position fix.
    Fix {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        accuracy_m: Option<f64>,
    },
    /// Push a provider error.
    Error { kind: ErrorKind },
    /// Pause replay.
    Wait { ms: u64 },
    /// Change the search radius.
    SetRadius { km: f64 },
    /// Toggle nearest-mode.
    ToggleNearest,
    /// Force a facility refresh.
    Refresh,
}

/// Provider error kinds available to scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unavailable,
    PermissionDenied,
    Timeout,
}

impl From<ErrorKind> for LocationError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Unavailable => LocationError::Unavailable,
            ErrorKind::PermissionDenied => LocationError::PermissionDenied,
            ErrorKind::Timeout => LocationError::Timeout,
        }
    }
}

/// Loads a scenario from a JSON file.
pub fn load(path: &Path) -> Result<Vec<Step>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let steps: Vec<Step> = serde_json::from_str(&contents)
        .map_err(|e| CliError::Parse(format!("{}: {}", path.display(), e)))?;
    if steps.is_empty() {
        return Err(CliError::Parse(format!(
            "{}: scenario contains no steps",
            path.display()
        )));
    }
    Ok(steps)
}

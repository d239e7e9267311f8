//! Search core configuration.
//!
//! `CoreConfig` combines the tunables of the whole subsystem: default
//! search radius, fix acceptance policy, route timeout, and channel
//! capacities.

use std::time::Duration;

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Default maximum age a fix may have when it is applied.
///
/// Stale fixes are actively rejected rather than served from a cache;
/// among equally fresh fixes, the later one wins.
pub const DEFAULT_MAX_FIX_AGE: Duration = Duration::from_secs(10);

/// Default timeout for a single route request.
pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Top-level configuration for the search core.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Initial search radius in kilometers.
    pub default_radius_km: f64,

    /// Maximum fix age at acceptance time.
    pub max_fix_age: Duration,

    /// Reject fixes with a reported accuracy worse than this many meters.
    /// `None` accepts any accuracy.
    pub max_accuracy_m: Option<f64>,

    /// Timeout for a single route request.
    pub route_timeout: Duration,

    /// Buffer capacity of the control command channel.
    pub command_capacity: usize,

    /// Buffer capacity of the route completion channel.
    pub completion_capacity: usize,

    /// Buffer capacity of the position event channel.
    pub position_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_radius_km: DEFAULT_RADIUS_KM,
            max_fix_age: DEFAULT_MAX_FIX_AGE,
            max_accuracy_m: None,
            route_timeout: DEFAULT_ROUTE_TIMEOUT,
            command_capacity: 16,
            completion_capacity: 16,
            position_capacity: 32,
        }
    }
}

impl CoreConfig {
    /// Sets the initial search radius.
    pub fn with_default_radius_km(mut self, radius_km: f64) -> Self {
        self.default_radius_km = radius_km;
        self
    }

    /// Sets the maximum fix age.
    pub fn with_max_fix_age(mut self, max_fix_age: Duration) -> Self {
        self.max_fix_age = max_fix_age;
        self
    }

    /// Sets the accuracy bound in meters.
    pub fn with_max_accuracy_m(mut self, meters: f64) -> Self {
        self.max_accuracy_m = Some(meters);
        self
    }

    /// Sets the route request timeout.
    pub fn with_route_timeout(mut self, timeout: Duration) -> Self {
        self.route_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.default_radius_km, 50.0);
        assert_eq!(config.max_fix_age, Duration::from_secs(10));
        assert_eq!(config.max_accuracy_m, None);
    }

    #[test]
    fn test_builder_setters() {
        let config = CoreConfig::default()
            .with_default_radius_km(10.0)
            .with_max_fix_age(Duration::from_secs(2))
            .with_max_accuracy_m(75.0)
            .with_route_timeout(Duration::from_secs(5));

        assert_eq!(config.default_radius_km, 10.0);
        assert_eq!(config.max_fix_age, Duration::from_secs(2));
        assert_eq!(config.max_accuracy_m, Some(75.0));
        assert_eq!(config.route_timeout, Duration::from_secs(5));
    }
}

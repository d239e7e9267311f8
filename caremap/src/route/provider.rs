//! Routing provider boundary and HTTP implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::coord::Coordinate;

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from the routing provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The provider could not be reached or refused the request.
    #[error("routing provider unavailable: {0}")]
    Unavailable(String),

    /// The provider found no route between origin and destination.
    #[error("no route found between origin and destination")]
    NoRouteFound,

    /// The request exceeded the configured timeout.
    #[error("route request timed out")]
    Timeout,

    /// The provider responded with data the core cannot use.
    #[error("invalid routing response: {0}")]
    InvalidResponse(String),
}

/// Travel profile for a route request.
///
/// Only driving is used by the nearest-facility search today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TravelMode {
    #[default]
    Driving,
}

impl TravelMode {
    /// Profile name as used in provider URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
        }
    }
}

/// A single route computation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TravelMode,
}

/// A computed route description.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Driving distance in kilometers.
    pub distance_km: f64,
    /// Estimated duration in seconds.
    pub duration_s: f64,
    /// Route polyline as ordered coordinates.
    pub geometry: Vec<Coordinate>,
}

/// External routing provider.
///
/// Treated as a black box: one request per call, no retries at this
/// layer.
pub trait RoutingProvider: Send + Sync {
    /// Computes a route for the given request.
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoutePlan, RouteError>>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}

/// OSRM-compatible wire shapes.
#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Distance in meters.
    distance: f64,
    /// Duration in seconds.
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON positions as `[longitude, latitude]` pairs.
    coordinates: Vec<[f64; 2]>,
}

/// Routing over an OSRM-style HTTP endpoint.
///
/// Issues `GET {base}/route/v1/{profile}/{lon},{lat};{lon},{lat}` with a
/// GeoJSON geometry and maps the response into a [`RoutePlan`].
pub struct HttpRoutingProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRoutingProvider {
    /// Creates a provider against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RouteError> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Creates a provider with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RouteError::Unavailable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn request_url(&self, request: &RouteRequest) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            request.mode.as_str(),
            request.origin.longitude(),
            request.origin.latitude(),
            request.destination.longitude(),
            request.destination.latitude(),
        )
    }

    fn parse_response(body: OsrmResponse) -> Result<RoutePlan, RouteError> {
        match body.code.as_str() {
            "Ok" => {}
            "NoRoute" => return Err(RouteError::NoRouteFound),
            other => return Err(RouteError::Unavailable(format!("provider code {}", other))),
        }

        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or(RouteError::NoRouteFound)?;

        let geometry = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| {
                Coordinate::new(lat, lon)
                    .map_err(|e| RouteError::InvalidResponse(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoutePlan {
            distance_km: route.distance / 1000.0,
            duration_s: route.duration,
            geometry,
        })
    }
}

impl RoutingProvider for HttpRoutingProvider {
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoutePlan, RouteError>> {
        Box::pin(async move {
            let url = self.request_url(&request);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| RouteError::Unavailable(format!("request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(RouteError::Unavailable(format!(
                    "HTTP {} from routing endpoint",
                    response.status()
                )));
            }

            let body: OsrmResponse = response
                .json()
                .await
                .map_err(|e| RouteError::InvalidResponse(e.to_string()))?;

            Self::parse_response(body)
        })
    }

    fn name(&self) -> &str {
        "osrm-http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_request_url_shape() {
        let provider = HttpRoutingProvider::new("https://router.example.com/").unwrap();
        let request = RouteRequest {
            origin: coord(43.6, 1.4),
            destination: coord(43.7, 1.5),
            mode: TravelMode::Driving,
        };

        let url = provider.request_url(&request);
        assert_eq!(
            url,
            "https://router.example.com/route/v1/driving/1.4,43.6;1.5,43.7?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_parse_ok_response() {
        let body: OsrmResponse = serde_json::from_str(
            r#"{
                "code": "Ok",
                "routes": [{
                    "distance": 2500.0,
                    "duration": 300.0,
                    "geometry": { "coordinates": [[1.4, 43.6], [1.5, 43.7]] }
                }]
            }"#,
        )
        .unwrap();

        let plan = HttpRoutingProvider::parse_response(body).unwrap();
        assert_eq!(plan.distance_km, 2.5);
        assert_eq!(plan.duration_s, 300.0);
        assert_eq!(plan.geometry.len(), 2);
        assert_eq!(plan.geometry[0], coord(43.6, 1.4));
    }

    #[test]
    fn test_parse_no_route() {
        let body: OsrmResponse =
            serde_json::from_str(r#"{"code": "NoRoute", "routes": []}"#).unwrap();
        assert_eq!(
            HttpRoutingProvider::parse_response(body),
            Err(RouteError::NoRouteFound)
        );
    }

    #[test]
    fn test_parse_error_code() {
        let body: OsrmResponse =
            serde_json::from_str(r#"{"code": "InvalidQuery", "routes": []}"#).unwrap();
        assert!(matches!(
            HttpRoutingProvider::parse_response(body),
            Err(RouteError::Unavailable(_))
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_geometry() {
        let body: OsrmResponse = serde_json::from_str(
            r#"{
                "code": "Ok",
                "routes": [{
                    "distance": 100.0,
                    "duration": 10.0,
                    "geometry": { "coordinates": [[1.4, 143.6]] }
                }]
            }"#,
        )
        .unwrap();

        assert!(matches!(
            HttpRoutingProvider::parse_response(body),
            Err(RouteError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_travel_mode_as_str() {
        assert_eq!(TravelMode::Driving.as_str(), "driving");
    }
}

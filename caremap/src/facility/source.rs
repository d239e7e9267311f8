//! Facility data source boundary.
//!
//! A [`FacilitySource`] is the external collaborator that supplies facility
//! records: either a fixed in-memory list or a query endpoint. The query
//! carries the origin and radius so a server-side geospatial index can
//! pre-filter; the client-side ranker re-filters regardless, so the core
//! behaves identically whichever side does the filtering.
//!
//! The trait returns boxed futures so it stays dyn-compatible and can be
//! stored behind an `Arc<dyn FacilitySource>`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Facility, FacilityId};
use crate::coord::Coordinate;

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from a facility data source.
///
/// Carried as data to the controller; a failed fetch never blanks the
/// previously loaded facility set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FacilityError {
    /// The fetch itself failed (network, HTTP status, endpoint down).
    #[error("facility fetch failed: {0}")]
    FetchFailed(String),

    /// The endpoint responded with data the core cannot use.
    #[error("invalid facility response: {0}")]
    InvalidResponse(String),
}

/// Geospatial query sent to a facility source.
///
/// Mirrors the shape a server-side geospatial index accepts: an origin and
/// a radius in kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacilityQuery {
    /// Origin latitude in degrees.
    pub latitude: f64,
    /// Origin longitude in degrees.
    pub longitude: f64,
    /// Search radius in kilometers.
    pub radius_km: f64,
}

impl FacilityQuery {
    /// Builds a query centered on a coordinate.
    pub fn around(origin: Coordinate, radius_km: f64) -> Self {
        Self {
            latitude: origin.latitude(),
            longitude: origin.longitude(),
            radius_km,
        }
    }
}

/// Wire shape of a facility record as returned by the query endpoint.
///
/// Coordinates arrive as raw degrees and are validated when converted into
/// a [`Facility`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl FacilityRecord {
    /// Validates the record and converts it into a [`Facility`].
    pub fn into_facility(self) -> Result<Facility, FacilityError> {
        let coordinate = Coordinate::new(self.latitude, self.longitude)
            .map_err(|e| FacilityError::InvalidResponse(format!("record {}: {}", self.id, e)))?;
        Ok(Facility {
            id: FacilityId(self.id),
            name: self.name,
            coordinate,
        })
    }
}

/// External facility data source.
pub trait FacilitySource: Send + Sync {
    /// Fetches facility records for the given query.
    ///
    /// Implementations that cannot filter server-side may ignore the query
    /// and return their full set.
    fn fetch(&self, query: FacilityQuery) -> BoxFuture<'_, Result<Vec<Facility>, FacilityError>>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}

/// Fixed in-memory facility list.
///
/// Ignores the query; the client-side ranker applies the radius.
pub struct StaticFacilitySource {
    facilities: Vec<Facility>,
}

impl StaticFacilitySource {
    /// Creates a source serving a fixed list.
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }
}

impl FacilitySource for StaticFacilitySource {
    fn fetch(&self, _query: FacilityQuery) -> BoxFuture<'_, Result<Vec<Facility>, FacilityError>> {
        let facilities = self.facilities.clone();
        Box::pin(async move { Ok(facilities) })
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Facility query endpoint over HTTP.
///
/// Sends the origin and radius as query parameters (`lat`, `lng`, `range`)
/// and expects a JSON array of [`FacilityRecord`] in the response body.
pub struct HttpFacilitySource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFacilitySource {
    /// Creates a source against the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FacilityError> {
        Self::with_timeout(endpoint, Duration::from_secs(30))
    }

    /// Creates a source with a custom request timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FacilityError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FacilityError::FetchFailed(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl FacilitySource for HttpFacilitySource {
    fn fetch(&self, query: FacilityQuery) -> BoxFuture<'_, Result<Vec<Facility>, FacilityError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("lat", query.latitude),
                    ("lng", query.longitude),
                    ("range", query.radius_km),
                ])
                .send()
                .await
                .map_err(|e| FacilityError::FetchFailed(format!("request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(FacilityError::FetchFailed(format!(
                    "HTTP {} from {}",
                    response.status(),
                    self.endpoint
                )));
            }

            let records: Vec<FacilityRecord> = response
                .json()
                .await
                .map_err(|e| FacilityError::InvalidResponse(e.to_string()))?;

            records
                .into_iter()
                .map(FacilityRecord::into_facility)
                .collect()
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facility(id: u64, lat: f64, lon: f64) -> Facility {
        Facility::new(id, format!("Facility {}", id), Coordinate::new(lat, lon).unwrap())
    }

    #[tokio::test]
    async fn test_static_source_returns_full_set() {
        let source = StaticFacilitySource::new(vec![facility(1, 10.0, 10.0), facility(2, 20.0, 20.0)]);

        let query = FacilityQuery {
            latitude: 0.0,
            longitude: 0.0,
            radius_km: 1.0,
        };
        let result = source.fetch(query).await.unwrap();

        // Static sources ignore the query; filtering happens client-side
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_record_conversion_valid() {
        let record = FacilityRecord {
            id: 5,
            name: "City Clinic".to_string(),
            latitude: 48.85,
            longitude: 2.35,
        };

        let facility = record.into_facility().unwrap();
        assert_eq!(facility.id, FacilityId(5));
        assert_eq!(facility.name, "City Clinic");
    }

    #[test]
    fn test_record_conversion_rejects_bad_coordinates() {
        let record = FacilityRecord {
            id: 9,
            name: "Nowhere".to_string(),
            latitude: 123.0,
            longitude: 0.0,
        };

        let err = record.into_facility().unwrap_err();
        assert!(matches!(err, FacilityError::InvalidResponse(_)));
        assert!(err.to_string().contains("record 9"));
    }

    #[test]
    fn test_query_around() {
        let origin = Coordinate::new(43.6, 1.4).unwrap();
        let query = FacilityQuery::around(origin, 25.0);

        assert_eq!(query.latitude, 43.6);
        assert_eq!(query.longitude, 1.4);
        assert_eq!(query.radius_km, 25.0);
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = FacilityRecord {
            id: 1,
            name: "General".to_string(),
            latitude: 10.0,
            longitude: 20.0,
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: FacilityRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}

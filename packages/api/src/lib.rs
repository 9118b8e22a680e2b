#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sources of zone, ward, and road records.
//!
//! [`HttpRecordSource`] talks to the municipal GIS REST API;
//! [`FixtureRecordSource`] serves the same shapes from a directory of JSON
//! files for offline use and tests. Both implement [`RecordSource`].

pub mod fixture;
pub mod http;

use async_trait::async_trait;
use strum_macros::{AsRefStr, Display};
use ward_map_records_models::{Road, Ward, Zone};

pub use fixture::FixtureRecordSource;
pub use http::HttpRecordSource;

/// Errors that can occur while fetching records.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a fixture file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// The upstream collections and lookups, for logging and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Zones,
    Wards,
    Roads,
    MultiWardRoads,
    WardCount,
    WardsByZone,
    ZoneByNo,
    RoadsByWard,
}

/// A provider of upstream records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All zones.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the collection cannot be fetched or parsed.
    async fn fetch_zones(&self) -> Result<Vec<Zone>, FetchError>;

    /// All wards.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the collection cannot be fetched or parsed.
    async fn fetch_wards(&self) -> Result<Vec<Ward>, FetchError>;

    /// All single-ward roads.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the collection cannot be fetched or parsed.
    async fn fetch_roads(&self) -> Result<Vec<Road>, FetchError>;

    /// Roads crossing more than one ward.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the collection cannot be fetched or parsed.
    async fn fetch_multi_ward_roads(&self) -> Result<Vec<Road>, FetchError>;

    /// Number of wards in a zone.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the lookup fails.
    async fn ward_count_by_zone(&self, zone_no: &str) -> Result<u64, FetchError>;

    /// Wards belonging to a zone.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the lookup fails.
    async fn wards_by_zone(&self, zone_no: &str) -> Result<Vec<Ward>, FetchError>;

    /// A single zone, or `None` if the zone number is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the lookup fails.
    async fn zone_by_no(&self, zone_no: &str) -> Result<Option<Zone>, FetchError>;

    /// Roads lying in or crossing a ward.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the lookup fails.
    async fn roads_by_ward(&self, ward_no: &str) -> Result<Vec<Road>, FetchError>;
}

/// Parses a zone lookup response, which upstream sends either as a single
/// object or as an array whose first element is the zone.
///
/// # Errors
///
/// Returns [`FetchError::Json`] if the value is not a zone.
pub fn parse_zone_lookup(value: serde_json::Value) -> Result<Option<Zone>, FetchError> {
    let value = match value {
        serde_json::Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        },
        serde_json::Value::Null => return Ok(None),
        other => other,
    };
    Ok(Some(serde_json::from_value(value)?))
}

/// Parses a ward count, tolerating numeric strings.
///
/// # Errors
///
/// Returns [`FetchError::Json`] if the value is not a count.
pub fn parse_ward_count(value: serde_json::Value) -> Result<u64, FetchError> {
    if let Some(text) = value.as_str() {
        return text.trim().parse().map_err(|_| {
            FetchError::Json(serde::de::Error::custom(format!(
                "invalid ward count: {text}"
            )))
        });
    }
    Ok(serde_json::from_value(value)?)
}

//! Client for the municipal GIS REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use ward_map_records_models::{Road, Ward, Zone};

use crate::{Collection, FetchError, RecordSource, parse_ward_count, parse_zone_lookup};

const ZONES_PATH: &str = "/api/zones/alldata";
const WARDS_PATH: &str = "/api/ward/all";
const ROADS_PATH: &str = "/api/road/all";
const MULTI_WARD_ROADS_PATH: &str = "/api/road/multi-ward-roads";
const WARD_COUNT_PATH: &str = "/api/road/countWards";
const WARDS_BY_ZONE_PATH: &str = "/api/road/allWardsByZoneNo";
const ZONE_BY_NO_PATH: &str = "/api/zones/byZoneNo";
const ROADS_BY_WARD_PATH: &str = "/api/multiwardroads/ward";

/// [`RecordSource`] backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordSource {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        collection: Collection,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = self.url(path);
        log::debug!("Fetching {collection} from {url}");

        let resp = self.client.get(&url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        let parsed = serde_json::from_slice(&body)?;
        log::debug!("Fetched {collection} ({} bytes)", body.len());
        Ok(parsed)
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_zones(&self) -> Result<Vec<Zone>, FetchError> {
        self.get_json(Collection::Zones, ZONES_PATH, &[]).await
    }

    async fn fetch_wards(&self) -> Result<Vec<Ward>, FetchError> {
        self.get_json(Collection::Wards, WARDS_PATH, &[]).await
    }

    async fn fetch_roads(&self) -> Result<Vec<Road>, FetchError> {
        self.get_json(Collection::Roads, ROADS_PATH, &[]).await
    }

    async fn fetch_multi_ward_roads(&self) -> Result<Vec<Road>, FetchError> {
        self.get_json(Collection::MultiWardRoads, MULTI_WARD_ROADS_PATH, &[])
            .await
    }

    async fn ward_count_by_zone(&self, zone_no: &str) -> Result<u64, FetchError> {
        let value = self
            .get_json(
                Collection::WardCount,
                WARD_COUNT_PATH,
                &[("zoneNo", zone_no)],
            )
            .await?;
        parse_ward_count(value)
    }

    async fn wards_by_zone(&self, zone_no: &str) -> Result<Vec<Ward>, FetchError> {
        let wards: Option<Vec<Ward>> = self
            .get_json(
                Collection::WardsByZone,
                WARDS_BY_ZONE_PATH,
                &[("zoneNo", zone_no)],
            )
            .await?;
        Ok(wards.unwrap_or_default())
    }

    async fn zone_by_no(&self, zone_no: &str) -> Result<Option<Zone>, FetchError> {
        let value = self
            .get_json(Collection::ZoneByNo, ZONE_BY_NO_PATH, &[("zoneNo", zone_no)])
            .await?;
        parse_zone_lookup(value)
    }

    async fn roads_by_ward(&self, ward_no: &str) -> Result<Vec<Road>, FetchError> {
        let roads: Option<Vec<Road>> = self
            .get_json(
                Collection::RoadsByWard,
                ROADS_BY_WARD_PATH,
                &[("wardNo", ward_no)],
            )
            .await?;
        Ok(roads.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let source = HttpRecordSource::with_client(reqwest::Client::new(), "http://localhost:8080/");
        assert_eq!(source.base_url(), "http://localhost:8080");
        assert_eq!(source.url(ROADS_PATH), "http://localhost:8080/api/road/all");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_fetch_error() {
        let source = HttpRecordSource::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            source.fetch_roads().await,
            Err(FetchError::Http(_))
        ));
    }
}

//! Offline [`RecordSource`] reading JSON files from a directory.
//!
//! Expected files, each holding a JSON array in the upstream shape:
//! `zones.json`, `wards.json`, `roads.json`, `multi_ward_roads.json`. A
//! missing file reads as an empty collection. Per-zone and per-ward
//! lookups are answered from those collections.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use ward_map_records_models::{Road, Ward, Zone};

use crate::{Collection, FetchError, RecordSource};

#[derive(Debug, Clone)]
pub struct FixtureRecordSource {
    dir: PathBuf,
}

impl FixtureRecordSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    const fn file_name(collection: Collection) -> Option<&'static str> {
        match collection {
            Collection::Zones => Some("zones.json"),
            Collection::Wards => Some("wards.json"),
            Collection::Roads => Some("roads.json"),
            Collection::MultiWardRoads => Some("multi_ward_roads.json"),
            Collection::WardCount
            | Collection::WardsByZone
            | Collection::ZoneByNo
            | Collection::RoadsByWard => None,
        }
    }

    async fn read<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, FetchError> {
        let Some(name) = Self::file_name(collection) else {
            return Ok(Vec::new());
        };
        let path = self.dir.join(name);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {collection} fixture at {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FetchError::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        let records: Vec<T> = serde_json::from_slice(&bytes)?;
        log::debug!("Loaded {} {collection} from {}", records.len(), path.display());
        Ok(records)
    }

    /// Distinct ward numbers that roads in `zone_no` run through.
    async fn zone_ward_numbers(&self, zone_no: &str) -> Result<BTreeSet<String>, FetchError> {
        let mut roads: Vec<Road> = self.read(Collection::Roads).await?;
        roads.extend(self.read::<Road>(Collection::MultiWardRoads).await?);

        Ok(roads
            .iter()
            .filter(|r| r.zone_no.as_deref() == Some(zone_no))
            .flat_map(|r| r.ward_numbers().into_iter().map(str::to_string))
            .collect())
    }
}

#[async_trait]
impl RecordSource for FixtureRecordSource {
    async fn fetch_zones(&self) -> Result<Vec<Zone>, FetchError> {
        self.read(Collection::Zones).await
    }

    async fn fetch_wards(&self) -> Result<Vec<Ward>, FetchError> {
        self.read(Collection::Wards).await
    }

    async fn fetch_roads(&self) -> Result<Vec<Road>, FetchError> {
        self.read(Collection::Roads).await
    }

    async fn fetch_multi_ward_roads(&self) -> Result<Vec<Road>, FetchError> {
        self.read(Collection::MultiWardRoads).await
    }

    async fn ward_count_by_zone(&self, zone_no: &str) -> Result<u64, FetchError> {
        Ok(self.zone_ward_numbers(zone_no).await?.len() as u64)
    }

    async fn wards_by_zone(&self, zone_no: &str) -> Result<Vec<Ward>, FetchError> {
        let numbers = self.zone_ward_numbers(zone_no).await?;
        let wards: Vec<Ward> = self.read(Collection::Wards).await?;
        Ok(wards
            .into_iter()
            .filter(|w| w.ward_no.as_ref().is_some_and(|n| numbers.contains(n)))
            .collect())
    }

    async fn zone_by_no(&self, zone_no: &str) -> Result<Option<Zone>, FetchError> {
        let zones: Vec<Zone> = self.read(Collection::Zones).await?;
        Ok(zones
            .into_iter()
            .find(|z| z.zone_no.as_deref() == Some(zone_no)))
    }

    async fn roads_by_ward(&self, ward_no: &str) -> Result<Vec<Road>, FetchError> {
        let mut roads: Vec<Road> = self.read(Collection::Roads).await?;
        roads.extend(self.read::<Road>(Collection::MultiWardRoads).await?);

        let mut seen = BTreeSet::new();
        Ok(roads
            .into_iter()
            .filter(|r| r.ward_numbers().contains(&ward_no))
            .filter(|r| seen.insert(r.gid.clone()))
            .collect())
    }
}

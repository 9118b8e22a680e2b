//! Features: decoded geometry plus tag plus the original record.

use geo::{BoundingRect, Geometry, Rect};
use serde::{Deserialize, Serialize};
use ward_map_geometry::{Crs, DecodeError, decode};
use ward_map_records_models::{FeatureId, FeatureTag, Record, Road, SourceRecord};

/// Identity of a feature: upstream gids are unique only within their own
/// collection, so the tag is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureKey {
    pub tag: FeatureTag,
    pub id: FeatureId,
}

impl FeatureKey {
    #[must_use]
    pub fn new(tag: FeatureTag, id: impl Into<FeatureId>) -> Self {
        Self { tag, id: id.into() }
    }
}

/// A renderable map feature derived from one source record.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub tag: FeatureTag,
    /// Geometry in the working CRS.
    pub geometry: Geometry<f64>,
    pub attributes: Record,
}

impl Feature {
    #[must_use]
    pub fn key(&self) -> FeatureKey {
        FeatureKey {
            tag: self.tag,
            id: self.id.clone(),
        }
    }

    /// Road attributes, for road and multi-road features.
    #[must_use]
    pub const fn road(&self) -> Option<&Road> {
        self.attributes.as_road()
    }

    #[must_use]
    pub fn extent(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// Builds features in a fixed working CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBuilder {
    working: Crs,
}

impl FeatureBuilder {
    #[must_use]
    pub const fn new(working: Crs) -> Self {
        Self { working }
    }

    #[must_use]
    pub const fn working_crs(&self) -> Crs {
        self.working
    }

    /// Decodes one record's geometry from `source` into the working CRS
    /// and wraps it as a feature.
    ///
    /// Returns `None` when the record has no geometry or it fails to
    /// decode; the failure is logged, never propagated.
    #[must_use]
    pub fn build<R: SourceRecord>(&self, record: &R, tag: FeatureTag, source: Crs) -> Option<Feature> {
        match self.try_build(record, tag, source) {
            Ok(feature) => Some(feature),
            Err(DecodeError::Empty) => {
                log::debug!("Skipping {tag} {}: no geometry", record.id());
                None
            }
            Err(e) => {
                log::warn!("Dropping {tag} {}: {e}", record.id());
                None
            }
        }
    }

    fn try_build<R: SourceRecord>(
        &self,
        record: &R,
        tag: FeatureTag,
        source: Crs,
    ) -> Result<Feature, DecodeError> {
        let text = record.wkt().ok_or(DecodeError::Empty)?;
        let geometry = decode(text, source, self.working)?;
        Ok(Feature {
            id: record.id().clone(),
            tag,
            geometry,
            attributes: record.to_record(),
        })
    }

    /// Lazily builds features for a whole collection, skipping records
    /// that fail to decode.
    ///
    /// Nothing is cached: iterating again recomputes from the records.
    pub fn build_all<'a, R: SourceRecord>(
        &'a self,
        records: &'a [R],
        tag: FeatureTag,
        source: Crs,
    ) -> impl Iterator<Item = Feature> + 'a {
        records
            .iter()
            .filter_map(move |record| self.build(record, tag, source))
    }
}

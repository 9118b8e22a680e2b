#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zone, ward, and road record types consumed from the municipal GIS API.
//!
//! These are the upstream data contracts: one struct per collection, with
//! the API's camelCase field names. Geometry stays as raw well-known text
//! here; decoding and reprojection happen in `ward_map_geometry`.
//!
//! The API is loose about scalar types (ids and ward/zone numbers arrive as
//! either JSON numbers or strings, areas sometimes as strings), so the
//! deserializers in [`de`] normalize them.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub mod de;

/// Unique identifier of a source record, and of the feature built from it.
///
/// Always the upstream `gid` rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for FeatureId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// The category a rendered feature belongs to.
///
/// Determines which map layer the feature lands on, which filter rules
/// apply to it, and how it is styled.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FeatureTag {
    /// Top-level administrative area outline.
    Zone,
    /// Ward boundary.
    Ward,
    /// Road segment lying within a single ward.
    Road,
    /// Road segment crossing more than one ward boundary.
    MultiRoad,
}

impl FeatureTag {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Zone, Self::Ward, Self::Road, Self::MultiRoad]
    }

    /// Whether this tag carries road attributes (condition, carriage type).
    #[must_use]
    pub const fn is_road(self) -> bool {
        matches!(self, Self::Road | Self::MultiRoad)
    }
}

/// Surface condition class of a road segment.
///
/// Upstream sends free-form text; anything outside the known set
/// classifies as [`RoadCondition::Unknown`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum RoadCondition {
    Good,
    Moderate,
    Poor,
    Unknown,
}

impl RoadCondition {
    /// The condition classes upstream is expected to send.
    #[must_use]
    pub const fn known() -> &'static [Self] {
        &[Self::Good, Self::Moderate, Self::Poor]
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Good, Self::Moderate, Self::Poor, Self::Unknown]
    }

    /// Classifies a raw upstream condition string.
    #[must_use]
    pub fn classify(raw: Option<&str>) -> Self {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::Unknown)
    }
}

/// A zone row from the zone collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(deserialize_with = "de::id")]
    pub gid: FeatureId,
    #[serde(default, deserialize_with = "de::code")]
    pub zone_no: Option<String>,
    #[serde(default)]
    pub zone_name: Option<String>,
    /// Area in square kilometres.
    #[serde(default, deserialize_with = "de::number")]
    pub area_sq_km: Option<f64>,
    /// Boundary as WKT in geographic degrees.
    #[serde(default)]
    pub wkt: Option<String>,
}

/// A ward row from the ward collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    #[serde(deserialize_with = "de::id")]
    pub gid: FeatureId,
    #[serde(default, deserialize_with = "de::code")]
    pub ward_no: Option<String>,
    #[serde(default)]
    pub ward_name: Option<String>,
    /// Area in square metres.
    #[serde(default, deserialize_with = "de::number")]
    pub area: Option<f64>,
    /// Free-text description of the ward's extensions.
    #[serde(default)]
    pub ward_exten: Option<String>,
    /// Boundary as WKT in geographic degrees.
    #[serde(default)]
    pub wkt: Option<String>,
}

/// A road row from either the road or the multi-ward-road collection.
///
/// The two collections share this shape. For multi-ward roads `ward_no`
/// holds a comma-separated list instead of a single ward number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Road {
    #[serde(deserialize_with = "de::id")]
    pub gid: FeatureId,
    #[serde(default)]
    pub road_name: Option<String>,
    /// Raw condition text; see [`Road::condition_class`].
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub ownership: Option<String>,
    /// Carriageway type (e.g. "Single Carriageway").
    #[serde(default)]
    pub carriage_m: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::number")]
    pub length_met: Option<f64>,
    /// Right-of-way width in metres.
    #[serde(default, deserialize_with = "de::number")]
    pub row_meter: Option<f64>,
    #[serde(default, deserialize_with = "de::code")]
    pub ward_no: Option<String>,
    #[serde(default)]
    pub ward_name: Option<String>,
    #[serde(default, deserialize_with = "de::code")]
    pub zone_no: Option<String>,
    #[serde(default)]
    pub zone_name: Option<String>,
    /// Portion of the road inside the queried ward (per-ward lookups only).
    #[serde(default, deserialize_with = "de::number")]
    pub length_within_ward: Option<f64>,
    /// Centreline as WKT in the projected road CRS.
    #[serde(default)]
    pub wkt: Option<String>,
}

impl Road {
    #[must_use]
    pub fn condition_class(&self) -> RoadCondition {
        RoadCondition::classify(self.condition.as_deref())
    }

    /// Ward numbers this road touches, in upstream order.
    #[must_use]
    pub fn ward_numbers(&self) -> Vec<&str> {
        self.ward_no
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The ward to navigate to for this road.
    ///
    /// For a multi-ward list this is the first listed ward.
    #[must_use]
    pub fn primary_ward_no(&self) -> Option<&str> {
        self.ward_numbers().into_iter().next()
    }

    #[must_use]
    pub fn is_multi_ward(&self) -> bool {
        self.ward_numbers().len() > 1
    }
}

/// Any record that can become a map feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Zone(Zone),
    Ward(Ward),
    Road(Road),
}

impl Record {
    #[must_use]
    pub const fn id(&self) -> &FeatureId {
        match self {
            Self::Zone(z) => &z.gid,
            Self::Ward(w) => &w.gid,
            Self::Road(r) => &r.gid,
        }
    }

    #[must_use]
    pub fn wkt(&self) -> Option<&str> {
        match self {
            Self::Zone(z) => z.wkt.as_deref(),
            Self::Ward(w) => w.wkt.as_deref(),
            Self::Road(r) => r.wkt.as_deref(),
        }
    }

    #[must_use]
    pub const fn as_road(&self) -> Option<&Road> {
        match self {
            Self::Road(r) => Some(r),
            Self::Zone(_) | Self::Ward(_) => None,
        }
    }

    /// Human-readable label used in tooltips and logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Zone(z) => format!(
                "Zone {} - {}",
                z.zone_no.as_deref().unwrap_or("?"),
                z.zone_name.as_deref().unwrap_or("")
            ),
            Self::Ward(w) => format!(
                "Ward {} - {}",
                w.ward_no.as_deref().unwrap_or("?"),
                w.ward_name.as_deref().unwrap_or("")
            ),
            Self::Road(r) => r
                .road_name
                .clone()
                .unwrap_or_else(|| format!("Road {}", r.gid)),
        }
    }
}

/// A record type from one of the upstream collections.
pub trait SourceRecord {
    fn id(&self) -> &FeatureId;

    fn wkt(&self) -> Option<&str>;

    fn to_record(&self) -> Record;
}

impl SourceRecord for Zone {
    fn id(&self) -> &FeatureId {
        &self.gid
    }

    fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    fn to_record(&self) -> Record {
        Record::Zone(self.clone())
    }
}

impl SourceRecord for Ward {
    fn id(&self) -> &FeatureId {
        &self.gid
    }

    fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    fn to_record(&self) -> Record {
        Record::Ward(self.clone())
    }
}

impl SourceRecord for Road {
    fn id(&self) -> &FeatureId {
        &self.gid
    }

    fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    fn to_record(&self) -> Record {
        Record::Road(self.clone())
    }
}

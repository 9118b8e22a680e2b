//! Per-zone road network analytics.

use std::collections::BTreeMap;

use futures::future::join_all;
use serde::Serialize;
use ward_map_api::{FetchError, RecordSource};
use ward_map_records_models::{Road, Zone};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone_no: String,
    pub zone_name: String,
    pub area_sq_km: f64,
    pub ward_count: u64,
    pub road_count: usize,
    pub total_road_length_m: f64,
    /// Mean right-of-way width; roads without one count as zero.
    pub avg_road_width_m: f64,
    /// Wards per square kilometre.
    pub ward_density: f64,
    /// Metres of road per square kilometre.
    pub road_density: f64,
    pub condition_breakdown: BTreeMap<String, usize>,
    pub ownership_breakdown: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub zones: Vec<ZoneSummary>,
    pub road_count: usize,
    pub total_road_length_m: f64,
    pub condition_breakdown: BTreeMap<String, usize>,
}

fn bucket(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn breakdown<'a>(values: impl Iterator<Item = Option<&'a str>>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(bucket(value)).or_insert(0) += 1;
    }
    counts
}

fn per_sq_km(value: f64, area_sq_km: f64) -> f64 {
    if area_sq_km > 0.0 {
        value / area_sq_km
    } else {
        0.0
    }
}

/// Summarizes one zone from its ward count and every road in the city;
/// roads belong to the zone when their `zone_no` matches.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize_zone(zone: &Zone, ward_count: u64, roads: &[Road]) -> ZoneSummary {
    let zone_no = zone.zone_no.clone().unwrap_or_default();
    let zone_roads: Vec<&Road> = roads
        .iter()
        .filter(|r| r.zone_no.as_deref() == Some(zone_no.as_str()))
        .collect();

    let area_sq_km = zone.area_sq_km.unwrap_or(0.0);
    let total_road_length_m: f64 = zone_roads.iter().filter_map(|r| r.length_met).sum();
    let avg_road_width_m = if zone_roads.is_empty() {
        0.0
    } else {
        zone_roads.iter().map(|r| r.row_meter.unwrap_or(0.0)).sum::<f64>() / zone_roads.len() as f64
    };

    ZoneSummary {
        zone_name: zone.zone_name.clone().unwrap_or_default(),
        area_sq_km,
        ward_count,
        road_count: zone_roads.len(),
        total_road_length_m,
        avg_road_width_m,
        ward_density: per_sq_km(ward_count as f64, area_sq_km),
        road_density: per_sq_km(total_road_length_m, area_sq_km),
        condition_breakdown: breakdown(zone_roads.iter().map(|r| r.condition.as_deref())),
        ownership_breakdown: breakdown(zone_roads.iter().map(|r| r.ownership.as_deref())),
        zone_no,
    }
}

/// Summarizes every zone plus the whole network.
#[must_use]
pub fn summarize(zones: &[Zone], ward_counts: &[u64], roads: &[Road]) -> NetworkSummary {
    NetworkSummary {
        zones: zones
            .iter()
            .zip(ward_counts.iter().copied().chain(std::iter::repeat(0)))
            .map(|(zone, count)| summarize_zone(zone, count, roads))
            .collect(),
        road_count: roads.len(),
        total_road_length_m: roads.iter().filter_map(|r| r.length_met).sum(),
        condition_breakdown: breakdown(roads.iter().map(|r| r.condition.as_deref())),
    }
}

/// Fetches zones and roads, then each zone's ward count, and summarizes.
/// A failed ward count counts as zero.
///
/// # Errors
///
/// Returns [`FetchError`] if the zone or road collection cannot be
/// fetched.
pub async fn load_summary(source: &dyn RecordSource) -> Result<NetworkSummary, FetchError> {
    let (zones, roads) = futures::try_join!(source.fetch_zones(), source.fetch_roads())?;

    let counts = join_all(zones.iter().map(|zone| async move {
        let zone_no = zone.zone_no.as_deref().unwrap_or_default();
        match source.ward_count_by_zone(zone_no).await {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Ward count for zone {zone_no} unavailable: {e}");
                0
            }
        }
    }))
    .await;

    log::info!(
        "Summarized {} zone(s) and {} road(s)",
        zones.len(),
        roads.len()
    );
    Ok(summarize(&zones, &counts, &roads))
}

//! Road-name search.

use ward_map_records_models::Road;

/// Suggestions offered while typing.
pub const MAX_SUGGESTIONS: usize = 5;

fn matches(road: &Road, needle: &str) -> bool {
    road.road_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(needle))
}

/// Names of up to `limit` roads whose name contains `query`, ignoring
/// case. A blank query suggests nothing.
pub fn suggestions<'a>(
    roads: impl IntoIterator<Item = &'a Road>,
    query: &str,
    limit: usize,
) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    roads
        .into_iter()
        .filter(|road| matches(road, &needle))
        .filter_map(|road| road.road_name.as_deref())
        .take(limit)
        .collect()
}

/// The first road whose name contains `query`, ignoring case.
pub fn first_match<'a>(roads: impl IntoIterator<Item = &'a Road>, query: &str) -> Option<&'a Road> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    roads.into_iter().find(|road| matches(road, &needle))
}

//! Visibility rules for records under the current filter settings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ward_map_records_models::{FeatureTag, Record, RoadCondition};

use crate::{Feature, Selection};

/// View-side filter configuration. Never mutates records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Tags whose layers are shown. `multi-road` is the dedicated switch for
    /// multi-ward roads; `road` does not cover them.
    pub visible_tags: BTreeSet<FeatureTag>,
    /// Condition classes to show. Applies to road-tagged records only.
    pub condition_filter: BTreeSet<RoadCondition>,
    /// Exact carriage type to show, or `None` for all.
    pub carriage_type_filter: Option<String>,
    /// When set, only selected records are shown and every other rule is
    /// bypassed. Selection matches on tag and id together.
    pub only_selected: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            visible_tags: FeatureTag::all().iter().copied().collect(),
            condition_filter: RoadCondition::known().iter().copied().collect(),
            carriage_type_filter: None,
            only_selected: false,
        }
    }
}

impl FilterState {
    /// Flips visibility of a tag. Returns whether it is visible afterwards.
    pub fn toggle_tag(&mut self, tag: FeatureTag) -> bool {
        if self.visible_tags.remove(&tag) {
            false
        } else {
            self.visible_tags.insert(tag);
            true
        }
    }

    /// Flips a condition class. Returns whether it is shown afterwards.
    pub fn toggle_condition(&mut self, condition: RoadCondition) -> bool {
        if self.condition_filter.remove(&condition) {
            false
        } else {
            self.condition_filter.insert(condition);
            true
        }
    }

    /// Sets the carriage filter. Blank text means "all".
    pub fn set_carriage_type(&mut self, carriage: Option<&str>) {
        self.carriage_type_filter = carriage
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
    }

    /// The active carriage filter, if any.
    #[must_use]
    pub fn carriage_filter(&self) -> Option<&str> {
        self.carriage_type_filter
            .as_deref()
            .filter(|c| !c.is_empty())
    }
}

/// Decides whether a record with `tag` is part of the renderable set.
#[must_use]
pub fn is_visible(
    record: &Record,
    tag: FeatureTag,
    filter: &FilterState,
    selection: &Selection,
) -> bool {
    if filter.only_selected {
        return selection.contains(tag, record.id());
    }

    if !filter.visible_tags.contains(&tag) {
        return false;
    }

    if !tag.is_road() {
        return true;
    }

    let Some(road) = record.as_road() else {
        return true;
    };

    if !filter.condition_filter.contains(&road.condition_class()) {
        return false;
    }

    filter
        .carriage_filter()
        .is_none_or(|wanted| road.carriage_m.as_deref() == Some(wanted))
}

/// Iterates the features of `features` that pass [`is_visible`].
pub fn visible_features<'a, I>(
    features: I,
    filter: &'a FilterState,
    selection: &'a Selection,
) -> impl Iterator<Item = &'a Feature> + 'a
where
    I: IntoIterator<Item = &'a Feature>,
    I::IntoIter: 'a,
{
    features
        .into_iter()
        .filter(move |f| is_visible(&f.attributes, f.tag, filter, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ward_map_records_models::{FeatureId, Road, Ward, Zone};

    use crate::FeatureKey;

    fn road(gid: &str, condition: Option<&str>, carriage: Option<&str>) -> Record {
        Record::Road(Road {
            gid: FeatureId::from(gid),
            road_name: Some(format!("Road {gid}")),
            condition: condition.map(str::to_string),
            ownership: None,
            carriage_m: carriage.map(str::to_string),
            category: None,
            length_met: Some(100.0),
            row_meter: None,
            ward_no: Some("1".to_string()),
            ward_name: None,
            zone_no: Some("1".to_string()),
            zone_name: None,
            length_within_ward: None,
            wkt: None,
        })
    }

    fn zone(gid: &str) -> Record {
        Record::Zone(Zone {
            gid: FeatureId::from(gid),
            zone_no: Some("1".to_string()),
            zone_name: None,
            area_sq_km: None,
            wkt: None,
        })
    }

    fn record_for(tag: FeatureTag, gid: &str, condition: Option<&str>, carriage: Option<&str>) -> Record {
        match tag {
            FeatureTag::Zone => zone(gid),
            FeatureTag::Ward => ward(gid),
            FeatureTag::Road | FeatureTag::MultiRoad => road(gid, condition, carriage),
        }
    }

    fn ward(gid: &str) -> Record {
        Record::Ward(Ward {
            gid: FeatureId::from(gid),
            ward_no: Some("1".to_string()),
            ward_name: None,
            area: None,
            ward_exten: None,
            wkt: None,
        })
    }

    #[test]
    fn condition_filter_keeps_good_and_poor_roads() {
        let conditions = [
            "Good", "Good", "Good", "Moderate", "Moderate", "Moderate", "Moderate", "Poor",
            "Poor", "Poor",
        ];
        let records: Vec<Record> = conditions
            .iter()
            .enumerate()
            .map(|(i, c)| road(&format!("R{i}"), Some(c), None))
            .collect();

        let mut filter = FilterState::default();
        filter.condition_filter = [RoadCondition::Good, RoadCondition::Poor]
            .into_iter()
            .collect();
        let selection = Selection::new();

        let visible = records
            .iter()
            .filter(|r| is_visible(r, FeatureTag::Road, &filter, &selection))
            .count();
        assert_eq!(visible, 6);
    }

    #[test]
    fn wards_ignore_condition_and_carriage_rules() {
        let mut filter = FilterState::default();
        filter.condition_filter.clear();
        filter.set_carriage_type(Some("Single Carriageway"));
        assert!(is_visible(&ward("W1"), FeatureTag::Ward, &filter, &Selection::new()));
    }

    #[test]
    fn multi_roads_are_gated_by_their_own_tag() {
        let record = road("M1", Some("Good"), None);
        let selection = Selection::new();
        let mut filter = FilterState::default();

        filter.toggle_tag(FeatureTag::Road);
        assert!(is_visible(&record, FeatureTag::MultiRoad, &filter, &selection));

        filter.toggle_tag(FeatureTag::MultiRoad);
        assert!(!is_visible(&record, FeatureTag::MultiRoad, &filter, &selection));
    }

    #[test]
    fn carriage_filter_matches_exactly() {
        let selection = Selection::new();
        let mut filter = FilterState::default();
        filter.set_carriage_type(Some("Single Carriageway"));

        assert!(is_visible(
            &road("R1", Some("Good"), Some("Single Carriageway")),
            FeatureTag::Road,
            &filter,
            &selection
        ));
        assert!(!is_visible(
            &road("R2", Some("Good"), Some("single carriageway")),
            FeatureTag::Road,
            &filter,
            &selection
        ));
        assert!(!is_visible(
            &road("R3", Some("Good"), None),
            FeatureTag::Road,
            &filter,
            &selection
        ));

        filter.set_carriage_type(Some("  "));
        assert_eq!(filter.carriage_filter(), None);
    }

    #[test]
    fn unknown_condition_is_hidden_by_default() {
        let filter = FilterState::default();
        assert!(!is_visible(
            &road("R1", Some("Under construction"), None),
            FeatureTag::Road,
            &filter,
            &Selection::new()
        ));
    }

    #[test]
    fn only_selected_shows_selected_records_even_when_filtered_out() {
        let mut filter = FilterState::default();
        filter.visible_tags.clear();
        filter.condition_filter.clear();
        filter.only_selected = true;
        let selection: Selection = std::iter::once(FeatureKey::new(FeatureTag::Road, "R1")).collect();

        assert!(is_visible(&road("R1", Some("Poor"), None), FeatureTag::Road, &filter, &selection));
        assert!(!is_visible(&road("R2", Some("Poor"), None), FeatureTag::Road, &filter, &selection));
    }

    #[test]
    fn only_selected_ignores_same_gid_in_other_collections() {
        let filter = FilterState {
            only_selected: true,
            ..FilterState::default()
        };
        let selection = Selection::new().toggled(FeatureKey::new(FeatureTag::Road, "3"));

        assert!(is_visible(&road("3", Some("Good"), None), FeatureTag::Road, &filter, &selection));
        assert!(!is_visible(&ward("3"), FeatureTag::Ward, &filter, &selection));
        assert!(!is_visible(&zone("3"), FeatureTag::Zone, &filter, &selection));
        assert!(!is_visible(
            &road("3", Some("Good"), None),
            FeatureTag::MultiRoad,
            &filter,
            &selection
        ));
    }

    fn tag_strategy() -> impl Strategy<Value = FeatureTag> {
        prop::sample::select(FeatureTag::all().to_vec())
    }

    fn condition_strategy() -> impl Strategy<Value = Option<&'static str>> {
        prop::sample::select(vec![
            None,
            Some("Good"),
            Some("Moderate"),
            Some("Poor"),
            Some("Closed"),
        ])
    }

    fn carriage_strategy() -> impl Strategy<Value = Option<&'static str>> {
        prop::sample::select(vec![None, Some("Single Carriageway"), Some("Double Carriageway")])
    }

    proptest! {
        #[test]
        fn matches_truth_table(
            tag in tag_strategy(),
            condition in condition_strategy(),
            carriage in carriage_strategy(),
            wanted_carriage in carriage_strategy(),
            visible_tags in prop::sample::subsequence(FeatureTag::all().to_vec(), 0..=4),
            conditions in prop::sample::subsequence(RoadCondition::all().to_vec(), 0..=4),
            only_selected in any::<bool>(),
            gid in 0u8..4,
            selected in prop::collection::vec((tag_strategy(), 0u8..4), 0..6),
        ) {
            let gid = gid.to_string();
            let record = record_for(tag, &gid, condition, carriage);
            let filter = FilterState {
                visible_tags: visible_tags.iter().copied().collect(),
                condition_filter: conditions.iter().copied().collect(),
                carriage_type_filter: wanted_carriage.map(str::to_string),
                only_selected,
            };
            let selection: Selection = selected
                .iter()
                .map(|(t, id)| FeatureKey::new(*t, id.to_string()))
                .collect();
            let is_selected = selected
                .iter()
                .any(|(t, id)| *t == tag && id.to_string() == gid);

            let expected = if only_selected {
                is_selected
            } else if !visible_tags.contains(&tag) {
                false
            } else if tag.is_road() {
                let class = RoadCondition::classify(condition);
                conditions.contains(&class)
                    && wanted_carriage.is_none_or(|w| carriage == Some(w))
            } else {
                true
            };

            prop_assert_eq!(is_visible(&record, tag, &filter, &selection), expected);
        }
    }
}

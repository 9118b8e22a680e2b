//! The roads page: every zone, ward, road, and multi-ward road on one
//! map, with filtering, selection, and export.

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use ward_map_api::RecordSource;
use ward_map_export::{ExportError, ExportKind, ExportOutcome, export_to_dir};
use ward_map_geometry::Crs;
use ward_map_map::MountToken;
use ward_map_records_models::{FeatureId, FeatureTag};

use crate::{Arrival, Batch, DashboardConfig, DashboardError, MapSession};

const DATASETS: [FeatureTag; 4] = [
    FeatureTag::Zone,
    FeatureTag::Ward,
    FeatureTag::Road,
    FeatureTag::MultiRoad,
];

#[derive(Debug)]
pub struct RoadsView {
    session: MapSession,
}

impl RoadsView {
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            session: MapSession::new(config),
        }
    }

    #[must_use]
    pub const fn session(&self) -> &MapSession {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut MapSession {
        &mut self.session
    }

    /// Mounts the map and marks every dataset panel as loading.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] for an unregistered base map.
    pub fn mount(&mut self) -> Result<MountToken, DashboardError> {
        let token = self.session.mount()?;
        self.session.begin_loading(&DATASETS);
        Ok(token)
    }

    /// Fetches all four collections concurrently, applying each as it
    /// arrives. A failed collection only fails its own panel.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotMounted`] if nothing is mounted.
    pub async fn load(&mut self, source: &dyn RecordSource) -> Result<(), DashboardError> {
        let token = self.session.token().ok_or(DashboardError::NotMounted)?;
        let mut pending = fetch_all(source, |tag| self.session.source_crs(tag));
        while let Some(arrival) = pending.next().await {
            self.session.apply(token, arrival);
        }
        Ok(())
    }

    /// Leaves the page: selection is cleared and the surface released.
    pub fn leave(&mut self) {
        self.session.clear_selection();
        self.session.unmount();
    }

    /// Distinct non-empty carriage types of the loaded roads, in the order
    /// first seen.
    #[must_use]
    pub fn carriage_options(&self) -> Vec<String> {
        let mut options: Vec<String> = Vec::new();
        let carriages = self
            .session
            .dataset(FeatureTag::Road)
            .iter()
            .filter_map(|f| f.road())
            .filter_map(|r| r.carriage_m.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty());
        for carriage in carriages {
            if !options.iter().any(|o| o == carriage) {
                options.push(carriage.to_string());
            }
        }
        options
    }

    /// Writes the visible or selected roads to the configured directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the file cannot be written.
    pub fn export(&self, kind: ExportKind) -> Result<ExportOutcome, ExportError> {
        let features = match kind {
            ExportKind::Visible => self.session.visible_features(),
            ExportKind::Selected => self.session.selected_features(),
        };
        export_to_dir(kind, features, &self.session.config().export.directory)
    }

    /// The ward page to open for a road. Multi-ward roads go to the first
    /// ward in their list.
    #[must_use]
    pub fn ward_for_road(&self, id: &FeatureId) -> Option<String> {
        [FeatureTag::Road, FeatureTag::MultiRoad]
            .into_iter()
            .filter_map(|tag| self.session.find(tag, id))
            .find_map(|f| f.road()?.primary_ward_no().map(str::to_string))
    }
}

/// Starts one fetch per collection. The stream yields in completion
/// order.
fn fetch_all<'a>(
    source: &'a dyn RecordSource,
    crs: impl Fn(FeatureTag) -> Crs,
) -> FuturesUnordered<BoxFuture<'a, Arrival>> {
    let fetches: [BoxFuture<'a, Arrival>; 4] = [
        {
            let crs = crs(FeatureTag::Zone);
            async move {
                Arrival {
                    tag: FeatureTag::Zone,
                    source: crs,
                    result: source.fetch_zones().await.map(Batch::Zones),
                }
            }
            .boxed()
        },
        {
            let crs = crs(FeatureTag::Ward);
            async move {
                Arrival {
                    tag: FeatureTag::Ward,
                    source: crs,
                    result: source.fetch_wards().await.map(Batch::Wards),
                }
            }
            .boxed()
        },
        {
            let crs = crs(FeatureTag::Road);
            async move {
                Arrival {
                    tag: FeatureTag::Road,
                    source: crs,
                    result: source.fetch_roads().await.map(Batch::Roads),
                }
            }
            .boxed()
        },
        {
            let crs = crs(FeatureTag::MultiRoad);
            async move {
                Arrival {
                    tag: FeatureTag::MultiRoad,
                    source: crs,
                    result: source.fetch_multi_ward_roads().await.map(Batch::Roads),
                }
            }
            .boxed()
        },
    ];
    fetches.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PanelState;
    use crate::session::tests::{config, road, ward};
    use async_trait::async_trait;
    use ward_map_api::FetchError;
    use ward_map_map::{FilterState, LayerKind};
    use ward_map_records_models::{Road, RoadCondition, Ward, Zone};

    /// Serves fixed data; roads can be made to fail.
    struct StaticSource {
        wards: Vec<Ward>,
        roads: Vec<Road>,
        multi: Vec<Road>,
        roads_fail: bool,
    }

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn fetch_zones(&self) -> Result<Vec<Zone>, FetchError> {
            Ok(vec![
                Zone {
                    gid: FeatureId::from("Z1"),
                    zone_no: Some("1".to_string()),
                    zone_name: Some("North".to_string()),
                    area_sq_km: Some(10.0),
                    wkt: Some("POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0))".to_string()),
                },
                Zone {
                    gid: FeatureId::from("Z2"),
                    zone_no: Some("2".to_string()),
                    zone_name: Some("South".to_string()),
                    area_sq_km: Some(12.0),
                    wkt: Some("POLYGON ((0 -4, 4 -4, 4 0, 0 0, 0 -4))".to_string()),
                },
            ])
        }

        async fn fetch_wards(&self) -> Result<Vec<Ward>, FetchError> {
            Ok(self.wards.clone())
        }

        async fn fetch_roads(&self) -> Result<Vec<Road>, FetchError> {
            if self.roads_fail {
                return Err(FetchError::Status {
                    url: "http://localhost:8080/api/road/all".to_string(),
                    status: 503,
                });
            }
            Ok(self.roads.clone())
        }

        async fn fetch_multi_ward_roads(&self) -> Result<Vec<Road>, FetchError> {
            Ok(self.multi.clone())
        }

        async fn ward_count_by_zone(&self, _zone_no: &str) -> Result<u64, FetchError> {
            Ok(0)
        }

        async fn wards_by_zone(&self, _zone_no: &str) -> Result<Vec<Ward>, FetchError> {
            Ok(Vec::new())
        }

        async fn zone_by_no(&self, _zone_no: &str) -> Result<Option<Zone>, FetchError> {
            Ok(None)
        }

        async fn roads_by_ward(&self, _ward_no: &str) -> Result<Vec<Road>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn source(roads_fail: bool) -> StaticSource {
        let conditions = [
            "Good", "Good", "Good", "Moderate", "Moderate", "Moderate", "Moderate", "Poor", "Poor",
            "Poor",
        ];
        let roads = conditions
            .iter()
            .enumerate()
            .map(|(i, condition)| {
                let mut r = road(
                    &format!("R{i}"),
                    &format!("Road {i}"),
                    condition,
                    "1",
                    &format!("LINESTRING ({i} 1, {i} 2)"),
                );
                if i % 2 == 1 {
                    r.carriage_m = Some("Double".to_string());
                }
                r
            })
            .collect();
        StaticSource {
            wards: (1..=5)
                .map(|i| {
                    ward(
                        &format!("W{i}"),
                        &i.to_string(),
                        &format!("POLYGON (({i} 0, {i}.5 0, {i}.5 0.5, {i} 0.5, {i} 0))"),
                    )
                })
                .collect(),
            roads,
            multi: vec![road("M1", "Ring Road", "Good", "4, 2", "LINESTRING (0 3, 3 3)")],
            roads_fail,
        }
    }

    fn visible_road_count(view: &RoadsView) -> usize {
        view.session()
            .visible_features()
            .iter()
            .filter(|f| f.tag == FeatureTag::Road)
            .count()
    }

    #[tokio::test]
    async fn condition_filter_scenario() {
        let mut view = RoadsView::new(config());
        view.mount().unwrap();
        view.load(&source(false)).await.unwrap();

        assert_eq!(view.session().dataset(FeatureTag::Zone).len(), 2);
        assert_eq!(view.session().dataset(FeatureTag::Ward).len(), 5);
        assert_eq!(visible_road_count(&view), 10);

        view.session_mut().toggle_condition(RoadCondition::Moderate);
        assert_eq!(visible_road_count(&view), 6);
        let layer = view.session().surface().unwrap().layer(LayerKind::Road).unwrap();
        assert_eq!(layer.len(), 7);
    }

    #[tokio::test]
    async fn road_failure_leaves_wards_rendered() {
        let mut view = RoadsView::new(config());
        view.mount().unwrap();
        view.load(&source(true)).await.unwrap();

        let session = view.session();
        assert!(session.panel(FeatureTag::Road).unwrap().is_failed());
        assert_eq!(
            session.panel(FeatureTag::Ward),
            Some(&PanelState::Loaded { count: 5 })
        );
        let surface = session.surface().unwrap();
        assert_eq!(surface.layer(LayerKind::Ward).unwrap().len(), 5);
        assert_eq!(surface.layer(LayerKind::Road).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn load_without_mount_is_an_error() {
        let mut view = RoadsView::new(config());
        assert!(matches!(
            view.load(&source(false)).await,
            Err(DashboardError::NotMounted)
        ));
    }

    #[tokio::test]
    async fn late_results_after_leaving_are_ignored() {
        let data = source(false);
        let mut view = RoadsView::new(config());
        let token = view.mount().unwrap();
        let arrivals: Vec<Arrival> = fetch_all(&data, |_| Crs::Wgs84).collect().await;
        view.leave();

        for arrival in arrivals {
            assert!(!view.session_mut().apply(token, arrival));
        }
        assert_eq!(view.session().features().count(), 0);
    }

    #[tokio::test]
    async fn arrival_order_does_not_change_the_result() {
        let data = source(false);
        let mut arrivals: Vec<Arrival> = fetch_all(&data, |_| Crs::Wgs84).collect().await;

        let mut forward = RoadsView::new(config());
        let token = forward.mount().unwrap();
        let mut reverse = RoadsView::new(config());
        let reverse_token = reverse.mount().unwrap();

        let mut reversed: Vec<Arrival> = fetch_all(&data, |_| Crs::Wgs84).collect().await;
        reversed.sort_by_key(|a| std::cmp::Reverse(a.tag));
        arrivals.sort_by_key(|a| a.tag);

        for arrival in arrivals {
            forward.session_mut().apply(token, arrival);
        }
        for arrival in reversed {
            reverse.session_mut().apply(reverse_token, arrival);
        }

        for kind in LayerKind::FEATURE_LAYERS {
            let a = forward.session().surface().unwrap().layer(kind).unwrap();
            let b = reverse.session().surface().unwrap().layer(kind).unwrap();
            let keys_a: Vec<_> = a.iter().map(|(k, r)| (k.clone(), r.style)).collect();
            let keys_b: Vec<_> = b.iter().map(|(k, r)| (k.clone(), r.style)).collect();
            assert_eq!(keys_a, keys_b);
        }
    }

    #[tokio::test]
    async fn exports_visible_and_selected_roads() {
        let dir = std::env::temp_dir().join("ward_map_roads_view_export");
        let _ = std::fs::remove_dir_all(&dir);
        let mut config = config();
        config.export.directory.clone_from(&dir);

        let mut view = RoadsView::new(config);
        view.mount().unwrap();

        assert_eq!(
            view.export(ExportKind::Selected).unwrap(),
            ExportOutcome::NothingToExport
        );

        view.load(&source(false)).await.unwrap();
        view.session_mut().set_carriage_type(Some("Double"));
        let outcome = view.export(ExportKind::Visible).unwrap();
        assert_eq!(
            outcome,
            ExportOutcome::Written {
                path: dir.join("visible_roads.csv"),
                rows: 5,
            }
        );

        view.session_mut().set_carriage_type(None);
        view.session_mut().toggle_selection(&ward_map_map::FeatureKey {
            tag: FeatureTag::MultiRoad,
            id: FeatureId::from("M1"),
        });
        let outcome = view.export(ExportKind::Selected).unwrap();
        assert!(matches!(outcome, ExportOutcome::Written { rows: 1, .. }));
        let table = std::fs::read_to_string(dir.join("selected_roads.csv")).unwrap();
        assert!(table.contains("Multi-Ward"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn selected_export_keeps_roads_and_multi_roads_with_one_gid_apart() {
        let dir = std::env::temp_dir().join("ward_map_roads_view_shared_gid");
        let _ = std::fs::remove_dir_all(&dir);
        let mut config = config();
        config.export.directory.clone_from(&dir);

        let mut data = source(false);
        data.multi = vec![road("R1", "Ring Road", "Good", "4, 2", "LINESTRING (0 3, 3 3)")];
        let mut view = RoadsView::new(config);
        view.mount().unwrap();
        view.load(&data).await.unwrap();

        view.session_mut().toggle_selection(&ward_map_map::FeatureKey::new(FeatureTag::Road, "R1"));
        let outcome = view.export(ExportKind::Selected).unwrap();
        assert!(matches!(outcome, ExportOutcome::Written { rows: 1, .. }));
        let table = std::fs::read_to_string(dir.join("selected_roads.csv")).unwrap();
        assert!(table.contains("Road 1"));
        assert!(!table.contains("Multi-Ward"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn carriage_options_and_ward_navigation() {
        let mut view = RoadsView::new(config());
        view.mount().unwrap();
        view.load(&source(false)).await.unwrap();

        assert_eq!(view.carriage_options(), vec!["Single", "Double"]);
        assert_eq!(view.ward_for_road(&FeatureId::from("M1")), Some("4".to_string()));
        assert_eq!(view.ward_for_road(&FeatureId::from("R3")), Some("1".to_string()));
        assert_eq!(view.ward_for_road(&FeatureId::from("nope")), None);
        assert_eq!(view.session().filter(), &FilterState::default());
    }
}

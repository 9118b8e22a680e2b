//! The zone page: one zone outline with its wards.

use ward_map_api::{FetchError, RecordSource};
use ward_map_map::{FeatureKey, FitOptions, MountToken};
use ward_map_records_models::{FeatureTag, Ward, Zone};

use crate::{
    Arrival, Batch, DashboardConfig, DashboardError, MapSession, PanelState, SidebarContext,
};

const ZONE_FIT: FitOptions = FitOptions::new(50.0, 16.0);

/// What one zone-page load fetched, waiting to be applied.
#[derive(Debug)]
pub struct ZoneFetch {
    pub zone: Result<Option<Zone>, FetchError>,
    pub wards: Result<Vec<Ward>, FetchError>,
}

/// Fetches a zone and its wards concurrently. Holds no borrow of the
/// view, so the page can be left while this is pending.
pub async fn fetch_zone(source: &dyn RecordSource, zone_no: &str) -> ZoneFetch {
    let (zone, wards) = futures::join!(source.zone_by_no(zone_no), source.wards_by_zone(zone_no));
    ZoneFetch { zone, wards }
}

#[derive(Debug)]
pub struct ZoneView {
    session: MapSession,
    zone_no: String,
    zone: Option<Zone>,
}

impl ZoneView {
    #[must_use]
    pub fn new(config: DashboardConfig, zone_no: impl Into<String>) -> Self {
        Self {
            session: MapSession::new(config),
            zone_no: zone_no.into(),
            zone: None,
        }
    }

    #[must_use]
    pub fn zone_no(&self) -> &str {
        &self.zone_no
    }

    /// The zone record, once loaded.
    #[must_use]
    pub const fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    #[must_use]
    pub const fn session(&self) -> &MapSession {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut MapSession {
        &mut self.session
    }

    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] for an unregistered base map.
    pub fn mount(&mut self) -> Result<MountToken, DashboardError> {
        let token = self.session.mount()?;
        self.session
            .begin_loading(&[FeatureTag::Zone, FeatureTag::Ward]);
        Ok(token)
    }

    /// Loads the zone and its wards concurrently. The wards are published
    /// to `sidebar`; the view fits the zone outline once it is drawn.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotMounted`] if nothing is mounted.
    pub async fn load(
        &mut self,
        source: &dyn RecordSource,
        sidebar: &mut SidebarContext,
    ) -> Result<(), DashboardError> {
        let token = self.session.token().ok_or(DashboardError::NotMounted)?;
        sidebar.begin_loading_wards(&self.zone_no);
        let fetched = fetch_zone(source, &self.zone_no).await;
        self.apply(token, fetched, sidebar);
        Ok(())
    }

    /// Applies a finished [`fetch_zone`] to the page mounted as `token`.
    /// Returns `false`, touching neither the session nor `sidebar`, when
    /// that mount has since been left.
    pub fn apply(
        &mut self,
        token: MountToken,
        fetched: ZoneFetch,
        sidebar: &mut SidebarContext,
    ) -> bool {
        if !self.session.is_live(token) {
            log::debug!("Discarding late data for zone {}", self.zone_no);
            return false;
        }

        let zones_crs = self.session.source_crs(FeatureTag::Zone);
        match fetched.zone {
            Ok(Some(zone)) => {
                self.session.apply(
                    token,
                    Arrival {
                        tag: FeatureTag::Zone,
                        source: zones_crs,
                        result: Ok(Batch::Zones(vec![zone.clone()])),
                    },
                );
                let key = FeatureKey::new(FeatureTag::Zone, zone.gid.clone());
                if !self.session.fit_feature(&key, ZONE_FIT) {
                    log::warn!("Zone {} has no drawable outline", self.zone_no);
                }
                self.zone = Some(zone);
            }
            Ok(None) => {
                log::warn!("No data for zone {}", self.zone_no);
                self.session.set_panel(
                    FeatureTag::Zone,
                    PanelState::Failed("No zone data found".to_string()),
                );
            }
            Err(e) => {
                self.session.apply(
                    token,
                    Arrival {
                        tag: FeatureTag::Zone,
                        source: zones_crs,
                        result: Err(e),
                    },
                );
            }
        }

        let wards_crs = self.session.source_crs(FeatureTag::Ward);
        let wards = match fetched.wards {
            Ok(wards) => {
                sidebar.set_zone_wards(&self.zone_no, wards.clone());
                Ok(Batch::Wards(wards))
            }
            Err(e) => {
                sidebar.set_zone_wards(&self.zone_no, Vec::new());
                Err(e)
            }
        };
        self.session.apply(
            token,
            Arrival {
                tag: FeatureTag::Ward,
                source: wards_crs,
                result: wards,
            },
        );
        true
    }

    /// Leaves the page, releasing the surface and the sidebar's zone data.
    pub fn leave(&mut self, sidebar: &mut SidebarContext) {
        self.session.clear_selection();
        self.session.unmount();
        sidebar.clear_ward_data();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{config, ward};
    use ward_map_api::FixtureRecordSource;
    use ward_map_records_models::FeatureId;

    fn write_fixtures(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let zones = serde_json::json!([{
            "gid": 1,
            "zoneNo": "3",
            "zoneName": "East",
            "areaSqKm": 4.0,
            "wkt": "\"POLYGON ((10 10, 12 10, 12 12, 10 12, 10 10))\""
        }]);
        let roads = serde_json::json!([{
            "gid": 7,
            "roadName": "Canal Road",
            "wardNo": "31",
            "zoneNo": "3",
            "wkt": "LINESTRING (10.5 10.5, 11 11)"
        }]);
        let wards = vec![
            ward("W31", "31", "POLYGON ((10 10, 11 10, 11 11, 10 11, 10 10))"),
            ward("W99", "99", "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))"),
        ];
        std::fs::write(dir.join("zones.json"), zones.to_string()).unwrap();
        std::fs::write(dir.join("roads.json"), roads.to_string()).unwrap();
        std::fs::write(
            dir.join("wards.json"),
            serde_json::to_string(&wards).unwrap(),
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn loads_zone_and_publishes_wards() {
        let dir = write_fixtures("ward_map_zone_view_load");
        let source = FixtureRecordSource::new(&dir);
        let mut sidebar = SidebarContext::new();
        let mut view = ZoneView::new(config(), "3");
        view.mount().unwrap();

        view.load(&source, &mut sidebar).await.unwrap();

        assert_eq!(view.zone().map(|z| z.gid.clone()), Some(FeatureId::from("1")));
        assert_eq!(sidebar.current_zone_no.as_deref(), Some("3"));
        assert!(!sidebar.is_loading_wards);
        assert_eq!(sidebar.current_zone_wards.len(), 1);
        assert_eq!(
            view.session().panel(FeatureTag::Ward),
            Some(&PanelState::Loaded { count: 1 })
        );

        let center = view.session().surface().unwrap().view().center();
        assert!((center.x - 11.0).abs() < 1e-9);
        assert!((center.y - 11.0).abs() < 1e-9);

        view.leave(&mut sidebar);
        assert_eq!(sidebar.current_zone_no, None);
        assert!(view.session().surface().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_zone_fails_only_its_panel() {
        let dir = write_fixtures("ward_map_zone_view_missing");
        let source = FixtureRecordSource::new(&dir);
        let mut sidebar = SidebarContext::new();
        let mut view = ZoneView::new(config(), "8");
        view.mount().unwrap();

        view.load(&source, &mut sidebar).await.unwrap();

        assert_eq!(
            view.session().panel(FeatureTag::Zone).and_then(PanelState::error),
            Some("No zone data found")
        );
        assert_eq!(
            view.session().panel(FeatureTag::Ward),
            Some(&PanelState::Loaded { count: 0 })
        );
        assert_eq!(sidebar.current_zone_no.as_deref(), Some("8"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn fetch_finishing_after_leave_is_discarded() {
        let dir = write_fixtures("ward_map_zone_view_left");
        let source = FixtureRecordSource::new(&dir);
        let mut sidebar = SidebarContext::new();
        let mut view = ZoneView::new(config(), "3");
        let token = view.mount().unwrap();
        sidebar.begin_loading_wards("3");

        let fetched = fetch_zone(&source, "3").await;
        view.leave(&mut sidebar);

        assert!(!view.apply(token, fetched, &mut sidebar));
        assert!(view.zone().is_none());
        assert!(view.session().dataset(FeatureTag::Zone).is_empty());
        assert!(view.session().dataset(FeatureTag::Ward).is_empty());
        assert_eq!(sidebar.current_zone_no, None);
        assert!(sidebar.current_zone_wards.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn fetch_from_an_earlier_mount_does_not_reach_a_remount() {
        let dir = write_fixtures("ward_map_zone_view_remount");
        let source = FixtureRecordSource::new(&dir);
        let mut sidebar = SidebarContext::new();
        let mut view = ZoneView::new(config(), "3");
        let first = view.mount().unwrap();
        let fetched = fetch_zone(&source, "3").await;

        view.leave(&mut sidebar);
        let second = view.mount().unwrap();
        assert_ne!(first, second);

        assert!(!view.apply(first, fetched, &mut sidebar));
        assert_eq!(view.session().panel(FeatureTag::Zone), Some(&PanelState::Loading));
        assert!(view.session().dataset(FeatureTag::Ward).is_empty());

        let fetched = fetch_zone(&source, "3").await;
        assert!(view.apply(second, fetched, &mut sidebar));
        assert_eq!(view.session().dataset(FeatureTag::Zone).len(), 1);
        assert_eq!(sidebar.current_zone_wards.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

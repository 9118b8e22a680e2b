//! The ward page: one ward's roads over the ward and zone outlines, with
//! road-name search.

use ward_map_api::{FetchError, RecordSource};
use ward_map_map::{Feature, FeatureKey, FitOptions, MountToken};
use ward_map_records_models::{FeatureId, FeatureTag, Road, Ward, Zone};

use crate::search::{self, MAX_SUGGESTIONS};
use crate::{Arrival, Batch, DashboardConfig, DashboardError, MapSession, PanelState};

const SEARCH_FIT: FitOptions = FitOptions::new(100.0, 17.0);

/// What one ward-page load fetched, waiting to be applied.
#[derive(Debug)]
pub struct WardFetch {
    pub roads: Result<Vec<Road>, FetchError>,
    pub wards: Result<Vec<Ward>, FetchError>,
    pub zones: Result<Vec<Zone>, FetchError>,
}

/// Fetches a ward's roads with every ward and zone concurrently. Holds
/// no borrow of the view, so the page can be left while this is pending.
pub async fn fetch_ward(source: &dyn RecordSource, ward_no: &str) -> WardFetch {
    let (roads, wards, zones) = futures::join!(
        source.roads_by_ward(ward_no),
        source.fetch_wards(),
        source.fetch_zones()
    );
    WardFetch {
        roads,
        wards,
        zones,
    }
}

#[derive(Debug)]
pub struct WardView {
    session: MapSession,
    ward_no: String,
}

impl WardView {
    #[must_use]
    pub fn new(config: DashboardConfig, ward_no: impl Into<String>) -> Self {
        Self {
            session: MapSession::new(config),
            ward_no: ward_no.into(),
        }
    }

    #[must_use]
    pub fn ward_no(&self) -> &str {
        &self.ward_no
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
        self.session.begin_loading(&[
            FeatureTag::Zone,
            FeatureTag::Ward,
            FeatureTag::Road,
            FeatureTag::MultiRoad,
        ]);
        Ok(token)
    }

    /// Loads the ward's roads, the ward outline, and the zone outlines
    /// concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotMounted`] if nothing is mounted.
    pub async fn load(&mut self, source: &dyn RecordSource) -> Result<(), DashboardError> {
        let token = self.session.token().ok_or(DashboardError::NotMounted)?;
        let fetched = fetch_ward(source, &self.ward_no).await;
        self.apply(token, fetched);
        Ok(())
    }

    /// Applies a finished [`fetch_ward`] to the page mounted as `token`,
    /// or returns `false` without touching the session when that mount
    /// has since been left.
    ///
    /// Roads that span several wards go to the multi-road dataset. The
    /// per-ward road lookup answers in its own CRS, taken from
    /// `projection.ward_roads`.
    pub fn apply(&mut self, token: MountToken, fetched: WardFetch) -> bool {
        if !self.session.is_live(token) {
            log::debug!("Discarding late data for ward {}", self.ward_no);
            return false;
        }

        let ward_no = self.ward_no.as_str();
        let wards: Result<Vec<Ward>, _> = fetched.wards.map(|wards| {
            wards
                .into_iter()
                .filter(|w| w.ward_no.as_deref() == Some(ward_no))
                .collect()
        });
        let wards_crs = self.session.source_crs(FeatureTag::Ward);
        let zones_crs = self.session.source_crs(FeatureTag::Zone);
        self.session.apply(
            token,
            Arrival {
                tag: FeatureTag::Ward,
                source: wards_crs,
                result: wards.map(Batch::Wards),
            },
        );
        self.session.apply(
            token,
            Arrival {
                tag: FeatureTag::Zone,
                source: zones_crs,
                result: fetched.zones.map(Batch::Zones),
            },
        );

        let crs = self.session.config().projection.ward_roads;
        match fetched.roads {
            Ok(roads) => {
                let (multi, single): (Vec<Road>, Vec<Road>) =
                    roads.into_iter().partition(Road::is_multi_ward);
                for (tag, roads) in [(FeatureTag::Road, single), (FeatureTag::MultiRoad, multi)] {
                    self.session.apply(
                        token,
                        Arrival {
                            tag,
                            source: crs,
                            result: Ok(Batch::Roads(roads)),
                        },
                    );
                }
            }
            Err(e) => {
                log::error!("Failed to fetch roads for ward {}: {e}", self.ward_no);
                let message = e.to_string();
                self.session
                    .set_panel(FeatureTag::Road, PanelState::Failed(message.clone()));
                self.session
                    .set_panel(FeatureTag::MultiRoad, PanelState::Failed(message));
            }
        }
        true
    }

    fn roads(&self) -> impl Iterator<Item = &Road> {
        self.session.road_features().filter_map(|f| f.road())
    }

    /// Road names to suggest for a partial query.
    #[must_use]
    pub fn suggestions(&self, query: &str) -> Vec<String> {
        search::suggestions(self.roads(), query, MAX_SUGGESTIONS)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Emphasises the first visible road matching `query` and fits the view
    /// to it. A query with no match clears the emphasis.
    pub fn search(&mut self, query: &str) -> Option<FeatureId> {
        let Some(key) = self.find_visible_road(query) else {
            self.session.highlight(None);
            return None;
        };
        log::debug!("Search '{query}' matched {} {}", key.tag, key.id);
        self.session.highlight(Some(key.clone()));
        self.session.fit_feature(&key, SEARCH_FIT);
        Some(key.id)
    }

    fn find_visible_road(&self, query: &str) -> Option<FeatureKey> {
        let roads: Vec<&Feature> = self
            .session
            .visible_features()
            .into_iter()
            .filter(|f| f.tag.is_road())
            .collect();
        let found = search::first_match(roads.iter().filter_map(|f| f.road()), query)?;
        roads.iter().find(|f| f.id == found.gid).map(|f| f.key())
    }

    pub fn clear_search(&mut self) {
        self.session.highlight(None);
    }

    /// Leaves the page, releasing the surface.
    pub fn leave(&mut self) {
        self.session.clear_selection();
        self.session.unmount();
    }
}

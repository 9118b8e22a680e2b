//! State owned by one dashboard view.
//!
//! A [`MapSession`] holds the loaded datasets, filter, selection, and
//! style context for a page, and the slot for its one live map surface.
//! The surface only ever sees this state through [`Scene`]s; events it
//! emits are applied here and followed by a resync.

use std::collections::BTreeMap;
use std::sync::Arc;

use geo::{Coord, Rect, coord};
use ward_map_api::FetchError;
use ward_map_geometry::Crs;
use ward_map_map::filter::visible_features;
use ward_map_map::{
    Feature, FeatureBuilder, FeatureKey, FilterState, FitOptions, LayerKind, MapSurface,
    MeasureMode, MountToken, RenderReport, Scene, Selection, StyleContext, SurfaceEvent,
    SurfaceSlot, Tooltip, basemap, snapshot,
};
use ward_map_records_models::{FeatureId, FeatureTag, Road, RoadCondition, SourceRecord, Ward, Zone};

use crate::{DashboardConfig, DashboardError, PanelState};

/// Records from one upstream collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    Zones(Vec<Zone>),
    Wards(Vec<Ward>),
    Roads(Vec<Road>),
}

impl Batch {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Zones(zones) => zones.len(),
            Self::Wards(wards) => wards.len(),
            Self::Roads(roads) => roads.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outcome of one fetch, addressed to the dataset for `tag`.
#[derive(Debug)]
pub struct Arrival {
    pub tag: FeatureTag,
    /// CRS the batch's geometry is written in.
    pub source: Crs,
    pub result: Result<Batch, FetchError>,
}

#[derive(Debug)]
pub struct MapSession {
    config: DashboardConfig,
    builder: FeatureBuilder,
    slot: SurfaceSlot,
    datasets: BTreeMap<FeatureTag, Vec<Arc<Feature>>>,
    panels: BTreeMap<FeatureTag, PanelState>,
    filter: FilterState,
    selection: Selection,
    style: StyleContext,
}

impl MapSession {
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            builder: FeatureBuilder::new(config.projection.working),
            config,
            slot: SurfaceSlot::new(),
            datasets: BTreeMap::new(),
            panels: BTreeMap::new(),
            filter: FilterState::default(),
            selection: Selection::new(),
            style: StyleContext::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Creates the map surface, replacing any existing one, and draws
    /// whatever is already loaded.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if the configured base map is
    /// not registered.
    pub fn mount(&mut self) -> Result<MountToken, DashboardError> {
        let options = self.config.surface_options()?;
        let token = self.slot.mount(options);
        self.resync();
        Ok(token)
    }

    pub fn unmount(&mut self) {
        self.slot.unmount();
    }

    #[must_use]
    pub fn token(&self) -> Option<MountToken> {
        self.slot.current_token()
    }

    #[must_use]
    pub fn is_live(&self, token: MountToken) -> bool {
        self.slot.is_live(token)
    }

    #[must_use]
    pub const fn surface(&self) -> Option<&MapSurface> {
        self.slot.surface()
    }

    /// Source CRS of the collection behind `tag` on the main pages.
    #[must_use]
    pub const fn source_crs(&self, tag: FeatureTag) -> Crs {
        let projection = &self.config.projection;
        match tag {
            FeatureTag::Zone => projection.zones,
            FeatureTag::Ward => projection.wards,
            FeatureTag::Road | FeatureTag::MultiRoad => projection.roads,
        }
    }

    /// Marks the panels for `tags` as loading.
    pub fn begin_loading(&mut self, tags: &[FeatureTag]) {
        for tag in tags {
            self.panels.insert(*tag, PanelState::Loading);
        }
    }

    #[must_use]
    pub fn panel(&self, tag: FeatureTag) -> Option<&PanelState> {
        self.panels.get(&tag)
    }

    pub fn set_panel(&mut self, tag: FeatureTag, state: PanelState) {
        self.panels.insert(tag, state);
    }

    /// Applies a fetch result requested under `token`.
    ///
    /// Results for a mount that is no longer live are dropped before any
    /// state is touched. Returns whether the arrival was applied.
    pub fn apply(&mut self, token: MountToken, arrival: Arrival) -> bool {
        if !self.is_live(token) {
            log::debug!("Discarding late {} result for a torn-down map", arrival.tag);
            return false;
        }

        let state = match arrival.result {
            Ok(batch) => {
                let count = match &batch {
                    Batch::Zones(zones) => self.ingest(arrival.tag, zones, arrival.source),
                    Batch::Wards(wards) => self.ingest(arrival.tag, wards, arrival.source),
                    Batch::Roads(roads) => self.ingest(arrival.tag, roads, arrival.source),
                };
                log::debug!("Built {count} of {} {} feature(s)", batch.len(), arrival.tag);
                PanelState::Loaded { count }
            }
            Err(e) => {
                log::error!("Failed to fetch {} data: {e}", arrival.tag);
                PanelState::Failed(e.to_string())
            }
        };
        self.panels.insert(arrival.tag, state);
        true
    }

    /// Builds features for `records` and replaces the dataset for `tag`.
    /// Records that fail to decode are dropped. Returns the number of
    /// features built.
    pub fn ingest<R: SourceRecord>(&mut self, tag: FeatureTag, records: &[R], source: Crs) -> usize {
        let features: Vec<Arc<Feature>> = self
            .builder
            .build_all(records, tag, source)
            .map(Arc::new)
            .collect();
        let count = features.len();
        self.datasets.insert(tag, features);
        self.resync();
        count
    }

    #[must_use]
    pub fn dataset(&self, tag: FeatureTag) -> &[Arc<Feature>] {
        self.datasets.get(&tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every loaded feature, zones first.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.datasets.values().flatten().map(|f| &**f)
    }

    /// Road and multi-road features.
    pub fn road_features(&self) -> impl Iterator<Item = &Feature> {
        self.features().filter(|f| f.tag.is_road())
    }

    /// Loaded features that pass the current filter.
    #[must_use]
    pub fn visible_features(&self) -> Vec<&Feature> {
        visible_features(self.features(), &self.filter, &self.selection).collect()
    }

    /// Selected road features, in selection order. Keys with no loaded
    /// feature are skipped.
    #[must_use]
    pub fn selected_features(&self) -> Vec<&Feature> {
        self.selection
            .iter()
            .filter(|key| key.tag.is_road())
            .filter_map(|key| self.find(key.tag, &key.id))
            .collect()
    }

    #[must_use]
    pub fn find(&self, tag: FeatureTag, id: &FeatureId) -> Option<&Feature> {
        self.dataset(tag)
            .iter()
            .map(|f| &**f)
            .find(|f| &f.id == id)
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn style_context(&self) -> &StyleContext {
        &self.style
    }

    pub fn toggle_tag(&mut self, tag: FeatureTag) -> bool {
        let visible = self.filter.toggle_tag(tag);
        self.resync();
        visible
    }

    pub fn toggle_condition(&mut self, condition: RoadCondition) -> bool {
        let visible = self.filter.toggle_condition(condition);
        self.resync();
        visible
    }

    /// Replaces the set of condition classes shown.
    pub fn set_conditions(&mut self, conditions: impl IntoIterator<Item = RoadCondition>) {
        self.filter.condition_filter = conditions.into_iter().collect();
        self.resync();
    }

    /// Sets the carriage filter. While one is active multi-ward roads are
    /// colored by carriage type.
    pub fn set_carriage_type(&mut self, carriage: Option<&str>) {
        self.filter.set_carriage_type(carriage);
        self.style.carriage_palette = self.filter.carriage_filter().is_some();
        self.resync();
    }

    pub fn set_only_selected(&mut self, only_selected: bool) {
        self.filter.only_selected = only_selected;
        self.resync();
    }

    /// Flips selection of a road. A newly selected road that is rendered
    /// becomes the fit target. Returns whether it is selected afterwards.
    pub fn toggle_selection(&mut self, key: &FeatureKey) -> bool {
        let selected = self.selection.toggle(key.clone());
        self.resync();
        if selected {
            let fit = self.config.selection_fit();
            if let Some(surface) = self.slot.surface_mut() {
                surface.fit_feature(key, fit);
            }
        }
        selected
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.resync();
    }

    /// Replaces the focused ward.
    pub fn focus_ward(&mut self, id: Option<FeatureId>) {
        self.style.focused_ward = id;
        self.resync();
    }

    /// Sets the road emphasised by search.
    pub fn highlight(&mut self, key: Option<FeatureKey>) {
        self.style.highlighted = key;
        self.resync();
    }

    /// Routes a click and applies the resulting event.
    pub fn click(&mut self, pixel: Coord<f64>) -> Option<SurfaceEvent> {
        let event = self.slot.surface_mut()?.on_click(pixel)?;
        self.handle(&event);
        Some(event)
    }

    pub fn double_click(&mut self, pixel: Coord<f64>) -> Option<SurfaceEvent> {
        let event = self.slot.surface_mut()?.on_double_click(pixel)?;
        self.handle(&event);
        Some(event)
    }

    pub fn pointer_move(&mut self, pixel: Coord<f64>, dragging: bool) -> Option<Tooltip> {
        self.slot
            .surface_mut()?
            .on_pointer_move(pixel, dragging)
            .cloned()
    }

    fn handle(&mut self, event: &SurfaceEvent) {
        match event {
            SurfaceEvent::WardFocused(id) => self.focus_ward(Some(id.clone())),
            SurfaceEvent::RoadToggled { id, tag } => {
                self.toggle_selection(&FeatureKey {
                    tag: *tag,
                    id: id.clone(),
                });
            }
            SurfaceEvent::ZoneClicked(id) => log::debug!("Zone {id} clicked"),
            SurfaceEvent::MeasurementCompleted(measurement) => {
                log::debug!("Measurement completed: {measurement}");
            }
        }
    }

    pub fn set_measure_mode(&mut self, mode: MeasureMode) {
        if let Some(surface) = self.slot.surface_mut() {
            surface.set_measure_mode(mode);
        }
    }

    /// Switches the base-map provider, rebuilding the surface and
    /// redrawing its layers. Returns whether a rebuild happened.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::BaseMap`] for an unknown provider id and
    /// [`DashboardError::NotMounted`] without a live surface.
    pub fn set_base_map(&mut self, id: &str) -> Result<bool, DashboardError> {
        let provider = basemap::provider(id)?;
        let surface = self.slot.surface_mut().ok_or(DashboardError::NotMounted)?;
        let rebuilt = surface.set_base_map(provider);
        if rebuilt {
            self.config.map.base_map = id.to_string();
            self.resync();
        }
        Ok(rebuilt)
    }

    pub fn set_layer_visible(&mut self, kind: LayerKind, visible: bool) {
        if let Some(surface) = self.slot.surface_mut() {
            surface.set_layer_visible(kind, visible);
        }
    }

    pub fn fit_extent(&mut self, extent: Rect<f64>, options: FitOptions) {
        if let Some(surface) = self.slot.surface_mut() {
            surface.fit_extent(extent, options);
        }
    }

    /// Fits the view to a rendered feature. Returns `false` if it is not
    /// rendered or nothing is mounted.
    pub fn fit_feature(&mut self, key: &FeatureKey, options: FitOptions) -> bool {
        self.slot
            .surface_mut()
            .is_some_and(|surface| surface.fit_feature(key, options))
    }

    /// Fits the view to the combined extent of every visible feature.
    /// Returns `false` when nothing visible has an extent.
    pub fn fit_visible(&mut self, options: FitOptions) -> bool {
        let extent = self
            .visible_features()
            .iter()
            .filter_map(|f| f.extent())
            .reduce(|a, b| {
                Rect::new(
                    coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            });
        let Some(extent) = extent else {
            return false;
        };
        self.fit_extent(extent, options);
        self.slot.is_mounted()
    }

    /// Renders the current view to SVG.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotMounted`] without a live surface.
    pub fn snapshot(&self) -> Result<String, DashboardError> {
        self.slot
            .surface()
            .map(snapshot::render_svg)
            .ok_or(DashboardError::NotMounted)
    }

    /// Re-renders the live surface from the current state.
    pub fn resync(&mut self) -> Option<RenderReport> {
        let surface = self.slot.surface_mut()?;
        let datasets: Vec<&[Arc<Feature>]> = self.datasets.values().map(Vec::as_slice).collect();
        let report = surface.sync(&Scene {
            datasets: &datasets,
            filter: &self.filter,
            selection: &self.selection,
            style: &self.style,
        });
        let changed: Vec<String> = report.changed_layers().map(|k| k.to_string()).collect();
        if !changed.is_empty() {
            log::debug!("Re-rendered layers: {}", changed.join(", "));
        }
        Some(report)
    }
}

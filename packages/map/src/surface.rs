//! The map surface: layers, view, pointer routing, and measurement.
//!
//! A surface never changes filter or selection state. Clicks and
//! completed measurements come back as [`SurfaceEvent`]s; the owner
//! applies them and calls [`MapSurface::sync`] with the new state.

use std::collections::BTreeMap;
use std::sync::Arc;

use geo::{Coord, Geometry, Rect, coord};
use ward_map_geometry::{Measurement, measure};
use ward_map_records_models::{FeatureId, FeatureTag};

use crate::filter::is_visible;
use crate::interaction::Sketch;
use crate::layer::VectorLayer;
use crate::{
    BaseMapProvider, Feature, FeatureKey, FilterState, FitOptions, LayerDiff, LayerKind,
    MeasureMode, RenderedFeature, Selection, StyleContext, View, Viewport, style_for,
};

/// Construction parameters for a [`MapSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    pub viewport: Viewport,
    pub view: View,
    pub base_map: BaseMapProvider,
    /// Pointer hit radius in pixels.
    pub hit_tolerance_px: f64,
}

/// Everything a sync needs: loaded features plus the owner's state.
///
/// Datasets may be empty; a dataset that has not arrived yet simply
/// contributes nothing.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub datasets: &'a [&'a [Arc<Feature>]],
    pub filter: &'a FilterState,
    pub selection: &'a Selection,
    pub style: &'a StyleContext,
}

/// Something the owner should act on.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// A ward was clicked; it should become the focused ward.
    WardFocused(FeatureId),
    /// A road or multi-road was clicked; its selection should flip.
    RoadToggled { id: FeatureId, tag: FeatureTag },
    /// A zone outline was clicked.
    ZoneClicked(FeatureId),
    /// A measurement shape was completed.
    MeasurementCompleted(Measurement),
}

/// The single tooltip shown on hover.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub feature: FeatureKey,
    pub text: String,
    /// Pixel position of the pointer.
    pub position: Coord<f64>,
}

/// Per-layer changes applied by one sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub diffs: BTreeMap<LayerKind, LayerDiff>,
}

impl RenderReport {
    /// Layers that actually changed.
    pub fn changed_layers(&self) -> impl Iterator<Item = LayerKind> + '_ {
        self.diffs
            .iter()
            .filter(|(_, diff)| !diff.is_empty())
            .map(|(kind, _)| *kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diffs.values().all(LayerDiff::is_empty)
    }
}

#[derive(Debug)]
pub struct MapSurface {
    viewport: Viewport,
    view: View,
    base_map: BaseMapProvider,
    base_visible: bool,
    measurement_visible: bool,
    hit_tolerance_px: f64,
    layers: BTreeMap<LayerKind, VectorLayer>,
    tooltip: Option<Tooltip>,
    sketch: Sketch,
    build_count: u32,
    alive: bool,
}

impl MapSurface {
    #[must_use]
    pub fn new(options: SurfaceOptions) -> Self {
        log::debug!(
            "Creating map surface {}x{} on base map {}",
            options.viewport.width,
            options.viewport.height,
            options.base_map.id
        );
        Self {
            viewport: options.viewport,
            view: options.view,
            base_map: options.base_map,
            base_visible: true,
            measurement_visible: true,
            hit_tolerance_px: options.hit_tolerance_px.max(0.0),
            layers: empty_layers(),
            tooltip: None,
            sketch: Sketch::default(),
            build_count: 1,
            alive: true,
        }
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Releases the surface. Later calls are ignored.
    pub fn teardown(&mut self) {
        if !self.alive {
            return;
        }
        log::debug!("Tearing down map surface");
        self.alive = false;
        for layer in self.layers.values_mut() {
            layer.clear();
        }
        self.tooltip = None;
        self.sketch = Sketch::default();
    }

    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn base_map(&self) -> &BaseMapProvider {
        &self.base_map
    }

    /// How many times the surface has been built from scratch.
    #[must_use]
    pub const fn build_count(&self) -> u32 {
        self.build_count
    }

    #[must_use]
    pub fn layer(&self, kind: LayerKind) -> Option<&VectorLayer> {
        self.layers.get(&kind)
    }

    #[must_use]
    pub const fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    #[must_use]
    pub const fn measure_mode(&self) -> MeasureMode {
        self.sketch.mode()
    }

    #[must_use]
    pub const fn sketch(&self) -> &Sketch {
        &self.sketch
    }

    #[must_use]
    pub fn is_layer_visible(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::Base => self.base_visible,
            LayerKind::Measurement => self.measurement_visible,
            _ => self.layers.get(&kind).is_some_and(VectorLayer::is_visible),
        }
    }

    pub fn set_layer_visible(&mut self, kind: LayerKind, visible: bool) {
        match kind {
            LayerKind::Base => self.base_visible = visible,
            LayerKind::Measurement => self.measurement_visible = visible,
            _ => {
                if let Some(layer) = self.layers.get_mut(&kind) {
                    layer.set_visible(visible);
                }
            }
        }
        if !visible {
            self.tooltip = self
                .tooltip
                .take()
                .filter(|t| LayerKind::for_tag(t.feature.tag) != kind);
        }
    }

    /// Renders `scene`, touching only layers whose desired content
    /// differs from what they hold. The view is never changed here.
    pub fn sync(&mut self, scene: &Scene<'_>) -> RenderReport {
        if !self.alive {
            log::debug!("Ignoring sync on a torn-down surface");
            return RenderReport::default();
        }

        let mut desired: BTreeMap<LayerKind, BTreeMap<FeatureKey, RenderedFeature>> =
            LayerKind::FEATURE_LAYERS
                .iter()
                .map(|kind| (*kind, BTreeMap::new()))
                .collect();

        // Positions count hidden features too, so filtering never reorders
        // what stays drawn.
        let mut next_z: BTreeMap<LayerKind, usize> = BTreeMap::new();
        for feature in scene.datasets.iter().flat_map(|d| d.iter()) {
            let counter = next_z.entry(LayerKind::for_tag(feature.tag)).or_default();
            let z = *counter;
            *counter += 1;
            if !is_visible(&feature.attributes, feature.tag, scene.filter, scene.selection) {
                continue;
            }
            let rendered = RenderedFeature {
                feature: Arc::clone(feature),
                style: style_for(feature, scene.selection, scene.style),
                z,
            };
            desired
                .entry(LayerKind::for_tag(feature.tag))
                .or_default()
                .insert(feature.key(), rendered);
        }

        let mut report = RenderReport::default();
        for (kind, wanted) in desired {
            if let Some(layer) = self.layers.get_mut(&kind) {
                report.diffs.insert(kind, layer.reconcile(wanted));
            }
        }

        if let Some(tooltip) = &self.tooltip {
            let still_rendered = self
                .layers
                .get(&LayerKind::for_tag(tooltip.feature.tag))
                .is_some_and(|layer| layer.get(&tooltip.feature).is_some());
            if !still_rendered {
                self.tooltip = None;
            }
        }

        report
    }

    /// Swaps the base-map provider. This is the only case, besides
    /// creation, that rebuilds the surface; feature layers are emptied and
    /// repopulate on the next sync. The view is kept.
    ///
    /// Returns whether a rebuild happened.
    pub fn set_base_map(&mut self, provider: BaseMapProvider) -> bool {
        if !self.alive || provider.id == self.base_map.id {
            return false;
        }
        log::info!("Switching base map {} -> {}", self.base_map.id, provider.id);
        self.base_map = provider;
        self.build_count += 1;
        for layer in self.layers.values_mut() {
            layer.clear();
        }
        self.tooltip = None;
        true
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Pans by a drag offset in pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view.pan_by(dx, dy);
        self.tooltip = None;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.view.set_zoom(zoom);
    }

    /// Fits the view to a map-space extent.
    pub fn fit_extent(&mut self, extent: Rect<f64>, options: FitOptions) {
        self.view.fit(extent, self.viewport, options);
    }

    /// Fits the view to a rendered feature. Returns `false` when the
    /// feature is not currently rendered.
    pub fn fit_feature(&mut self, key: &FeatureKey, options: FitOptions) -> bool {
        let extent = self
            .layers
            .get(&LayerKind::for_tag(key.tag))
            .and_then(|layer| layer.get(key))
            .and_then(|rendered| rendered.feature.extent());
        match extent {
            Some(extent) => {
                self.fit_extent(extent, options);
                true
            }
            None => false,
        }
    }

    /// Starts a new measurement, discarding any unfinished sketch.
    pub fn set_measure_mode(&mut self, mode: MeasureMode) {
        log::debug!("Measure mode {} -> {mode}", self.sketch.mode());
        self.sketch = Sketch::new(mode);
    }

    /// Routes pointer movement. At most one tooltip exists, bound to the
    /// topmost road under the pointer; dragging hides it.
    pub fn on_pointer_move(&mut self, pixel: Coord<f64>, dragging: bool) -> Option<&Tooltip> {
        if !self.alive || dragging {
            self.tooltip = None;
            return None;
        }

        let query = self.query_rect(pixel);
        self.tooltip = self.layers.get(&LayerKind::Road).and_then(|layer| {
            let key = layer.hit(query).into_iter().next()?;
            let rendered = layer.get(&key)?;
            Some(Tooltip {
                text: tooltip_text(&rendered.feature),
                feature: key,
                position: pixel,
            })
        });
        self.tooltip.as_ref()
    }

    /// Routes a click. While measuring, the click adds a vertex instead.
    pub fn on_click(&mut self, pixel: Coord<f64>) -> Option<SurfaceEvent> {
        if !self.alive {
            return None;
        }

        if self.sketch.mode().is_active() {
            let vertex = self.view.coordinate_at(pixel, self.viewport);
            if self.sketch.push(vertex) {
                return self.finish_measurement();
            }
            return None;
        }

        let key = self.hit_topmost(pixel)?;
        let event = match key.tag {
            FeatureTag::Ward => SurfaceEvent::WardFocused(key.id),
            FeatureTag::Zone => SurfaceEvent::ZoneClicked(key.id),
            FeatureTag::Road | FeatureTag::MultiRoad => SurfaceEvent::RoadToggled {
                id: key.id,
                tag: key.tag,
            },
        };
        log::debug!("Click routed to {event:?}");
        Some(event)
    }

    /// Completes the measurement shape at `pixel`.
    pub fn on_double_click(&mut self, pixel: Coord<f64>) -> Option<SurfaceEvent> {
        if !self.alive || !self.sketch.mode().is_active() {
            return None;
        }
        let vertex = self.view.coordinate_at(pixel, self.viewport);
        self.sketch.push(vertex);
        if self.sketch.can_finish() {
            self.finish_measurement()
        } else {
            None
        }
    }

    /// Geometry drawn on the measurement layer, if any.
    #[must_use]
    pub fn measurement_preview(&self) -> Option<Geometry<f64>> {
        self.sketch.preview()
    }

    fn finish_measurement(&mut self) -> Option<SurfaceEvent> {
        let geometry = self.sketch.geometry();
        self.sketch = Sketch::default();

        let result = measure(&geometry?, self.view.projection());
        match result {
            Ok(measurement) => {
                log::info!("{measurement}");
                Some(SurfaceEvent::MeasurementCompleted(measurement))
            }
            Err(e) => {
                log::warn!("Failed to measure sketch: {e}");
                None
            }
        }
    }

    fn query_rect(&self, pixel: Coord<f64>) -> Rect<f64> {
        let r = self.hit_tolerance_px;
        Rect::new(
            self.view
                .coordinate_at(coord! { x: pixel.x - r, y: pixel.y - r }, self.viewport),
            self.view
                .coordinate_at(coord! { x: pixel.x + r, y: pixel.y + r }, self.viewport),
        )
    }

    fn hit_topmost(&self, pixel: Coord<f64>) -> Option<FeatureKey> {
        let query = self.query_rect(pixel);
        LayerKind::FEATURE_LAYERS
            .iter()
            .rev()
            .filter_map(|kind| self.layers.get(kind))
            .find_map(|layer| layer.hit(query).into_iter().next())
    }
}

fn empty_layers() -> BTreeMap<LayerKind, VectorLayer> {
    LayerKind::FEATURE_LAYERS
        .iter()
        .map(|kind| (*kind, VectorLayer::new(*kind)))
        .collect()
}

fn tooltip_text(feature: &Feature) -> String {
    let name = feature.attributes.label();
    let condition = feature
        .road()
        .and_then(|r| r.condition.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("N/A");
    format!("{name}\nCondition: {condition}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureBuilder, basemap};
    use ward_map_geometry::Crs;
    use ward_map_records_models::{Road, Ward};

    const VIEWPORT: Viewport = Viewport::new(1000, 1000);

    fn surface(projection: Crs) -> MapSurface {
        MapSurface::new(SurfaceOptions {
            viewport: VIEWPORT,
            view: View::new(coord! { x: 0.0, y: 0.0 }, 0.0, projection),
            base_map: basemap::default_provider(),
            hit_tolerance_px: 3.0,
        })
    }

    fn road(gid: &str, condition: &str, wkt: &str) -> Road {
        Road {
            gid: FeatureId::from(gid),
            road_name: Some(format!("Road {gid}")),
            condition: Some(condition.to_string()),
            ownership: None,
            carriage_m: None,
            category: None,
            length_met: None,
            row_meter: None,
            ward_no: Some("1".to_string()),
            ward_name: None,
            zone_no: None,
            zone_name: None,
            length_within_ward: None,
            wkt: Some(wkt.to_string()),
        }
    }

    fn ward(gid: &str, wkt: &str) -> Ward {
        Ward {
            gid: FeatureId::from(gid),
            ward_no: Some(gid.to_string()),
            ward_name: None,
            area: None,
            ward_exten: None,
            wkt: Some(wkt.to_string()),
        }
    }

    struct Fixture {
        wards: Vec<Arc<Feature>>,
        roads: Vec<Arc<Feature>>,
    }

    fn fixture() -> Fixture {
        let builder = FeatureBuilder::new(Crs::Wgs84);
        let wards = [ward("W1", "POLYGON ((-40 -40, 40 -40, 40 40, -40 40, -40 -40))")];
        let roads = [
            road("R1", "Good", "LINESTRING (-30 0, 30 0)"),
            road("R2", "Poor", "LINESTRING (-30 20, 30 20)"),
        ];
        Fixture {
            wards: builder
                .build_all(&wards, FeatureTag::Ward, Crs::Wgs84)
                .map(Arc::new)
                .collect(),
            roads: builder
                .build_all(&roads, FeatureTag::Road, Crs::Wgs84)
                .map(Arc::new)
                .collect(),
        }
    }

    fn sync(
        surface: &mut MapSurface,
        datasets: &[&[Arc<Feature>]],
        filter: &FilterState,
        selection: &Selection,
    ) -> RenderReport {
        surface.sync(&Scene {
            datasets,
            filter,
            selection,
            style: &StyleContext::default(),
        })
    }

    fn pixel_of(surface: &MapSurface, x: f64, y: f64) -> Coord<f64> {
        surface.view().pixel_of(coord! { x: x, y: y }, surface.viewport())
    }

    fn rendered_keys(surface: &MapSurface, kind: LayerKind) -> Vec<FeatureKey> {
        surface
            .layer(kind)
            .map(|l| l.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn arrival_order_does_not_change_the_result() {
        let fx = fixture();
        let filter = FilterState::default();
        let selection = Selection::new();

        let mut a = surface(Crs::Wgs84);
        sync(&mut a, &[&fx.wards, &[]], &filter, &selection);
        sync(&mut a, &[&fx.wards, &fx.roads], &filter, &selection);

        let mut b = surface(Crs::Wgs84);
        sync(&mut b, &[&[], &fx.roads], &filter, &selection);
        sync(&mut b, &[&fx.wards, &fx.roads], &filter, &selection);

        for kind in LayerKind::FEATURE_LAYERS {
            assert_eq!(rendered_keys(&a, kind), rendered_keys(&b, kind));
        }
        assert_eq!(rendered_keys(&a, LayerKind::Road).len(), 2);
    }

    #[test]
    fn selection_change_only_restyles_the_road_layer() {
        let fx = fixture();
        let filter = FilterState::default();
        let mut s = surface(Crs::Wgs84);
        sync(&mut s, &[&fx.wards, &fx.roads], &filter, &Selection::new());

        let selection = Selection::new().toggled(FeatureKey::new(FeatureTag::Road, "R1"));
        let report = sync(&mut s, &[&fx.wards, &fx.roads], &filter, &selection);
        assert_eq!(report.changed_layers().collect::<Vec<_>>(), vec![LayerKind::Road]);
        assert_eq!(report.diffs[&LayerKind::Road].restyled.len(), 1);

        let again = sync(&mut s, &[&fx.wards, &fx.roads], &filter, &selection);
        assert!(again.is_empty());
    }

    #[test]
    fn sync_never_moves_the_view() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        let before = *s.view();
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());
        assert_eq!(*s.view(), before);
    }

    #[test]
    fn click_routing_prefers_roads_over_wards() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());

        let on_road = pixel_of(&s, 0.0, 0.0);
        assert_eq!(
            s.on_click(on_road),
            Some(SurfaceEvent::RoadToggled {
                id: FeatureId::from("R1"),
                tag: FeatureTag::Road
            })
        );

        let inside_ward = pixel_of(&s, 0.0, -20.0);
        assert_eq!(
            s.on_click(inside_ward),
            Some(SurfaceEvent::WardFocused(FeatureId::from("W1")))
        );

        let outside = pixel_of(&s, 100.0, 60.0);
        assert_eq!(s.on_click(outside), None);
    }

    #[test]
    fn overlapping_roads_resolve_to_the_last_drawn() {
        let roads = [
            road("9", "Good", "LINESTRING (-30 0, 30 0)"),
            road("10", "Poor", "LINESTRING (-30 0, 30 0)"),
        ];
        let roads: Vec<Arc<Feature>> = FeatureBuilder::new(Crs::Wgs84)
            .build_all(&roads, FeatureTag::Road, Crs::Wgs84)
            .map(Arc::new)
            .collect();
        let mut s = surface(Crs::Wgs84);
        sync(&mut s, &[&roads], &FilterState::default(), &Selection::new());

        let on_road = pixel_of(&s, 0.0, 0.0);
        assert_eq!(
            s.on_click(on_road),
            Some(SurfaceEvent::RoadToggled {
                id: FeatureId::from("10"),
                tag: FeatureTag::Road
            })
        );
        let tooltip = s.on_pointer_move(on_road, false).cloned().unwrap();
        assert_eq!(tooltip.feature.id.as_str(), "10");
    }

    #[test]
    fn tooltip_follows_roads_and_hides_while_dragging() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());

        let on_road = pixel_of(&s, 10.0, 20.0);
        let tooltip = s.on_pointer_move(on_road, false).cloned().unwrap();
        assert_eq!(tooltip.feature.id.as_str(), "R2");
        assert_eq!(tooltip.text, "Road R2\nCondition: Poor");

        assert!(s.on_pointer_move(on_road, true).is_none());
        assert!(s.tooltip().is_none());

        let on_ward_only = pixel_of(&s, 0.0, -20.0);
        assert!(s.on_pointer_move(on_ward_only, false).is_none());
    }

    #[test]
    fn filtered_out_features_leave_the_layer_but_stay_selected() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        let selection = Selection::new().toggled(FeatureKey::new(FeatureTag::Road, "R2"));
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &selection);

        let mut filter = FilterState::default();
        filter.toggle_condition(ward_map_records_models::RoadCondition::Poor);
        let report = sync(&mut s, &[&fx.wards, &fx.roads], &filter, &selection);

        assert_eq!(report.diffs[&LayerKind::Road].removed.len(), 1);
        assert!(selection.is_selected(&FeatureKey::new(FeatureTag::Road, "R2")));
        assert_eq!(rendered_keys(&s, LayerKind::Road).len(), 1);
    }

    #[test]
    fn line_measurement_reports_kilometres_and_resets_mode() {
        let mut s = surface(Crs::WebMercator);
        s.set_zoom(10.0);
        s.set_measure_mode(MeasureMode::LineString);

        let start = pixel_of(&s, 0.0, 0.0);
        let end = pixel_of(&s, 1000.0, 0.0);
        assert_eq!(s.on_click(start), None);
        assert!(s.measurement_preview().is_some());

        let Some(SurfaceEvent::MeasurementCompleted(measurement)) = s.on_double_click(end) else {
            panic!("expected a completed measurement");
        };
        assert_eq!(measurement.to_string(), "Length: 1.00 km");
        assert_eq!(s.measure_mode(), MeasureMode::None);
        assert!(s.measurement_preview().is_none());
    }

    #[test]
    fn clicks_feed_the_sketch_while_measuring() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());
        s.set_measure_mode(MeasureMode::Polygon);

        assert_eq!(s.on_click(pixel_of(&s, 0.0, 0.0)), None);
        assert_eq!(s.sketch().vertices().len(), 1);
    }

    #[test]
    fn base_map_switch_rebuilds_and_keeps_view() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        s.fit_extent(
            Rect::new(coord! { x: 1.0, y: 1.0 }, coord! { x: 2.0, y: 2.0 }),
            FitOptions::new(50.0, 16.0),
        );
        let view = *s.view();
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());

        assert!(!s.set_base_map(basemap::default_provider()));
        assert!(s.set_base_map(basemap::provider("topo").unwrap()));
        assert_eq!(s.build_count(), 2);
        assert_eq!(*s.view(), view);
        assert!(rendered_keys(&s, LayerKind::Road).is_empty());

        let report = sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());
        assert_eq!(report.diffs[&LayerKind::Road].added.len(), 2);
    }

    #[test]
    fn fit_feature_requires_a_rendered_feature() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());

        let key = FeatureKey {
            tag: FeatureTag::Road,
            id: FeatureId::from("R1"),
        };
        assert!(s.fit_feature(&key, FitOptions::new(100.0, 17.0)));
        assert_eq!(s.view().center(), coord! { x: 0.0, y: 0.0 });

        let missing = FeatureKey {
            tag: FeatureTag::Road,
            id: FeatureId::from("R9"),
        };
        assert!(!s.fit_feature(&missing, FitOptions::new(100.0, 17.0)));
    }

    #[test]
    fn torn_down_surface_ignores_everything() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        s.teardown();
        assert!(!s.is_alive());
        let report = sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());
        assert!(report.diffs.is_empty());
        assert_eq!(s.on_click(coord! { x: 500.0, y: 500.0 }), None);
    }

    #[test]
    fn hidden_layers_are_skipped_by_clicks() {
        let fx = fixture();
        let mut s = surface(Crs::Wgs84);
        sync(&mut s, &[&fx.wards, &fx.roads], &FilterState::default(), &Selection::new());
        s.set_layer_visible(LayerKind::Road, false);
        assert!(!s.is_layer_visible(LayerKind::Road));
        assert_eq!(
            s.on_click(pixel_of(&s, 0.0, 0.0)),
            Some(SurfaceEvent::WardFocused(FeatureId::from("W1")))
        );
    }
}

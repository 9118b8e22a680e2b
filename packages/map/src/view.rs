//! The live view: center, zoom, and projection, plus pixel mapping.
//!
//! Pixel space has its origin at the top-left corner of the viewport with
//! y growing downwards. Map space is the working CRS.

use geo::{Coord, Rect, coord};
use serde::{Deserialize, Serialize};
use ward_map_geometry::Crs;

/// Edge length of one base-map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Size of the rendering target in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn half(self) -> Coord<f64> {
        coord! {
            x: f64::from(self.width) / 2.0,
            y: f64::from(self.height) / 2.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

/// Constraints for fitting the view to an extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Margin kept free on every side, in pixels.
    pub padding_px: f64,
    /// Upper bound on the resulting zoom.
    pub max_zoom: f64,
}

impl FitOptions {
    #[must_use]
    pub const fn new(padding_px: f64, max_zoom: f64) -> Self {
        Self {
            padding_px,
            max_zoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View {
    center: Coord<f64>,
    zoom: f64,
    projection: Crs,
}

impl View {
    #[must_use]
    pub const fn new(center: Coord<f64>, zoom: f64, projection: Crs) -> Self {
        Self {
            center,
            zoom,
            projection,
        }
    }

    #[must_use]
    pub const fn center(&self) -> Coord<f64> {
        self.center
    }

    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub const fn projection(&self) -> Crs {
        self.projection
    }

    /// Map units per pixel at the current zoom.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.projection.world_width() / (TILE_SIZE * self.zoom.exp2())
    }

    /// Map coordinate under a pixel.
    #[must_use]
    pub fn coordinate_at(&self, pixel: Coord<f64>, viewport: Viewport) -> Coord<f64> {
        let res = self.resolution();
        let half = viewport.half();
        coord! {
            x: (pixel.x - half.x).mul_add(res, self.center.x),
            y: (half.y - pixel.y).mul_add(res, self.center.y),
        }
    }

    /// Pixel position of a map coordinate.
    #[must_use]
    pub fn pixel_of(&self, coordinate: Coord<f64>, viewport: Viewport) -> Coord<f64> {
        let res = self.resolution();
        let half = viewport.half();
        coord! {
            x: half.x + (coordinate.x - self.center.x) / res,
            y: half.y - (coordinate.y - self.center.y) / res,
        }
    }

    /// The map-space rectangle currently on screen.
    #[must_use]
    pub fn visible_extent(&self, viewport: Viewport) -> Rect<f64> {
        let top_left = self.coordinate_at(coord! { x: 0.0, y: 0.0 }, viewport);
        let bottom_right = self.coordinate_at(
            coord! { x: f64::from(viewport.width), y: f64::from(viewport.height) },
            viewport,
        );
        Rect::new(top_left, bottom_right)
    }

    /// Pans the view by a pixel offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let res = self.resolution();
        self.center.x -= dx * res;
        self.center.y += dy * res;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.max(0.0);
    }

    /// Centers on `extent` at the largest zoom that keeps it inside the
    /// padded viewport, capped at `options.max_zoom`.
    ///
    /// A degenerate extent (a point, or a horizontal or vertical line)
    /// zooms to the cap on its degenerate axes.
    pub fn fit(&mut self, extent: Rect<f64>, viewport: Viewport, options: FitOptions) {
        let available_w = (2.0f64).mul_add(-options.padding_px, f64::from(viewport.width)).max(1.0);
        let available_h = (2.0f64).mul_add(-options.padding_px, f64::from(viewport.height)).max(1.0);

        let res = (extent.width() / available_w).max(extent.height() / available_h);
        let zoom = if res > 0.0 && res.is_finite() {
            (self.projection.world_width() / (TILE_SIZE * res)).log2()
        } else {
            options.max_zoom
        };

        self.center = extent.center();
        self.zoom = zoom.clamp(0.0, options.max_zoom.max(0.0));
        log::debug!(
            "Fit view to {:?}..{:?} at zoom {:.2}",
            extent.min(),
            extent.max(),
            self.zoom
        );
    }
}

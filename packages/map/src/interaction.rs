//! Measurement drawing: the active mode and the in-progress sketch.

use std::str::FromStr;

use geo::{Coord, Geometry, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// The active measurement drawing mode.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MeasureMode {
    #[default]
    None,
    Point,
    /// Distance along a path.
    LineString,
    /// Enclosed area.
    Polygon,
}

impl MeasureMode {
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Fewest vertices that make a complete shape in this mode.
    #[must_use]
    pub const fn min_vertices(self) -> usize {
        match self {
            Self::None => 0,
            Self::Point => 1,
            Self::LineString => 2,
            Self::Polygon => 3,
        }
    }
}

impl FromStr for MeasureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "point" => Ok(Self::Point),
            "line" | "linestring" | "line-string" | "distance" => Ok(Self::LineString),
            "polygon" | "area" => Ok(Self::Polygon),
            other => Err(format!("Unknown measure mode: {other}")),
        }
    }
}

/// Vertices accumulated for the current measurement, in map coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sketch {
    mode: MeasureMode,
    vertices: Vec<Coord<f64>>,
}

impl Sketch {
    #[must_use]
    pub const fn new(mode: MeasureMode) -> Self {
        Self {
            mode,
            vertices: Vec::new(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> MeasureMode {
        self.mode
    }

    #[must_use]
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Adds a vertex. Returns `true` when the shape is complete.
    ///
    /// Point sketches complete on their first vertex; lines and polygons
    /// complete only on [`Sketch::finish`]. A vertex repeating the last
    /// one is ignored, since a double-click delivers its position as a
    /// click first.
    pub fn push(&mut self, vertex: Coord<f64>) -> bool {
        if !self.mode.is_active() {
            return false;
        }
        if self.vertices.last() != Some(&vertex) {
            self.vertices.push(vertex);
        }
        self.mode == MeasureMode::Point
    }

    /// Whether enough vertices exist to finish the shape.
    #[must_use]
    pub fn can_finish(&self) -> bool {
        self.mode.is_active() && self.vertices.len() >= self.mode.min_vertices()
    }

    /// The current shape, including incomplete ones with at least one
    /// vertex, for display.
    #[must_use]
    pub fn preview(&self) -> Option<Geometry<f64>> {
        match (self.mode, self.vertices.as_slice()) {
            (MeasureMode::None, _) | (_, []) => None,
            (MeasureMode::Point, [first, ..]) | (_, [first]) => {
                Some(Geometry::Point(Point::from(*first)))
            }
            _ => Some(Geometry::LineString(LineString::from(self.vertices.clone()))),
        }
    }

    /// The completed geometry, or `None` while too few vertices exist.
    #[must_use]
    pub fn geometry(&self) -> Option<Geometry<f64>> {
        if !self.can_finish() {
            return None;
        }
        match self.mode {
            MeasureMode::None => None,
            MeasureMode::Point => self.vertices.first().map(|c| Geometry::Point(Point::from(*c))),
            MeasureMode::LineString => {
                Some(Geometry::LineString(LineString::from(self.vertices.clone())))
            }
            MeasureMode::Polygon => {
                let mut ring = LineString::from(self.vertices.clone());
                ring.close();
                Some(Geometry::Polygon(Polygon::new(ring, vec![])))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn parses_mode_aliases() {
        assert_eq!("distance".parse(), Ok(MeasureMode::LineString));
        assert_eq!("Area".parse(), Ok(MeasureMode::Polygon));
        assert_eq!("".parse(), Ok(MeasureMode::None));
        assert!("circle".parse::<MeasureMode>().is_err());
        assert_eq!(MeasureMode::LineString.to_string(), "line-string");
    }

    #[test]
    fn point_sketch_completes_immediately() {
        let mut sketch = Sketch::new(MeasureMode::Point);
        assert!(sketch.push(coord! { x: 1.0, y: 2.0 }));
        assert_eq!(
            sketch.geometry(),
            Some(Geometry::Point(Point::new(1.0, 2.0)))
        );
    }

    #[test]
    fn line_needs_two_distinct_vertices() {
        let mut sketch = Sketch::new(MeasureMode::LineString);
        assert!(!sketch.push(coord! { x: 0.0, y: 0.0 }));
        assert!(!sketch.push(coord! { x: 0.0, y: 0.0 }));
        assert_eq!(sketch.geometry(), None);
        assert!(matches!(sketch.preview(), Some(Geometry::Point(_))));

        sketch.push(coord! { x: 1.0, y: 0.0 });
        assert!(matches!(sketch.geometry(), Some(Geometry::LineString(_))));
    }

    #[test]
    fn polygon_ring_is_closed() {
        let mut sketch = Sketch::new(MeasureMode::Polygon);
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)] {
            sketch.push(coord! { x: x, y: y });
        }
        let Some(Geometry::Polygon(polygon)) = sketch.geometry() else {
            panic!("expected polygon");
        };
        assert!(polygon.exterior().is_closed());
        assert_eq!(polygon.exterior().0.len(), 4);
    }

    #[test]
    fn inactive_sketch_ignores_vertices() {
        let mut sketch = Sketch::default();
        assert!(!sketch.push(coord! { x: 0.0, y: 0.0 }));
        assert!(sketch.vertices().is_empty());
    }
}

//! Real-world measurement of sketched geometries.
//!
//! Geometries are unprojected from the working CRS to WGS84 and measured
//! on the sphere: haversine for lengths, Chamberlain-Duquette for areas.

use std::fmt;

use geo::{ChamberlainDuquetteArea, Distance, Geometry, Haversine, LineString, MapCoords, Point};
use serde::{Deserialize, Serialize};

use crate::{MeasureError, crs::Crs};

const SQUARE_METRES_PER_HECTARE: f64 = 10_000.0;

/// The result of measuring one completed shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Measurement {
    /// A single position in WGS84 degrees.
    Point { lon: f64, lat: f64 },
    /// Total path length in metres.
    Length { meters: f64 },
    /// Enclosed area in square metres.
    Area { square_meters: f64 },
}

impl Measurement {
    #[must_use]
    pub fn kilometers(&self) -> Option<f64> {
        match self {
            Self::Length { meters } => Some(meters / 1000.0),
            Self::Point { .. } | Self::Area { .. } => None,
        }
    }

    #[must_use]
    pub fn hectares(&self) -> Option<f64> {
        match self {
            Self::Area { square_meters } => Some(square_meters / SQUARE_METRES_PER_HECTARE),
            Self::Point { .. } | Self::Length { .. } => None,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point { lon, lat } => write!(f, "Point: {lon:.6}, {lat:.6}"),
            Self::Length { meters } => write!(f, "Length: {:.2} km", meters / 1000.0),
            Self::Area { square_meters } => write!(
                f,
                "Area: {:.2} hectares",
                square_meters / SQUARE_METRES_PER_HECTARE
            ),
        }
    }
}

/// Measures a geometry expressed in `crs`.
///
/// Points report their position, line shapes their length, polygon shapes
/// their area.
///
/// # Errors
///
/// Returns [`MeasureError`] if the geometry cannot be unprojected or is a
/// kind that has no single measurement (collections, rects, triangles).
pub fn measure(geometry: &Geometry<f64>, crs: Crs) -> Result<Measurement, MeasureError> {
    let geographic = geometry.try_map_coords(|c| crs.unproject(c))?;

    match geographic {
        Geometry::Point(p) => Ok(Measurement::Point {
            lon: p.x(),
            lat: p.y(),
        }),
        Geometry::Line(line) => Ok(Measurement::Length {
            meters: Haversine.distance(Point::from(line.start), Point::from(line.end)),
        }),
        Geometry::LineString(ls) => Ok(Measurement::Length {
            meters: path_length(&ls),
        }),
        Geometry::MultiLineString(mls) => Ok(Measurement::Length {
            meters: mls.0.iter().map(path_length).sum(),
        }),
        Geometry::Polygon(polygon) => Ok(Measurement::Area {
            square_meters: polygon.chamberlain_duquette_unsigned_area(),
        }),
        Geometry::MultiPolygon(mp) => Ok(Measurement::Area {
            square_meters: mp.chamberlain_duquette_unsigned_area(),
        }),
        Geometry::MultiPoint(_)
        | Geometry::GeometryCollection(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => Err(MeasureError::Unsupported),
    }
}

fn path_length(ls: &LineString<f64>) -> f64 {
    ls.lines()
        .map(|l| Haversine.distance(Point::from(l.start), Point::from(l.end)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string, polygon};

    /// Mean earth radius used by the haversine metric.
    const MEAN_RADIUS: f64 = 6_371_008.8;

    #[test]
    fn line_one_kilometre_along_a_meridian() {
        let dlat = (1000.0 / MEAN_RADIUS).to_degrees();
        let line = Geometry::LineString(line_string![(x: 77.45, y: 28.7), (x: 77.45, y: 28.7 + dlat)]);

        let m = measure(&line, Crs::Wgs84).unwrap();
        assert!((m.kilometers().unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(m.to_string(), "Length: 1.00 km");
    }

    #[test]
    fn line_of_1000_projected_metres_reports_one_kilometre() {
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1000.0, y: 0.0)]);
        let m = measure(&line, Crs::WebMercator).unwrap();
        assert_eq!(m.to_string(), "Length: 1.00 km");

        // UTM metres are true ground metres near the central meridian.
        let utm = Geometry::LineString(line_string![
            (x: 500_000.0, y: 3_170_000.0),
            (x: 500_000.0, y: 3_171_000.0),
        ]);
        let m = measure(&utm, Crs::ROADS).unwrap();
        assert_eq!(m.to_string(), "Length: 1.00 km");
    }

    #[test]
    fn hectare_square_at_the_equator() {
        let square = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 100.0),
            (x: 0.0, y: 100.0),
            (x: 0.0, y: 0.0),
        ]);
        let m = measure(&square, Crs::WebMercator).unwrap();
        assert!((m.hectares().unwrap() - 1.0).abs() < 0.01, "{m}");
        assert_eq!(m.to_string(), "Area: 1.00 hectares");
    }

    #[test]
    fn point_reports_geographic_position() {
        let p = Geometry::Point(Point::from(coord! { x: 0.0, y: 0.0 }));
        let m = measure(&p, Crs::WebMercator).unwrap();
        assert_eq!(m, Measurement::Point { lon: 0.0, lat: 0.0 });
        assert!(m.kilometers().is_none());
        assert!(m.hectares().is_none());
    }

    #[test]
    fn collections_are_not_measurable() {
        let mp = Geometry::MultiPoint(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)].into());
        assert!(matches!(
            measure(&mp, Crs::Wgs84),
            Err(MeasureError::Unsupported)
        ));
    }
}

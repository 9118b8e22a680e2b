//! Well-known-text decoding with reprojection into the working CRS.

use geo::{CoordsIter, Geometry, MapCoords};
use wkt::TryFromWkt;

use crate::{DecodeError, crs::Crs};

/// Strips stray quote characters (and surrounding whitespace) left on WKT
/// strings by upstream serialization, e.g. `"\"POINT (1 2)\""`.
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
}

/// Parses a WKT geometry declared in `source` and reprojects every
/// coordinate into `target`.
///
/// Accepts `POINT`, `LINESTRING`, `POLYGON`, their `MULTI*` variants, and
/// `GEOMETRYCOLLECTION`.
///
/// # Errors
///
/// Returns [`DecodeError`] if the text is blank, does not parse, contains
/// no coordinates, contains a non-finite coordinate, or cannot be
/// reprojected.
pub fn decode(text: &str, source: Crs, target: Crs) -> Result<Geometry<f64>, DecodeError> {
    let cleaned = strip_quotes(text);
    if cleaned.is_empty() {
        return Err(DecodeError::Empty);
    }

    let geometry = Geometry::<f64>::try_from_wkt_str(cleaned).map_err(|e| DecodeError::Syntax {
        message: e.to_string(),
    })?;

    if geometry.coords_count() == 0 {
        return Err(DecodeError::Empty);
    }
    if geometry
        .coords_iter()
        .any(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(DecodeError::NonFinite);
    }

    Ok(geometry.try_map_coords(|c| source.transform(c, target))?)
}

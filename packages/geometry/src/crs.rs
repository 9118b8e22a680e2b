//! Coordinate reference systems and pure coordinate transforms.
//!
//! Three families are supported, which covers every collection the
//! dashboard consumes: geographic WGS84 degrees (`EPSG:4326`), spherical
//! Web Mercator (`EPSG:3857`), and the WGS84 UTM zones (`EPSG:326xx`
//! north, `EPSG:327xx` south). All transforms pivot through WGS84.
//!
//! UTM uses the Krüger series to third order, which is accurate to well
//! under a millimetre inside a zone.

use std::fmt;
use std::str::FromStr;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Errors raised while transforming coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrsError {
    /// The CRS code is not one of the supported families.
    #[error("Unsupported CRS: {code}")]
    Unsupported {
        /// The code as given.
        code: String,
    },

    /// A geographic latitude outside `[-90, 90]`.
    #[error("Latitude {lat} is out of range")]
    LatitudeOutOfRange {
        /// The offending latitude.
        lat: f64,
    },

    /// The transform produced NaN or infinity.
    #[error("Transform produced a non-finite coordinate ({x}, {y})")]
    NonFinite {
        /// Resulting x.
        x: f64,
        /// Resulting y.
        y: f64,
    },
}

/// A coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Crs {
    /// Geographic longitude/latitude in degrees (`EPSG:4326`).
    Wgs84,
    /// Spherical Web Mercator in metres (`EPSG:3857`).
    WebMercator,
    /// WGS84 / UTM in metres.
    Utm {
        /// Zone number, 1 through 60.
        zone: u8,
        /// Northern hemisphere when true.
        north: bool,
    },
}

impl Crs {
    /// The projected system the road collection is published in
    /// (WGS84 / UTM zone 44N).
    pub const ROADS: Self = Self::Utm {
        zone: 44,
        north: true,
    };

    /// EPSG code of this CRS.
    #[must_use]
    pub fn epsg(self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
            Self::Utm { zone, north: true } => 32600 + u32::from(zone),
            Self::Utm { zone, north: false } => 32700 + u32::from(zone),
        }
    }

    #[must_use]
    pub const fn is_geographic(self) -> bool {
        matches!(self, Self::Wgs84)
    }

    /// Width of the world in this CRS's units, used to derive view
    /// resolutions from zoom levels.
    #[must_use]
    pub fn world_width(self) -> f64 {
        match self {
            Self::Wgs84 => 360.0,
            Self::WebMercator | Self::Utm { .. } => 2.0 * std::f64::consts::PI * WGS84_A,
        }
    }

    /// Converts a coordinate in this CRS to WGS84 degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError`] if the input is outside the CRS domain or the
    /// result is not finite.
    pub fn unproject(self, coord: Coord<f64>) -> Result<Coord<f64>, CrsError> {
        let out = match self {
            Self::Wgs84 => {
                if !(-90.0..=90.0).contains(&coord.y) {
                    return Err(CrsError::LatitudeOutOfRange { lat: coord.y });
                }
                coord
            }
            Self::WebMercator => Coord {
                x: (coord.x / WGS84_A).to_degrees(),
                y: (2.0 * (coord.y / WGS84_A).exp().atan() - std::f64::consts::FRAC_PI_2)
                    .to_degrees(),
            },
            Self::Utm { zone, north } => utm_inverse(zone, north, coord),
        };
        finite(out)
    }

    /// Converts a WGS84 coordinate (degrees) into this CRS.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError`] if the latitude is out of range or the result
    /// is not finite.
    pub fn project(self, geographic: Coord<f64>) -> Result<Coord<f64>, CrsError> {
        if !(-90.0..=90.0).contains(&geographic.y) {
            return Err(CrsError::LatitudeOutOfRange { lat: geographic.y });
        }
        let out = match self {
            Self::Wgs84 => geographic,
            Self::WebMercator => {
                let lat = geographic
                    .y
                    .clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT)
                    .to_radians();
                Coord {
                    x: WGS84_A * geographic.x.to_radians(),
                    y: WGS84_A * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
                }
            }
            Self::Utm { zone, north } => utm_forward(zone, north, geographic),
        };
        finite(out)
    }

    /// Transforms a coordinate from this CRS into `target`.
    ///
    /// # Errors
    ///
    /// Returns [`CrsError`] if either leg of the transform fails.
    pub fn transform(self, coord: Coord<f64>, target: Self) -> Result<Coord<f64>, CrsError> {
        if self == target {
            return finite(coord);
        }
        target.project(self.unproject(coord)?)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = CrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let unsupported = || CrsError::Unsupported {
            code: s.to_string(),
        };

        if normalized == "CRS:84" || normalized == "WGS84" {
            return Ok(Self::Wgs84);
        }

        let code: u32 = normalized
            .strip_prefix("EPSG:")
            .unwrap_or(&normalized)
            .parse()
            .map_err(|_| unsupported())?;

        match code {
            4326 => Ok(Self::Wgs84),
            3857 | 900_913 | 102_100 => Ok(Self::WebMercator),
            32601..=32660 | 32701..=32760 => {
                let zone = u8::try_from(code % 100).map_err(|_| unsupported())?;
                Ok(Self::Utm {
                    zone,
                    north: code < 32700,
                })
            }
            _ => Err(unsupported()),
        }
    }
}

impl TryFrom<String> for Crs {
    type Error = CrsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(value: Crs) -> Self {
        value.to_string()
    }
}

fn finite(coord: Coord<f64>) -> Result<Coord<f64>, CrsError> {
    if coord.x.is_finite() && coord.y.is_finite() {
        Ok(coord)
    } else {
        Err(CrsError::NonFinite {
            x: coord.x,
            y: coord.y,
        })
    }
}

/// Krüger series coefficients for the WGS84 ellipsoid.
struct TransverseMercatorSeries {
    n: f64,
    /// Rectifying radius.
    a: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl TransverseMercatorSeries {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let n2 = n * n;
        let n3 = n2 * n;
        Self {
            n,
            a: WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }
}

fn central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// Even multipliers `2j` for `j = 1..=3`.
fn harmonics() -> impl Iterator<Item = f64> {
    (1..=3u8).map(|j| f64::from(2 * j))
}

fn utm_forward(zone: u8, north: bool, geographic: Coord<f64>) -> Coord<f64> {
    let s = TransverseMercatorSeries::wgs84();
    let phi = geographic.y.to_radians();
    let dlam = (geographic.x - central_meridian(zone)).to_radians();

    let c = 2.0 * s.n.sqrt() / (1.0 + s.n);
    let t = (phi.sin().atanh() - c * (c * phi.sin()).atanh()).sinh();
    let xi_p = (t / dlam.cos()).atan();
    let eta_p = (dlam.sin() / t.mul_add(t, 1.0).sqrt()).atanh();

    let mut easting = eta_p;
    let mut northing = xi_p;
    for (k, alpha) in harmonics().zip(s.alpha) {
        easting += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        northing += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
    }

    let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
    Coord {
        x: (UTM_K0 * s.a).mul_add(easting, UTM_FALSE_EASTING),
        y: (UTM_K0 * s.a).mul_add(northing, false_northing),
    }
}

fn utm_inverse(zone: u8, north: bool, coord: Coord<f64>) -> Coord<f64> {
    let s = TransverseMercatorSeries::wgs84();
    let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };

    let xi = (coord.y - false_northing) / (UTM_K0 * s.a);
    let eta = (coord.x - UTM_FALSE_EASTING) / (UTM_K0 * s.a);

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (k, beta) in harmonics().zip(s.beta) {
        xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
        eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).asin();
    let mut phi = chi;
    for (k, delta) in harmonics().zip(s.delta) {
        phi += delta * (k * chi).sin();
    }
    let lam = (eta_p.sinh() / xi_p.cos()).atan();

    Coord {
        x: central_meridian(zone) + lam.to_degrees(),
        y: phi.to_degrees(),
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! WKT geometry decoding, coordinate reprojection, and real-world
//! measurement.
//!
//! Zones and wards are published in geographic degrees, roads in a
//! projected UTM system. [`decode()`] turns either into a single working
//! CRS chosen by the caller, and [`measure()`] reports lengths and areas of
//! working-CRS sketches in ground units.

pub mod crs;
pub mod decode;
pub mod measure;

pub use crs::{Crs, CrsError};
pub use decode::{decode, strip_quotes};
pub use measure::{Measurement, measure};

use thiserror::Error;

/// Errors that can occur while decoding a WKT geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The text was blank or described an empty geometry.
    #[error("Geometry text is empty")]
    Empty,

    /// The text is not valid WKT.
    #[error("Invalid WKT: {message}")]
    Syntax {
        /// Parser message.
        message: String,
    },

    /// A parsed coordinate was NaN or infinite.
    #[error("Geometry contains a non-finite coordinate")]
    NonFinite,

    /// Reprojection into the target CRS failed.
    #[error("Reprojection failed: {0}")]
    Projection(#[from] CrsError),
}

/// Errors that can occur while measuring a geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    /// The geometry could not be unprojected to WGS84.
    #[error("Reprojection failed: {0}")]
    Projection(#[from] CrsError),

    /// The geometry kind has no single length or area.
    #[error("Geometry kind cannot be measured")]
    Unsupported,
}

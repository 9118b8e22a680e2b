#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular export of the road features currently visible or selected.
//!
//! The caller passes the feature set it already computed; nothing here
//! re-queries or re-filters. Only road and multi-ward road features
//! produce rows. An empty input is [`ExportOutcome::NothingToExport`],
//! not an error.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use ward_map_map::Feature;
use ward_map_records_models::{FeatureTag, Road};

/// Errors that can occur while writing or reading an export table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Creating or writing the output file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV serialization or parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Which feature set an export covers. Determines the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ExportKind {
    Visible,
    Selected,
}

impl ExportKind {
    #[must_use]
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Visible => "visible_roads.csv",
            Self::Selected => "selected_roads.csv",
        }
    }
}

/// What an export did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    /// No road features were passed in; no file was created.
    NothingToExport,
}

/// One row of the export table, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "RoadName")]
    pub road_name: String,
    /// `"<zoneNo> - <zoneName>"`.
    #[serde(rename = "Zone")]
    pub zone: String,
    /// `"<wardNo> - <wardName>"`.
    #[serde(rename = "Ward")]
    pub ward: String,
    #[serde(rename = "Condition")]
    pub condition: String,
    /// Metres, two decimals.
    #[serde(rename = "LengthInMeters")]
    pub length_in_meters: String,
    #[serde(rename = "CarriageType")]
    pub carriage_type: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Ownership")]
    pub ownership: String,
    /// `Normal` or `Multi-Ward`.
    #[serde(rename = "Type")]
    pub road_type: String,
    #[serde(rename = "GIS_ID")]
    pub gis_id: String,
}

impl ExportRow {
    /// Projects a road feature into a row. Non-road features give `None`.
    #[must_use]
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        if !feature.tag.is_road() {
            return None;
        }
        let road = feature.road()?;
        Some(Self::from_road(road, feature.tag == FeatureTag::MultiRoad))
    }

    #[must_use]
    pub fn from_road(road: &Road, multi_ward: bool) -> Self {
        Self {
            road_name: text(road.road_name.as_deref()),
            zone: code_and_name(road.zone_no.as_deref(), road.zone_name.as_deref()),
            ward: code_and_name(road.ward_no.as_deref(), road.ward_name.as_deref()),
            condition: text(road.condition.as_deref()),
            length_in_meters: road
                .length_met
                .map(|m| format!("{m:.2}"))
                .unwrap_or_default(),
            carriage_type: text(road.carriage_m.as_deref()),
            category: text(road.category.as_deref()),
            ownership: text(road.ownership.as_deref()),
            road_type: if multi_ward { "Multi-Ward" } else { "Normal" }.to_string(),
            gis_id: road.gid.to_string(),
        }
    }
}

fn text(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// Joins a code and name as `"{code} - {name}"`. A blank side collapses to
/// the other one alone instead of leaving a dangling `" - "`.
fn code_and_name(code: Option<&str>, name: Option<&str>) -> String {
    let code = code.map(str::trim).filter(|s| !s.is_empty());
    let name = name.map(str::trim).filter(|s| !s.is_empty());
    match (code, name) {
        (Some(code), Some(name)) => format!("{code} - {name}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => String::new(),
    }
}

/// Projects every road feature into a row, in input order.
pub fn rows<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Vec<ExportRow> {
    features
        .into_iter()
        .filter_map(ExportRow::from_feature)
        .collect()
}

/// Writes `rows` with a header line to `writer`.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if serialization or the writer fails.
pub fn write_table<W: Write>(writer: W, rows: &[ExportRow]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads a table previously written by [`write_table`].
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if the input is not a valid export table.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<ExportRow>, ExportError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<ExportRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Writes the road features in `features` to `path`.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn export_table<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
    path: &Path,
) -> Result<ExportOutcome, ExportError> {
    let rows = rows(features);
    if rows.is_empty() {
        log::info!("Nothing to export to {}", path.display());
        return Ok(ExportOutcome::NothingToExport);
    }

    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_table(file, &rows)?;

    log::info!("Exported {} road(s) to {}", rows.len(), path.display());
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

/// Exports into `directory` under the filename for `kind`.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory or file cannot be written.
pub fn export_to_dir<'a>(
    kind: ExportKind,
    features: impl IntoIterator<Item = &'a Feature>,
    directory: &Path,
) -> Result<ExportOutcome, ExportError> {
    std::fs::create_dir_all(directory).map_err(|e| ExportError::Io {
        path: directory.display().to_string(),
        source: e,
    })?;
    export_table(features, &directory.join(kind.filename()))
}

//! Dashboard configuration.
//!
//! The defaults in `config/default.toml` are embedded at compile time. A
//! user file is merged over them key by key, then environment overrides
//! are applied:
//!
//! - `WARD_MAP_API_URL` replaces `api.base_url`
//! - `WARD_MAP_EXPORT_DIR` replaces `export.directory`

use std::path::{Path, PathBuf};
use std::time::Duration;

use geo::coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ward_map_geometry::Crs;
use ward_map_map::basemap::{self, DEFAULT_PROVIDER_ID};
use ward_map_map::{BaseMapError, BaseMapProvider, FitOptions, SurfaceOptions, View, Viewport};

const DEFAULT_TOML: &str = include_str!("../config/default.toml");

pub const API_URL_ENV: &str = "WARD_MAP_API_URL";
pub const EXPORT_DIR_ENV: &str = "WARD_MAP_EXPORT_DIR";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured base map is not registered.
    #[error("Config error: {0}")]
    BaseMap(#[from] BaseMapError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Source CRS per collection plus the working CRS everything is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub working: Crs,
    pub zones: Crs,
    pub wards: Crs,
    pub roads: Crs,
    pub ward_roads: Crs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    pub fit_padding_px: f64,
    pub max_fit_zoom: f64,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub base_map: String,
    pub hit_tolerance_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub projection: ProjectionConfig,
    pub view: ViewConfig,
    pub export: ExportConfig,
    pub map: MapConfig,
}

impl Default for DashboardConfig {
    /// The embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse, which the tests below
    /// rule out.
    fn default() -> Self {
        toml::de::from_str(DEFAULT_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded default config: {e}"))
    }
}

impl DashboardConfig {
    /// Parses `text` merged over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if either document is invalid.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut merged: toml::Table = toml::de::from_str(DEFAULT_TOML)?;
        let overrides: toml::Table = toml::de::from_str(text)?;
        merge_tables(&mut merged, overrides);
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Reads a config file merged over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the effective configuration: defaults, then `path` if given,
    /// then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be loaded or names an
    /// unknown base map.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.base_map()?;
        log::debug!(
            "Loaded config: api {} working CRS {} base map {}",
            config.api.base_url,
            config.projection.working,
            config.map.base_map
        );
        Ok(config)
    }

    /// Applies overrides looked up by environment variable name.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(EXPORT_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.export.directory = PathBuf::from(dir.trim());
        }
        self
    }

    /// The configured base-map provider.
    ///
    /// # Errors
    ///
    /// Returns [`BaseMapError::Unknown`] if it is not registered.
    pub fn base_map(&self) -> Result<BaseMapProvider, BaseMapError> {
        let id = if self.map.base_map.trim().is_empty() {
            DEFAULT_PROVIDER_ID
        } else {
            self.map.base_map.trim()
        };
        basemap::provider(id)
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        Viewport::new(self.view.viewport_width, self.view.viewport_height)
    }

    /// The initial view, in the working CRS.
    #[must_use]
    pub const fn initial_view(&self) -> View {
        View::new(
            coord! { x: self.view.center_x, y: self.view.center_y },
            self.view.zoom,
            self.projection.working,
        )
    }

    /// Fit used after a new selection.
    #[must_use]
    pub const fn selection_fit(&self) -> FitOptions {
        FitOptions::new(self.view.fit_padding_px, self.view.max_fit_zoom)
    }

    /// Options for creating a map surface.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BaseMap`] if the base map is not registered.
    pub fn surface_options(&self) -> Result<SurfaceOptions, ConfigError> {
        Ok(SurfaceOptions {
            viewport: self.viewport(),
            view: self.initial_view(),
            base_map: self.base_map()?,
            hit_tolerance_px: self.map.hit_tolerance_px,
        })
    }
}

/// Recursively merges `overrides` into `base`. Tables merge key by key;
/// any other value replaces the base value.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = DashboardConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.projection.working, Crs::Wgs84);
        assert_eq!(config.projection.roads, Crs::ROADS);
        assert_eq!(config.projection.ward_roads, Crs::Wgs84);
        assert!((config.view.center_x - 77.45).abs() < f64::EPSILON);
        assert_eq!(config.base_map().unwrap().id, "osm");
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [projection]
            working = "EPSG:3857"

            [map]
            base_map = "topo"
            "#,
        )
        .unwrap();
        assert_eq!(config.projection.working, Crs::WebMercator);
        assert_eq!(config.projection.roads, Crs::ROADS);
        assert_eq!(config.map.base_map, "topo");
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn env_overrides_win() {
        let config = DashboardConfig::default().with_overrides(|key| match key {
            API_URL_ENV => Some("https://gis.example.org".to_string()),
            EXPORT_DIR_ENV => Some(" /tmp/exports ".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://gis.example.org");
        assert_eq!(config.export.directory, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = DashboardConfig::default().with_overrides(|_| Some("  ".to_string()));
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn rejects_unknown_crs_and_base_map() {
        assert!(matches!(
            DashboardConfig::from_toml_str("[projection]\nroads = \"EPSG:2154\""),
            Err(ConfigError::Parse(_))
        ));

        let config = DashboardConfig::from_toml_str("[map]\nbase_map = \"bing\"").unwrap();
        assert!(matches!(
            config.surface_options(),
            Err(ConfigError::BaseMap(_))
        ));
    }
}

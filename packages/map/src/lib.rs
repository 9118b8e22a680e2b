#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map feature-synchronization engine.
//!
//! Turns raw zone, ward, and road records into renderable [`Feature`]s,
//! decides which of them are visible under the current [`FilterState`],
//! tracks the user's [`Selection`], resolves a [`Style`] for each, and
//! keeps a [`MapSurface`] in sync with all of that.
//!
//! The surface never mutates filter or selection state itself. Pointer
//! input comes back out as [`SurfaceEvent`]s and the owning view decides
//! what the new state is, then calls [`MapSurface::sync`] again. Syncing
//! diffs the desired feature set against what each layer already holds,
//! so the outcome does not depend on the order datasets arrived in.

pub mod basemap;
pub mod feature;
pub mod filter;
pub mod hit;
pub mod interaction;
pub mod layer;
pub mod lifecycle;
pub mod selection;
pub mod snapshot;
pub mod style;
pub mod surface;
pub mod view;

pub use basemap::BaseMapProvider;
pub use feature::{Feature, FeatureBuilder, FeatureKey};
pub use filter::{FilterState, is_visible};
pub use interaction::MeasureMode;
pub use layer::{LayerDiff, LayerKind, RenderedFeature};
pub use lifecycle::{MountToken, SurfaceSlot};
pub use selection::Selection;
pub use style::{Color, Style, StyleContext, style_for};
pub use surface::{MapSurface, RenderReport, Scene, SurfaceEvent, SurfaceOptions, Tooltip};
pub use view::{FitOptions, View, Viewport};

use thiserror::Error;

/// Errors raised by the base-map registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BaseMapError {
    /// No provider is registered under this id.
    #[error("Unknown base map provider: {id}")]
    Unknown {
        /// The requested id.
        id: String,
    },
}

//! Per-panel fetch state.

use serde::{Deserialize, Serialize};

/// What a panel shows for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    #[default]
    Loading,
    /// Data arrived; `count` features were built from it.
    Loaded { count: usize },
    /// The fetch failed. Other panels are unaffected.
    Failed(String),
}

impl PanelState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The error message shown in the panel, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Loaded { .. } => None,
        }
    }
}

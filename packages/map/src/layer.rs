//! Vector layers and their reconciliation against a desired feature set.

use std::collections::BTreeMap;
use std::sync::Arc;

use geo::Rect;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use ward_map_records_models::FeatureTag;

use crate::hit::HitIndex;
use crate::{Feature, FeatureKey, Style};

/// The layers of a map surface, bottom to top.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LayerKind {
    /// Raster tiles from the base-map provider.
    Base,
    Zone,
    Ward,
    /// Roads and multi-ward roads.
    Road,
    /// The in-progress measurement sketch.
    Measurement,
}

impl LayerKind {
    /// Vector layers that hold features, bottom to top.
    pub const FEATURE_LAYERS: [Self; 3] = [Self::Zone, Self::Ward, Self::Road];

    /// The layer a tag renders on.
    #[must_use]
    pub const fn for_tag(tag: FeatureTag) -> Self {
        match tag {
            FeatureTag::Zone => Self::Zone,
            FeatureTag::Ward => Self::Ward,
            FeatureTag::Road | FeatureTag::MultiRoad => Self::Road,
        }
    }
}

/// A feature as drawn: the shared feature plus its resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub feature: Arc<Feature>,
    pub style: Style,
    /// Draw position within the layer; higher draws on top.
    pub z: usize,
}

/// What one reconciliation changed on a layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerDiff {
    pub added: Vec<FeatureKey>,
    pub removed: Vec<FeatureKey>,
    /// Kept features whose style or attributes changed.
    pub restyled: Vec<FeatureKey>,
}

impl LayerDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.restyled.is_empty()
    }
}

/// A vector layer holding the features currently rendered on it.
#[derive(Debug)]
pub struct VectorLayer {
    kind: LayerKind,
    visible: bool,
    features: BTreeMap<FeatureKey, RenderedFeature>,
    index: HitIndex,
}

impl VectorLayer {
    #[must_use]
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            visible: true,
            features: BTreeMap::new(),
            index: HitIndex::default(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        self.kind
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &FeatureKey) -> Option<&RenderedFeature> {
        self.features.get(key)
    }

    /// Rendered features in draw order, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = (&FeatureKey, &RenderedFeature)> {
        let mut drawn: Vec<_> = self.features.iter().collect();
        drawn.sort_by_key(|(_, r)| r.z);
        drawn.into_iter()
    }

    /// Brings the layer in line with `desired`.
    ///
    /// Only the difference is applied, so reconciling the same desired set
    /// twice leaves the second diff empty.
    pub fn reconcile(&mut self, mut desired: BTreeMap<FeatureKey, RenderedFeature>) -> LayerDiff {
        let mut diff = LayerDiff::default();
        let mut reindex = false;

        self.features.retain(|key, current| {
            let Some(next) = desired.remove(key) else {
                diff.removed.push(key.clone());
                return false;
            };
            let same_feature =
                Arc::ptr_eq(&current.feature, &next.feature) || current.feature == next.feature;
            if !same_feature || current.style != next.style || current.z != next.z {
                reindex |= !same_feature || current.z != next.z;
                diff.restyled.push(key.clone());
                *current = next;
            }
            true
        });

        for (key, rendered) in desired {
            diff.added.push(key.clone());
            self.features.insert(key, rendered);
        }

        if reindex || !diff.added.is_empty() || !diff.removed.is_empty() {
            self.index = HitIndex::build(self.features.values().map(|r| (&r.feature, r.z)));
        }

        if !diff.is_empty() {
            log::debug!(
                "Layer {}: +{} -{} ~{}",
                self.kind,
                diff.added.len(),
                diff.removed.len(),
                diff.restyled.len()
            );
        }
        diff
    }

    /// Removes every feature.
    pub fn clear(&mut self) {
        self.features.clear();
        self.index = HitIndex::default();
    }

    /// Keys of features under `query`, topmost first. Hidden layers hit
    /// nothing.
    #[must_use]
    pub fn hit(&self, query: Rect<f64>) -> Vec<FeatureKey> {
        if !self.visible {
            return Vec::new();
        }
        self.index.hits(query)
    }
}

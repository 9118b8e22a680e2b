//! R-tree index for pointer hit tests within one layer.

use std::sync::Arc;

use geo::{BoundingRect, Geometry, Intersects, Rect};
use rstar::{AABB, RTree, RTreeObject};

use crate::{Feature, FeatureKey};

struct HitEntry {
    feature: Arc<Feature>,
    z: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for HitEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over the features currently rendered on a layer.
///
/// Rebuilt whenever the layer's feature set changes; restyling does not
/// touch it.
#[derive(Default)]
pub struct HitIndex {
    tree: RTree<HitEntry>,
}

impl std::fmt::Debug for HitIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitIndex")
            .field("size", &self.tree.size())
            .finish()
    }
}

impl HitIndex {
    /// Indexes `features` paired with their draw position.
    pub fn build<'a>(features: impl IntoIterator<Item = (&'a Arc<Feature>, usize)>) -> Self {
        let entries = features
            .into_iter()
            .filter_map(|(feature, z)| {
                compute_envelope(&feature.geometry).map(|envelope| HitEntry {
                    feature: Arc::clone(feature),
                    z,
                    envelope,
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Keys of the features touching `query`, topmost (last drawn) first.
    #[must_use]
    pub fn hits(&self, query: Rect<f64>) -> Vec<FeatureKey> {
        let min = query.min();
        let max = query.max();
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);

        let mut entries: Vec<&HitEntry> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.feature.geometry.intersects(&query))
            .collect();
        entries.sort_unstable_by(|a, b| b.z.cmp(&a.z));
        entries.into_iter().map(|entry| entry.feature.key()).collect()
    }
}

/// Axis-aligned bounding box of a geometry as an rstar envelope.
fn compute_envelope(geometry: &Geometry<f64>) -> Option<AABB<[f64; 2]>> {
    geometry.bounding_rect().map(|rect| {
        AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
    })
}

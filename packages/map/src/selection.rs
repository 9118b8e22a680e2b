//! Ordered set of selected features.
//!
//! Entries are [`FeatureKey`]s: upstream gids are unique only within their
//! own collection, so road "7" and multi-ward road "7" are different
//! selections. Insertion order is kept so the most recent selection can
//! drive view fitting and table scroll-to. Keys that no longer match any
//! loaded feature stay until [`Selection::clear`]; they simply never
//! render.

use serde::{Deserialize, Serialize};
use ward_map_records_models::{FeatureId, FeatureTag};

use crate::FeatureKey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    keys: Vec<FeatureKey>,
}

impl Selection {
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Flips membership of `key`. A newly added key goes to the end.
    ///
    /// Returns whether `key` is selected afterwards.
    pub fn toggle(&mut self, key: FeatureKey) -> bool {
        if let Some(pos) = self.position(&key) {
            self.keys.remove(pos);
            false
        } else {
            self.keys.push(key);
            true
        }
    }

    /// Value-returning form of [`Selection::toggle`].
    #[must_use]
    pub fn toggled(&self, key: FeatureKey) -> Self {
        let mut next = self.clone();
        next.toggle(key);
        next
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[must_use]
    pub fn is_selected(&self, key: &FeatureKey) -> bool {
        self.contains(key.tag, &key.id)
    }

    /// Membership test without building a key.
    #[must_use]
    pub fn contains(&self, tag: FeatureTag, id: &FeatureId) -> bool {
        self.keys.iter().any(|k| k.tag == tag && &k.id == id)
    }

    #[must_use]
    pub fn position(&self, key: &FeatureKey) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    #[must_use]
    pub fn most_recent(&self) -> Option<&FeatureKey> {
        self.keys.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureKey> {
        self.keys.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<FeatureKey> for Selection {
    fn from_iter<T: IntoIterator<Item = FeatureKey>>(iter: T) -> Self {
        let mut selection = Self::new();
        for key in iter {
            if !selection.is_selected(&key) {
                selection.keys.push(key);
            }
        }
        selection
    }
}

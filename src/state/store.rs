/// Gallery Store
///
/// Ordered collection of the items loaded in the current filter session.
/// Items stay sorted by `sort_key`; ties keep arrival order.
use std::collections::HashSet;
use tracing::debug;

use super::data::{GalleryItem, ItemId};

#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    items: Vec<GalleryItem>,
    ids: HashSet<ItemId>,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.ids.clear();
    }

    /// Merge a batch into the collection and return how many were added.
    ///
    /// Items whose id is already present are dropped. The merge is a stable
    /// sort, so already loaded items never move relative to each other.
    pub fn append(&mut self, items: Vec<GalleryItem>) -> usize {
        let before = self.items.len();
        for item in items {
            if self.ids.insert(item.id.clone()) {
                self.items.push(item);
            } else {
                debug!(id = %item.id, "dropping duplicate gallery item");
            }
        }

        let added = self.items.len() - before;
        if added > 0 {
            self.items.sort_by(|a, b| a.sort_key.total_cmp(&b.sort_key));
        }
        added
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }
}

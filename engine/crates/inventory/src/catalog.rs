use std::collections::HashMap;

use crate::item::{Item, ItemSlot, ItemStats};

/// Source of base item attributes, normally the host game's item database.
pub trait ItemCatalog {
    fn base_stats(&self, item_id: i32) -> ItemStats;

    /// Build a fresh live item for a slot, with base stats and no overrides.
    fn instantiate(&self, slot: ItemSlot) -> Item {
        let stats = if slot.is_empty() {
            ItemStats::default()
        } else {
            self.base_stats(slot.item_id)
        };
        Item {
            id: slot.item_id,
            stack: slot.stack,
            prefix: slot.prefix,
            stats,
        }
    }
}

/// Table-backed catalog. Unknown ids resolve to zeroed stats.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    stats: HashMap<i32, ItemStats>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, item_id: i32, stats: ItemStats) -> Self {
        self.insert(item_id, stats);
        self
    }

    pub fn insert(&mut self, item_id: i32, stats: ItemStats) {
        self.stats.insert(item_id, stats);
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl ItemCatalog for StaticCatalog {
    fn base_stats(&self, item_id: i32) -> ItemStats {
        self.stats.get(&item_id).copied().unwrap_or_default()
    }
}

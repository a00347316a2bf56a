use inventory::{InventoryTemplate, ItemOverride, OverrideParam};
use space::{RewardArea, Space, TilePos};

use crate::error::PersistenceError;

/// Write-through storage for arena definitions. Every mutation is written
/// immediately; there is no batching.
///
/// Space rows hold the definition only. Signs and overrides live in their own
/// tables and are attached by `load_spaces`.
pub trait ArenaStore {
    fn load_spaces(&self) -> Result<Vec<Space>, PersistenceError>;
    fn save_space(&self, space: &Space) -> Result<(), PersistenceError>;
    /// Removes the space together with its signs and overrides.
    fn delete_space(&self, name: &str) -> Result<(), PersistenceError>;

    /// Link a sign coordinate, replacing any previous link at that coordinate.
    fn save_sign(&self, space: &str, pos: TilePos) -> Result<(), PersistenceError>;
    fn delete_sign(&self, pos: TilePos) -> Result<(), PersistenceError>;

    fn save_override(&self, space: &str, ov: &ItemOverride) -> Result<(), PersistenceError>;
    fn delete_override(
        &self,
        space: &str,
        item_id: i32,
        param: OverrideParam,
    ) -> Result<(), PersistenceError>;

    fn load_templates(&self) -> Result<Vec<(String, InventoryTemplate)>, PersistenceError>;
    fn save_template(&self, name: &str, template: &InventoryTemplate) -> Result<(), PersistenceError>;
    fn delete_template(&self, name: &str) -> Result<(), PersistenceError>;

    fn load_reward_areas(&self) -> Result<Vec<RewardArea>, PersistenceError>;
    fn save_reward_area(&self, area: &RewardArea) -> Result<(), PersistenceError>;
}

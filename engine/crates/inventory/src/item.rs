use serde::{Deserialize, Serialize};

/// Slot contents as carried by the base wire protocol: id, stack and prefix only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemSlot {
    pub item_id: i32,
    pub stack: i32,
    pub prefix: u8,
}

impl ItemSlot {
    pub const EMPTY: ItemSlot = ItemSlot {
        item_id: 0,
        stack: 0,
        prefix: 0,
    };

    pub fn new(item_id: i32, stack: i32, prefix: u8) -> Self {
        Self {
            item_id,
            stack,
            prefix,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_id == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Combat and use attributes of a live item. Overrides transform these.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStats {
    pub damage: i32,
    pub knockback: f32,
    pub crit: i32,
    pub mana: i32,
    pub color: Option<Rgb>,
    pub shoot_speed: f32,
    pub shoot: i32,
    pub use_time: i32,
    pub use_animation: i32,
}

/// A live item instance held by a player or lying in the world.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    pub id: i32,
    pub stack: i32,
    pub prefix: u8,
    pub stats: ItemStats,
}

impl Item {
    pub fn to_slot(&self) -> ItemSlot {
        ItemSlot::new(self.id, self.stack, self.prefix)
    }
}

use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::item::{Item, ItemSlot};

pub const INVENTORY_SLOTS: usize = 59;
pub const ARMOR_SLOTS: usize = 20;
pub const DYE_SLOTS: usize = 10;
pub const MISC_EQUIP_SLOTS: usize = 5;
pub const MISC_DYE_SLOTS: usize = 5;
pub const TOTAL_SLOTS: usize =
    INVENTORY_SLOTS + ARMOR_SLOTS + DYE_SLOTS + MISC_EQUIP_SLOTS + MISC_DYE_SLOTS;

/// Equipment categories in wire order. Each maps to a contiguous range of
/// slot indices in the base protocol's slot-update message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotCategory {
    Inventory,
    Armor,
    Dye,
    MiscEquip,
    MiscDye,
}

impl SlotCategory {
    pub const ALL: [SlotCategory; 5] = [
        SlotCategory::Inventory,
        SlotCategory::Armor,
        SlotCategory::Dye,
        SlotCategory::MiscEquip,
        SlotCategory::MiscDye,
    ];

    pub fn len(self) -> usize {
        match self {
            Self::Inventory => INVENTORY_SLOTS,
            Self::Armor => ARMOR_SLOTS,
            Self::Dye => DYE_SLOTS,
            Self::MiscEquip => MISC_EQUIP_SLOTS,
            Self::MiscDye => MISC_DYE_SLOTS,
        }
    }

    /// First wire slot index of this category.
    pub fn wire_offset(self) -> usize {
        match self {
            Self::Inventory => 0,
            Self::Armor => INVENTORY_SLOTS,
            Self::Dye => INVENTORY_SLOTS + ARMOR_SLOTS,
            Self::MiscEquip => INVENTORY_SLOTS + ARMOR_SLOTS + DYE_SLOTS,
            Self::MiscDye => INVENTORY_SLOTS + ARMOR_SLOTS + DYE_SLOTS + MISC_EQUIP_SLOTS,
        }
    }
}

/// Every (category, index within category, wire slot) triple in wire order.
pub fn wire_slots() -> impl Iterator<Item = (SlotCategory, usize, usize)> {
    SlotCategory::ALL.into_iter().flat_map(|cat| {
        (0..cat.len()).map(move |i| (cat, i, cat.wire_offset() + i))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub life: i32,
    pub life_max: i32,
    pub mana: i32,
    pub mana_max: i32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            life: 100,
            life_max: 100,
            mana: 20,
            mana_max: 20,
        }
    }
}

/// A portable inventory + vitals snapshot. Used both for named loadouts and
/// for the lobby belongings saved while a player occupies a space.
///
/// Category lists may be shorter than the fixed slot counts; missing slots
/// read as empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryTemplate {
    pub items: Vec<ItemSlot>,
    pub armor: Vec<ItemSlot>,
    pub dyes: Vec<ItemSlot>,
    pub misc_equips: Vec<ItemSlot>,
    pub misc_dyes: Vec<ItemSlot>,
    pub vitals: Vitals,
}

impl InventoryTemplate {
    /// A template with every category filled to its full length with empty slots.
    pub fn empty() -> Self {
        let mut tpl = Self::default();
        for cat in SlotCategory::ALL {
            *tpl.category_mut(cat) = vec![ItemSlot::EMPTY; cat.len()];
        }
        tpl
    }

    pub fn category(&self, cat: SlotCategory) -> &[ItemSlot] {
        match cat {
            SlotCategory::Inventory => &self.items,
            SlotCategory::Armor => &self.armor,
            SlotCategory::Dye => &self.dyes,
            SlotCategory::MiscEquip => &self.misc_equips,
            SlotCategory::MiscDye => &self.misc_dyes,
        }
    }

    pub fn category_mut(&mut self, cat: SlotCategory) -> &mut Vec<ItemSlot> {
        match cat {
            SlotCategory::Inventory => &mut self.items,
            SlotCategory::Armor => &mut self.armor,
            SlotCategory::Dye => &mut self.dyes,
            SlotCategory::MiscEquip => &mut self.misc_equips,
            SlotCategory::MiscDye => &mut self.misc_dyes,
        }
    }

    pub fn slot(&self, cat: SlotCategory, index: usize) -> ItemSlot {
        self.category(cat)
            .get(index)
            .copied()
            .unwrap_or(ItemSlot::EMPTY)
    }

    /// Ids of every non-empty slot, in wire order.
    pub fn item_ids(&self) -> impl Iterator<Item = i32> + '_ {
        wire_slots()
            .map(|(cat, i, _)| self.slot(cat, i))
            .filter(|s| !s.is_empty())
            .map(|s| s.item_id)
    }
}

/// The live equipment of a connected player. Every category always holds its
/// full fixed slot count.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInventory {
    pub items: Vec<Item>,
    pub armor: Vec<Item>,
    pub dyes: Vec<Item>,
    pub misc_equips: Vec<Item>,
    pub misc_dyes: Vec<Item>,
    pub vitals: Vitals,
}

impl Default for PlayerInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerInventory {
    pub fn new() -> Self {
        Self {
            items: vec![Item::default(); INVENTORY_SLOTS],
            armor: vec![Item::default(); ARMOR_SLOTS],
            dyes: vec![Item::default(); DYE_SLOTS],
            misc_equips: vec![Item::default(); MISC_EQUIP_SLOTS],
            misc_dyes: vec![Item::default(); MISC_DYE_SLOTS],
            vitals: Vitals::default(),
        }
    }

    pub fn category(&self, cat: SlotCategory) -> &[Item] {
        match cat {
            SlotCategory::Inventory => &self.items,
            SlotCategory::Armor => &self.armor,
            SlotCategory::Dye => &self.dyes,
            SlotCategory::MiscEquip => &self.misc_equips,
            SlotCategory::MiscDye => &self.misc_dyes,
        }
    }

    pub fn category_mut(&mut self, cat: SlotCategory) -> &mut [Item] {
        match cat {
            SlotCategory::Inventory => &mut self.items,
            SlotCategory::Armor => &mut self.armor,
            SlotCategory::Dye => &mut self.dyes,
            SlotCategory::MiscEquip => &mut self.misc_equips,
            SlotCategory::MiscDye => &mut self.misc_dyes,
        }
    }
}

/// Snapshot a live inventory. Reads exactly the fixed slot counts.
pub fn capture(live: &PlayerInventory) -> InventoryTemplate {
    let mut tpl = InventoryTemplate {
        vitals: live.vitals,
        ..Default::default()
    };
    for cat in SlotCategory::ALL {
        let slots = tpl.category_mut(cat);
        slots.extend(
            live.category(cat)
                .iter()
                .take(cat.len())
                .map(Item::to_slot),
        );
        slots.resize(cat.len(), ItemSlot::EMPTY);
    }
    tpl
}

/// Overwrite a live inventory from a snapshot. Slots past the snapshot's
/// recorded length become empty; vitals are copied verbatim.
pub fn apply(template: &InventoryTemplate, live: &mut PlayerInventory, catalog: &dyn ItemCatalog) {
    for cat in SlotCategory::ALL {
        let target = live.category_mut(cat);
        for (i, item) in target.iter_mut().enumerate() {
            *item = catalog.instantiate(template.slot(cat, i));
        }
    }
    live.vitals = template.vitals;
}

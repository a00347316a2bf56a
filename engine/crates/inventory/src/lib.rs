pub mod catalog;
pub mod item;
pub mod overrides;
pub mod snapshot;

pub use catalog::{ItemCatalog, StaticCatalog};
pub use item::{Item, ItemSlot, ItemStats, Rgb};
pub use overrides::{apply_override, ItemOverride, OverrideError, OverrideKind, OverrideParam};
pub use snapshot::{
    apply, capture, wire_slots, InventoryTemplate, PlayerInventory, SlotCategory, Vitals,
    TOTAL_SLOTS,
};

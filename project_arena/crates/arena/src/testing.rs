//! Shared fixtures for unit tests.

use inventory::{InventoryTemplate, ItemCatalog, ItemOverride, ItemSlot, ItemStats, OverrideParam, StaticCatalog};
use net::{ChannelHost, HostCommand, LivePlayer};
use persistence::{ArenaStore, PersistenceError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use session::PlayerId;
use space::{RewardArea, Space, TilePos};
use tokio::sync::mpsc;

use crate::settings::ArenaSettings;
use crate::state::ArenaCore;

pub const SWORD: i32 = 100;
pub const BOW: i32 = 200;

pub fn catalog() -> Box<dyn ItemCatalog + Send> {
    Box::new(
        StaticCatalog::new()
            .with(
                SWORD,
                ItemStats {
                    damage: 10,
                    use_time: 20,
                    use_animation: 20,
                    ..Default::default()
                },
            )
            .with(
                BOW,
                ItemStats {
                    damage: 6,
                    shoot_speed: 7.0,
                    ..Default::default()
                },
            ),
    )
}

pub fn host() -> (ChannelHost, mpsc::UnboundedReceiver<HostCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelHost::new(tx), rx)
}

pub fn connect(host: &mut ChannelHost, id: u16, name: &str) {
    host.connect(LivePlayer::new(PlayerId(id), name));
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<HostCommand>) -> Vec<HostCommand> {
    let mut out = Vec::new();
    while let Ok(cmd) = rx.try_recv() {
        out.push(cmd);
    }
    out
}

pub fn kit(item_id: i32) -> InventoryTemplate {
    let mut tpl = InventoryTemplate::empty();
    tpl.items[0] = ItemSlot::new(item_id, 1, 0);
    tpl
}

/// Core with "Arena" (capacity 2, limited "murderer" x1) and three templates.
pub fn core() -> ArenaCore {
    let mut core = ArenaCore::with_rng(catalog(), ArenaSettings::default(), StdRng::seed_from_u64(7));
    core.templates.insert("murderer".into(), kit(SWORD));
    core.templates.insert("innocent".into(), kit(BOW));
    core.templates.insert("detective".into(), kit(BOW));

    let mut space = Space::new("Arena", TilePos::new(50, 60));
    space.capacity = 2;
    for t in ["murderer", "innocent", "detective"] {
        space.add_template(t).unwrap();
    }
    space.limited.enabled = true;
    space.limited.capacity = 1;
    space.limited.template = "murderer".into();
    core.spaces.upsert(space);
    core
}

/// A store whose every operation fails.
pub struct FailingStore;

fn down() -> PersistenceError {
    PersistenceError::Unavailable("test store is down".into())
}

impl ArenaStore for FailingStore {
    fn load_spaces(&self) -> Result<Vec<Space>, PersistenceError> {
        Err(down())
    }
    fn save_space(&self, _: &Space) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn delete_space(&self, _: &str) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn save_sign(&self, _: &str, _: TilePos) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn delete_sign(&self, _: TilePos) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn save_override(&self, _: &str, _: &ItemOverride) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn delete_override(&self, _: &str, _: i32, _: OverrideParam) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn load_templates(&self) -> Result<Vec<(String, InventoryTemplate)>, PersistenceError> {
        Err(down())
    }
    fn save_template(&self, _: &str, _: &InventoryTemplate) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn delete_template(&self, _: &str) -> Result<(), PersistenceError> {
        Err(down())
    }
    fn load_reward_areas(&self) -> Result<Vec<RewardArea>, PersistenceError> {
        Err(down())
    }
    fn save_reward_area(&self, _: &RewardArea) -> Result<(), PersistenceError> {
        Err(down())
    }
}

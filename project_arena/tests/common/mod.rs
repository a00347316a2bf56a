#![allow(dead_code)]

use arena::{ArenaCore, ArenaSettings};
use inventory::{ItemSlot, ItemStats, StaticCatalog};
use net::{ChannelHost, Host, HostCommand, LivePlayer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use session::PlayerId;
use space::TilePos;
use tokio::sync::mpsc;

pub const SWORD: i32 = 100;
pub const BOW: i32 = 200;
pub const STAFF: i32 = 300;

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with(SWORD, ItemStats { damage: 10, ..Default::default() })
        .with(BOW, ItemStats { damage: 6, shoot_speed: 7.0, ..Default::default() })
        .with(STAFF, ItemStats { damage: 8, mana: 10, ..Default::default() })
}

pub fn host() -> (ChannelHost, mpsc::UnboundedReceiver<HostCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelHost::new(tx), rx)
}

pub fn connect(host: &mut ChannelHost, id: u16, name: &str) -> PlayerId {
    host.connect(LivePlayer::new(PlayerId(id), name));
    PlayerId(id)
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<HostCommand>) -> Vec<HostCommand> {
    let mut out = Vec::new();
    while let Ok(cmd) = rx.try_recv() {
        out.push(cmd);
    }
    out
}

pub fn empty_core(seed: u64) -> ArenaCore {
    ArenaCore::with_rng(Box::new(catalog()), ArenaSettings::default(), StdRng::seed_from_u64(seed))
}

/// "Arena": capacity 2, pool murderer/innocent/detective, murderer limited to one.
pub fn murder_core(seed: u64) -> ArenaCore {
    let mut core = empty_core(seed);
    core.create_space("Arena", TilePos::new(100, 200)).unwrap();
    core.set_capacity("Arena", 2).unwrap();
    for (name, item) in [("murderer", SWORD), ("innocent", BOW), ("detective", STAFF)] {
        core.create_empty_template(name).unwrap();
        core.set_template_item(name, "items0", ItemSlot::new(item, 1, 0)).unwrap();
        core.add_template("Arena", name).unwrap();
    }
    core.set_limited_loadout("Arena", 1, Some("murderer")).unwrap();
    core
}

pub fn held_item(host: &ChannelHost, player: PlayerId) -> i32 {
    host.player(player).unwrap().inventory.items[0].id
}

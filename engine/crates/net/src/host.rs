use inventory::{Item, PlayerInventory};
use session::PlayerId;
use space::TilePos;

use crate::protocol::Tone;

/// Host-side view of a connected player.
#[derive(Debug, Clone, PartialEq)]
pub struct LivePlayer {
    pub id: PlayerId,
    pub name: String,
    pub inventory: PlayerInventory,
    pub hostile: bool,
    pub position: TilePos,
}

impl LivePlayer {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            inventory: PlayerInventory::new(),
            hostile: false,
            position: TilePos::default(),
        }
    }
}

/// Synchronous calls into the host game server. Every call completes before
/// returning; ordering of calls to one player is preserved on the wire.
pub trait Host {
    fn player(&self, id: PlayerId) -> Option<&LivePlayer>;
    fn player_mut(&mut self, id: PlayerId) -> Option<&mut LivePlayer>;
    fn online_players(&self) -> Vec<PlayerId>;

    /// Push one inventory slot (wire index) to its owner.
    fn send_slot(&mut self, id: PlayerId, slot: usize, item: &Item);
    fn send_raw(&mut self, id: PlayerId, bytes: Vec<u8>);
    /// Full equipment/vitals refresh, sent before a bulk restore.
    fn refresh_view(&mut self, id: PlayerId);
    fn sync_vitals(&mut self, id: PlayerId);
    fn sync_pvp(&mut self, id: PlayerId);
    fn set_buff(&mut self, id: PlayerId, buff: i32, ticks: i32);
    fn teleport(&mut self, id: PlayerId, pos: TilePos);
    fn message(&mut self, id: PlayerId, tone: Tone, text: &str);
    fn sync_world_item(&mut self, index: i32, item: &Item);

    fn broadcast(&mut self, ids: &[PlayerId], tone: Tone, text: &str) {
        for &id in ids {
            self.message(id, tone, text);
        }
    }
}

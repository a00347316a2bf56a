use std::collections::BTreeMap;

use inventory::Item;
use session::PlayerId;
use space::TilePos;
use tokio::sync::mpsc;

use crate::host::{Host, LivePlayer};
use crate::protocol::{HostCommand, HostEvent, Tone};

/// Sender from the input reader to the event loop.
pub type EventTx = mpsc::UnboundedSender<HostEvent>;
/// Receiver in the event loop for host events.
pub type EventRx = mpsc::UnboundedReceiver<HostEvent>;

/// Sender from the event loop to the output router.
pub type CommandTx = mpsc::UnboundedSender<HostCommand>;
/// Receiver in the output router for host commands.
pub type CommandRx = mpsc::UnboundedReceiver<HostCommand>;

/// Per-player write channel (output router -> writer task), one JSON line per message.
pub type PlayerWriteTx = mpsc::UnboundedSender<String>;
pub type PlayerWriteRx = mpsc::UnboundedReceiver<String>;

/// Registration message for the output router.
#[derive(Debug)]
pub struct RegisterPlayer {
    pub player: PlayerId,
    pub write_tx: PlayerWriteTx,
}

pub type RegisterTx = mpsc::UnboundedSender<RegisterPlayer>;
pub type RegisterRx = mpsc::UnboundedReceiver<RegisterPlayer>;

pub type UnregisterTx = mpsc::UnboundedSender<PlayerId>;
pub type UnregisterRx = mpsc::UnboundedReceiver<PlayerId>;

/// `Host` backed by a mirror of connected players. State changes apply to the
/// mirror immediately and are forwarded as `HostCommand`s.
#[derive(Debug)]
pub struct ChannelHost {
    players: BTreeMap<PlayerId, LivePlayer>,
    tx: CommandTx,
}

impl ChannelHost {
    pub fn new(tx: CommandTx) -> Self {
        Self {
            players: BTreeMap::new(),
            tx,
        }
    }

    pub fn connect(&mut self, player: LivePlayer) {
        tracing::debug!(player = ?player.id, name = %player.name, "host player connected");
        self.players.insert(player.id, player);
    }

    pub fn disconnect(&mut self, id: PlayerId) -> Option<LivePlayer> {
        self.players.remove(&id)
    }

    fn send(&self, cmd: HostCommand) {
        if self.tx.send(cmd).is_err() {
            tracing::debug!("host command channel closed");
        }
    }
}

impl Host for ChannelHost {
    fn player(&self, id: PlayerId) -> Option<&LivePlayer> {
        self.players.get(&id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut LivePlayer> {
        self.players.get_mut(&id)
    }

    fn online_players(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    fn send_slot(&mut self, id: PlayerId, slot: usize, item: &Item) {
        self.send(HostCommand::Slot {
            player: id,
            slot,
            item_id: item.id,
            stack: item.stack,
            prefix: item.prefix,
        });
    }

    fn send_raw(&mut self, id: PlayerId, bytes: Vec<u8>) {
        self.send(HostCommand::Raw { player: id, bytes });
    }

    fn refresh_view(&mut self, id: PlayerId) {
        self.send(HostCommand::RefreshView { player: id });
    }

    fn sync_vitals(&mut self, id: PlayerId) {
        let Some(p) = self.players.get(&id) else {
            return;
        };
        let v = p.inventory.vitals;
        self.send(HostCommand::Vitals {
            player: id,
            life: v.life,
            life_max: v.life_max,
            mana: v.mana,
            mana_max: v.mana_max,
        });
    }

    fn sync_pvp(&mut self, id: PlayerId) {
        let Some(p) = self.players.get(&id) else {
            return;
        };
        let hostile = p.hostile;
        self.send(HostCommand::Pvp {
            player: id,
            hostile,
        });
    }

    fn set_buff(&mut self, id: PlayerId, buff: i32, ticks: i32) {
        self.send(HostCommand::Buff {
            player: id,
            buff,
            ticks,
        });
    }

    fn teleport(&mut self, id: PlayerId, pos: TilePos) {
        if let Some(p) = self.players.get_mut(&id) {
            p.position = pos;
        }
        self.send(HostCommand::Teleport {
            player: id,
            x: pos.x,
            y: pos.y,
        });
    }

    fn message(&mut self, id: PlayerId, tone: Tone, text: &str) {
        self.send(HostCommand::Message {
            player: id,
            tone,
            text: text.to_string(),
        });
    }

    fn sync_world_item(&mut self, index: i32, item: &Item) {
        self.send(HostCommand::WorldItem {
            index,
            item_id: item.id,
            stack: item.stack,
            prefix: item.prefix,
            stats: item.stats,
        });
    }
}

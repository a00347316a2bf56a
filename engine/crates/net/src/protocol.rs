use inventory::{InventoryTemplate, ItemSlot, ItemStats};
use serde::{Deserialize, Serialize};
use session::PlayerId;
use space::TilePos;

/// Event reported by the host game server (internally tagged JSON).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Connect {
        player: PlayerId,
        name: String,
        #[serde(default)]
        hostile: bool,
        #[serde(default)]
        position: TilePos,
        #[serde(default)]
        inventory: Option<InventoryTemplate>,
    },
    Disconnect {
        player: PlayerId,
    },
    Move {
        player: PlayerId,
        x: i32,
        y: i32,
    },
    /// The player's live inventory changed on the host (pickups, crafting).
    Inventory {
        player: PlayerId,
        inventory: InventoryTemplate,
    },
    Pvp {
        player: PlayerId,
        hostile: bool,
    },
    Join {
        player: PlayerId,
        space: String,
    },
    Leave {
        player: PlayerId,
    },
    Pick {
        player: PlayerId,
        template: String,
    },
    Sign {
        player: PlayerId,
        x: i32,
        y: i32,
    },
    /// Respawn after death.
    Death {
        player: PlayerId,
    },
    Chat {
        player: PlayerId,
        text: String,
    },
    Drop {
        player: PlayerId,
        index: i32,
        item: ItemSlot,
    },
    Admin {
        player: PlayerId,
        command: AdminCommand,
    },
}

impl HostEvent {
    pub fn player(&self) -> PlayerId {
        match self {
            Self::Connect { player, .. }
            | Self::Disconnect { player }
            | Self::Move { player, .. }
            | Self::Inventory { player, .. }
            | Self::Pvp { player, .. }
            | Self::Join { player, .. }
            | Self::Leave { player }
            | Self::Pick { player, .. }
            | Self::Sign { player, .. }
            | Self::Death { player }
            | Self::Chat { player, .. }
            | Self::Drop { player, .. }
            | Self::Admin { player, .. } => *player,
        }
    }
}

/// Administrative operation. Positions default to the issuing admin's tile.
/// Numeric arguments are signed so range errors reach the validator.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AdminCommand {
    CreateSpace {
        name: String,
    },
    DeleteSpace {
        name: String,
    },
    SetCapacity {
        space: String,
        capacity: i64,
    },
    SetSpawn {
        space: String,
    },
    AddTemplate {
        space: String,
        template: String,
    },
    RemoveTemplate {
        space: String,
        template: String,
    },
    SpaceTemplates {
        space: String,
    },
    SetLimited {
        space: String,
        count: i64,
        #[serde(default)]
        template: Option<String>,
    },
    SetDeathTemplate {
        space: String,
        #[serde(default)]
        template: Option<String>,
    },
    SetDeathSpawn {
        space: String,
    },
    SetEntryBuff {
        space: String,
        buff: i32,
    },
    SetCountdown {
        space: String,
        secs: i64,
    },
    ListSpaces,
    SaveTemplate {
        name: String,
    },
    CreateTemplate {
        name: String,
    },
    DeleteTemplate {
        name: String,
    },
    ListTemplates,
    SetTemplateVitals {
        name: String,
        life: i32,
        life_max: i32,
        mana: i32,
        mana_max: i32,
    },
    SetTemplateItem {
        name: String,
        slot: String,
        item_id: i32,
        #[serde(default = "default_stack")]
        stack: i32,
        #[serde(default)]
        prefix: u8,
    },
    SetOverride {
        space: String,
        item_id: i32,
        param: String,
        value: String,
    },
    GetOverride {
        space: String,
        item_id: i32,
        param: String,
    },
    ListOverrides {
        space: String,
        #[serde(default)]
        item_id: Option<i32>,
    },
    RemoveOverride {
        space: String,
        item_id: i32,
        param: String,
    },
    LinkSign {
        space: String,
    },
    UnlinkSign,
    AddRewardArea {
        name: String,
        radius: i32,
        reward: i64,
        cooldown_secs: i64,
    },
}

fn default_stack() -> i32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Success,
    Error,
    Notice,
    Chat,
}

/// Instruction to the host game server (internally tagged JSON).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    Slot {
        player: PlayerId,
        slot: usize,
        item_id: i32,
        stack: i32,
        prefix: u8,
    },
    Raw {
        player: PlayerId,
        bytes: Vec<u8>,
    },
    RefreshView {
        player: PlayerId,
    },
    Vitals {
        player: PlayerId,
        life: i32,
        life_max: i32,
        mana: i32,
        mana_max: i32,
    },
    Pvp {
        player: PlayerId,
        hostile: bool,
    },
    Buff {
        player: PlayerId,
        buff: i32,
        ticks: i32,
    },
    Teleport {
        player: PlayerId,
        x: i32,
        y: i32,
    },
    Message {
        player: PlayerId,
        tone: Tone,
        text: String,
    },
    /// Re-sync a world item to every client.
    WorldItem {
        index: i32,
        item_id: i32,
        stack: i32,
        prefix: u8,
        stats: ItemStats,
    },
}

impl HostCommand {
    /// Target player, `None` for world-wide commands.
    pub fn recipient(&self) -> Option<PlayerId> {
        match self {
            Self::Slot { player, .. }
            | Self::Raw { player, .. }
            | Self::RefreshView { player }
            | Self::Vitals { player, .. }
            | Self::Pvp { player, .. }
            | Self::Buff { player, .. }
            | Self::Teleport { player, .. }
            | Self::Message { player, .. } => Some(*player),
            Self::WorldItem { .. } => None,
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;

use inventory::InventoryTemplate;
use serde::{Deserialize, Serialize};
use space::registry::name_key;
use space::TilePos;

/// Connected-player slot assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u16);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State held only while a player occupies a space.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupancy {
    /// Space name as stored in the registry.
    pub space: String,
    /// Belongings captured at the most recent join.
    pub lobby_inventory: InventoryTemplate,
    /// PvP flag observed immediately before joining.
    pub original_pvp: bool,
    pub has_limited_loadout: bool,
    /// Sticky loadout preference for re-entry.
    pub selected_loadout: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Lobby,
    InSpace(Occupancy),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignClick {
    pub pos: TilePos,
    /// Unix milliseconds.
    pub at_ms: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub player: PlayerId,
    pub state: SessionState,
    /// Space the next sign interaction links to.
    pub pending_sign_link: Option<String>,
    pub pending_sign_unlink: bool,
    pub last_sign_click: Option<SignClick>,
}

impl PlayerSession {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            state: SessionState::Lobby,
            pending_sign_link: None,
            pending_sign_unlink: false,
            last_sign_click: None,
        }
    }

    pub fn occupancy(&self) -> Option<&Occupancy> {
        match &self.state {
            SessionState::InSpace(occ) => Some(occ),
            SessionState::Lobby => None,
        }
    }

    pub fn occupancy_mut(&mut self) -> Option<&mut Occupancy> {
        match &mut self.state {
            SessionState::InSpace(occ) => Some(occ),
            SessionState::Lobby => None,
        }
    }

    pub fn current_space(&self) -> Option<&str> {
        self.occupancy().map(|o| o.space.as_str())
    }

    pub fn is_in(&self, space: &str) -> bool {
        self.current_space()
            .is_some_and(|s| name_key(s) == name_key(space))
    }

    /// Leave the space, handing back what must be restored.
    pub fn take_occupancy(&mut self) -> Option<Occupancy> {
        match std::mem::take(&mut self.state) {
            SessionState::InSpace(occ) => Some(occ),
            SessionState::Lobby => None,
        }
    }
}

/// Sessions of connected players, created lazily on first relevant event.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: BTreeMap<PlayerId, PlayerSession>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(&player)
    }

    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(&player)
    }

    pub fn get_or_create(&mut self, player: PlayerId) -> &mut PlayerSession {
        self.sessions
            .entry(player)
            .or_insert_with(|| PlayerSession::new(player))
    }

    pub fn remove(&mut self, player: PlayerId) -> Option<PlayerSession> {
        self.sessions.remove(&player)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn space_of(&self, player: PlayerId) -> Option<&str> {
        self.sessions.get(&player)?.current_space()
    }

    pub fn occupancy(&self, player: PlayerId) -> Option<&Occupancy> {
        self.sessions.get(&player)?.occupancy()
    }

    /// Occupants of a space, in player order.
    pub fn occupants(&self, space: &str) -> Vec<PlayerId> {
        self.sessions
            .values()
            .filter(|s| s.is_in(space))
            .map(|s| s.player)
            .collect()
    }

    pub fn occupant_count(&self, space: &str) -> usize {
        self.sessions.values().filter(|s| s.is_in(space)).count()
    }

    /// Players in any space.
    pub fn in_space(&self) -> Vec<PlayerId> {
        self.sessions
            .values()
            .filter(|s| s.occupancy().is_some())
            .map(|s| s.player)
            .collect()
    }

    /// Sessions in any space.
    pub fn in_space_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.occupancy().is_some())
            .count()
    }

    /// Occupants of `space` holding its limited loadout, not counting `excluding`.
    pub fn limited_holders(&self, space: &str, excluding: PlayerId) -> usize {
        self.sessions
            .values()
            .filter(|s| s.player != excluding && s.is_in(space))
            .filter(|s| s.occupancy().is_some_and(|o| o.has_limited_loadout))
            .count()
    }

    /// Drop pending sign-link requests that target `space`.
    pub fn clear_pending_links(&mut self, space: &str) {
        let key = name_key(space);
        for s in self.sessions.values_mut() {
            if s.pending_sign_link.as_deref().is_some_and(|n| name_key(n) == key) {
                s.pending_sign_link = None;
            }
        }
    }
}

use inventory::{capture, InventoryTemplate, ItemSlot};
use net::{Host, Tone};
use session::{Occupancy, PlayerId, SessionState};
use space::TilePos;

use crate::allocator::{self, Allocation};
use crate::error::ArenaError;
use crate::state::ArenaCore;
use crate::sync::{override_world_item, sync_inventory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    pub space: String,
    pub allocation: Allocation,
    pub spawn: TilePos,
    pub override_packets: usize,
}

fn display_name(host: &dyn Host, player: PlayerId) -> String {
    host.player(player)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| player.to_string())
}

impl ArenaCore {
    /// Enter `space_name`. Commands, sign double-clicks and scripted joins
    /// all come through here.
    ///
    /// A full space rejects the join before anything changes. A player in
    /// another space leaves it first; a player re-entering the space they are
    /// in keeps the lobby snapshot and PvP flag from their original entry.
    pub fn join(
        &mut self,
        host: &mut dyn Host,
        player: PlayerId,
        space_name: &str,
        now_ms: i64,
    ) -> Result<JoinReport, ArenaError> {
        if host.player(player).is_none() {
            return Err(ArenaError::PlayerOffline(player));
        }
        let space = self.spaces.require(space_name)?;
        let space_name = space.name.clone();
        let capacity = space.capacity;

        let rejoin = self
            .sessions
            .get(player)
            .is_some_and(|s| s.is_in(&space_name));
        let others = self.sessions.occupant_count(&space_name) - usize::from(rejoin);
        if others >= capacity as usize {
            tracing::debug!(player = ?player, space = %space_name, capacity, "join rejected, space full");
            return Err(ArenaError::SpaceFull {
                space: space_name,
                capacity,
            });
        }

        if !rejoin && self.sessions.space_of(player).is_some() {
            self.leave(host, player)?;
        }

        let previous = if rejoin {
            self.sessions
                .get_mut(player)
                .and_then(|s| s.take_occupancy())
        } else {
            None
        };
        let (lobby_inventory, original_pvp, preference) = match previous {
            Some(occ) => (occ.lobby_inventory, occ.original_pvp, occ.selected_loadout),
            None => {
                let live = host
                    .player(player)
                    .ok_or(ArenaError::PlayerOffline(player))?;
                (capture(&live.inventory), live.hostile, None)
            }
        };

        let holders = self.sessions.limited_holders(&space_name, player);
        let space = self.spaces.require_mut(&space_name)?;
        let allocation = allocator::select(space, preference.as_deref(), holders, &mut self.rng);
        let spawn = self
            .spawns
            .resolve(space, now_ms.div_euclid(1000), &mut self.rng);
        let entry_buff = space.entry_buff;

        self.sessions.get_or_create(player).state = SessionState::InSpace(Occupancy {
            space: space_name.clone(),
            lobby_inventory,
            original_pvp,
            has_limited_loadout: allocation.is_limited(),
            selected_loadout: preference,
        });

        if let Some(live) = host.player_mut(player) {
            live.hostile = true;
        }
        host.sync_pvp(player);

        let override_packets = self.apply_loadout(host, player, &space_name, allocation.template());

        if spawn.refreshed {
            self.persist_space(&space_name);
        }
        host.teleport(player, spawn.target);

        if let Some(buff) = entry_buff {
            host.set_buff(player, buff, self.settings.entry_buff_ticks);
        }

        let name = display_name(host, player);
        host.message(player, Tone::Success, &format!("Welcome to space '{space_name}'!"));
        let others: Vec<PlayerId> = self
            .sessions
            .occupants(&space_name)
            .into_iter()
            .filter(|&p| p != player)
            .collect();
        host.broadcast(&others, Tone::Notice, &format!("{name} joined the space!"));

        tracing::info!(
            player = ?player,
            space = %space_name,
            template = ?allocation.template(),
            limited = allocation.is_limited(),
            "player joined space"
        );

        Ok(JoinReport {
            space: space_name,
            allocation,
            spawn: spawn.target,
            override_packets,
        })
    }

    /// Return to the lobby: restore the snapshot from the most recent join
    /// (no overrides) and the PvP flag seen before it. Returns the space left.
    pub fn leave(&mut self, host: &mut dyn Host, player: PlayerId) -> Result<String, ArenaError> {
        let occ = self
            .sessions
            .get_mut(player)
            .and_then(|s| s.take_occupancy())
            .ok_or(ArenaError::NotInSpace)?;

        if host.player(player).is_some() {
            sync_inventory(host, player, &occ.lobby_inventory, None, self.catalog.as_ref());
            if let Some(live) = host.player_mut(player) {
                live.hostile = occ.original_pvp;
            }
            host.sync_pvp(player);
            host.message(player, Tone::Success, &format!("You left space '{}'.", occ.space));
        } else {
            tracing::warn!(player = ?player, space = %occ.space, "left space while offline, nothing restored");
        }

        let name = display_name(host, player);
        let remaining = self.sessions.occupants(&occ.space);
        host.broadcast(&remaining, Tone::Notice, &format!("{name} left the space!"));

        tracing::info!(player = ?player, space = %occ.space, "player left space");
        Ok(occ.space)
    }

    /// Respawn inside a space: death loadout (with overrides) and death spawn,
    /// when configured. Occupancy and PvP are untouched. Returns false when the
    /// player is not in a space.
    pub fn on_death(&mut self, host: &mut dyn Host, player: PlayerId) -> bool {
        let Some(space_name) = self.sessions.space_of(player).map(str::to_string) else {
            return false;
        };
        let Some(space) = self.spaces.get(&space_name) else {
            tracing::warn!(player = ?player, space = %space_name, "occupied space no longer exists");
            return false;
        };
        let death_template = space.death_template.clone();
        let death_spawn = space.death_spawn;

        if let Some(template) = death_template.as_deref() {
            self.apply_loadout(host, player, &space_name, Some(template));
        }
        if let Some(pos) = death_spawn {
            host.teleport(player, pos);
        }
        tracing::info!(player = ?player, space = %space_name, template = ?death_template, "player respawned in space");
        true
    }

    /// Leave any space, then forget the session.
    pub fn disconnect(&mut self, host: &mut dyn Host, player: PlayerId) {
        if self.sessions.space_of(player).is_some() {
            if let Err(e) = self.leave(host, player) {
                tracing::warn!(player = ?player, error = %e, "leave on disconnect failed");
            }
        }
        if self.sessions.remove(player).is_some() {
            tracing::debug!(player = ?player, "session removed");
        }
    }

    /// Choose an offered loadout while inside a space. The choice sticks for
    /// re-entry and is applied at once. The limited template cannot be picked.
    pub fn pick_loadout(
        &mut self,
        host: &mut dyn Host,
        player: PlayerId,
        template: &str,
    ) -> Result<String, ArenaError> {
        let space_name = self
            .sessions
            .space_of(player)
            .map(str::to_string)
            .ok_or(ArenaError::NotInSpace)?;
        let space = self.spaces.require(&space_name)?;
        let Some(offered) = space.offered_name(template).map(str::to_string) else {
            return Err(ArenaError::TemplateNotOffered {
                space: space_name,
                template: template.to_string(),
            });
        };
        if space.limited.reserves(&offered) {
            return Err(ArenaError::InvalidArgument(format!(
                "template '{offered}' is assigned automatically and cannot be picked"
            )));
        }
        if !self.templates.contains_key(&offered) {
            return Err(ArenaError::TemplateNotFound(offered));
        }

        if let Some(occ) = self.sessions.get_mut(player).and_then(|s| s.occupancy_mut()) {
            occ.selected_loadout = Some(offered.clone());
            occ.has_limited_loadout = false;
        }
        self.apply_loadout(host, player, &space_name, Some(&offered));
        host.message(player, Tone::Success, &format!("Loadout '{offered}' applied!"));
        tracing::info!(player = ?player, space = %space_name, template = %offered, "loadout picked");
        Ok(offered)
    }

    /// Route chat from a space occupant to that space only. Returns false for
    /// lobby chat, which the host handles.
    pub fn on_chat(&mut self, host: &mut dyn Host, player: PlayerId, text: &str) -> bool {
        let Some(space_name) = self.sessions.space_of(player).map(str::to_string) else {
            return false;
        };
        let name = display_name(host, player);
        let occupants = self.sessions.occupants(&space_name);
        host.broadcast(&occupants, Tone::Chat, &format!("[{space_name}] {name}: {text}"));
        true
    }

    /// Reapply the space's overrides to an item its occupant dropped. Returns
    /// true when the world item was re-synced.
    pub fn on_item_drop(
        &mut self,
        host: &mut dyn Host,
        player: PlayerId,
        index: i32,
        slot: ItemSlot,
    ) -> bool {
        if slot.is_empty() {
            return false;
        }
        let Some(space) = self
            .sessions
            .space_of(player)
            .and_then(|name| self.spaces.get(name))
        else {
            return false;
        };
        if space.overrides_for(slot.item_id).next().is_none() {
            return false;
        }
        let dropped = self.catalog.instantiate(slot);
        let item = override_world_item(&dropped, space, self.catalog.as_ref());
        host.sync_world_item(index, &item);
        true
    }

    /// Put a named template on the player, with the space's overrides.
    /// A missing or dangling template clears the inventory instead.
    pub(crate) fn apply_loadout(
        &self,
        host: &mut dyn Host,
        player: PlayerId,
        space_name: &str,
        template: Option<&str>,
    ) -> usize {
        let space = self.spaces.get(space_name);
        let found = template.and_then(|name| {
            let tpl = self.templates.get(name);
            if tpl.is_none() {
                tracing::warn!(space = %space_name, template = %name, "template missing, clearing inventory");
            }
            tpl
        });
        let cleared;
        let tpl = match found {
            Some(tpl) => tpl,
            None => {
                cleared = InventoryTemplate::empty();
                &cleared
            }
        };
        sync_inventory(host, player, tpl, space, self.catalog.as_ref())
    }
}

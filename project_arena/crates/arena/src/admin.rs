//! Administrative operations on spaces, templates and overrides.
//!
//! Every mutation is validated before anything changes and written through to
//! the store afterwards. Store failures are logged, never returned.

use inventory::{capture, InventoryTemplate, ItemOverride, ItemSlot, OverrideParam, SlotCategory, Vitals};
use net::{Host, Tone};
use session::PlayerId;
use space::{Space, TilePos};

use crate::error::ArenaError;
use crate::state::ArenaCore;

/// One row of `list_spaces`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceSummary {
    pub name: String,
    pub occupants: usize,
    pub capacity: u32,
}

fn non_empty(what: &str, name: &str) -> Result<String, ArenaError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ArenaError::InvalidArgument(format!("{what} name must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn to_u32(what: &str, value: i64) -> Result<u32, ArenaError> {
    u32::try_from(value)
        .map_err(|_| ArenaError::InvalidArgument(format!("{what} out of range: {value}")))
}

fn check_item_id(item_id: i32) -> Result<(), ArenaError> {
    if !(1..=i32::from(i16::MAX)).contains(&item_id) {
        return Err(ArenaError::InvalidArgument(format!("invalid item id: {item_id}")));
    }
    Ok(())
}

/// Parse `itemsN` / `armorN` into a slot address.
fn parse_slot(slot: &str) -> Result<(SlotCategory, usize), ArenaError> {
    let lower = slot.trim().to_ascii_lowercase();
    let (cat, index) = if let Some(rest) = lower.strip_prefix("items") {
        (SlotCategory::Inventory, rest)
    } else if let Some(rest) = lower.strip_prefix("armor") {
        (SlotCategory::Armor, rest)
    } else {
        return Err(ArenaError::InvalidArgument(format!(
            "slot must be itemsN or armorN, got '{slot}'"
        )));
    };
    let index = index
        .parse::<usize>()
        .map_err(|_| ArenaError::InvalidArgument(format!("bad slot index in '{slot}'")))?;
    Ok((cat, index))
}

impl ArenaCore {
    // ---- spaces ---------------------------------------------------------

    pub fn create_space(&mut self, name: &str, spawn: TilePos) -> Result<String, ArenaError> {
        let name = non_empty("space", name)?;
        let created = self.spaces.insert_new(Space::new(name, spawn))?.name.clone();
        self.persist_space(&created);
        tracing::info!(space = %created, %spawn, "space created");
        Ok(created)
    }

    /// Force every occupant back to the lobby, then remove the space with its
    /// signs and overrides. Returns how many players were evicted.
    pub fn delete_space(&mut self, host: &mut dyn Host, name: &str) -> Result<usize, ArenaError> {
        let name = self.spaces.require(name)?.name.clone();

        let occupants = self.sessions.occupants(&name);
        for &player in &occupants {
            if let Err(e) = self.leave(host, player) {
                tracing::warn!(player = ?player, space = %name, error = %e, "forced leave failed");
            }
        }
        self.sessions.clear_pending_links(&name);
        self.spaces.remove(&name);
        self.persist("space deletion", |s| s.delete_space(&name));

        tracing::info!(space = %name, evicted = occupants.len(), "space deleted");
        Ok(occupants.len())
    }

    pub fn set_capacity(&mut self, space: &str, capacity: i64) -> Result<u32, ArenaError> {
        if capacity < 1 {
            return Err(ArenaError::InvalidArgument(format!(
                "capacity must be at least 1, got {capacity}"
            )));
        }
        let capacity = to_u32("capacity", capacity)?;
        self.update_space(space, |s| s.capacity = capacity)?;
        Ok(capacity)
    }

    pub fn set_spawn(&mut self, space: &str, pos: TilePos) -> Result<(), ArenaError> {
        self.update_space(space, |s| s.spawn = pos)
    }

    /// Offer an existing template in `space`. Returns the template name.
    pub fn add_template(&mut self, space: &str, template: &str) -> Result<String, ArenaError> {
        let template = self.require_template(template)?;
        let space = self.spaces.require_mut(space)?;
        space.add_template(&template)?;
        let name = space.name.clone();
        self.persist_space(&name);
        tracing::info!(space = %name, template = %template, "template offered");
        Ok(template)
    }

    pub fn remove_template(&mut self, space: &str, template: &str) -> Result<String, ArenaError> {
        let space = self.spaces.require_mut(space)?;
        let removed = space.remove_template(template)?;
        let name = space.name.clone();
        self.persist_space(&name);
        tracing::info!(space = %name, template = %removed, "template withdrawn");
        Ok(removed)
    }

    pub fn space_templates(&self, space: &str) -> Result<Vec<String>, ArenaError> {
        Ok(self.spaces.require(space)?.templates.clone())
    }

    /// `count == 0` disables the policy. A positive count needs an existing
    /// template and must not fall below the number of current holders.
    pub fn set_limited_loadout(
        &mut self,
        space: &str,
        count: i64,
        template: Option<&str>,
    ) -> Result<(), ArenaError> {
        if count < 0 {
            return Err(ArenaError::InvalidArgument(format!(
                "limited count must not be negative, got {count}"
            )));
        }
        let count = to_u32("limited count", count)?;
        let name = self.spaces.require(space)?.name.clone();

        if count == 0 {
            return self.update_space(&name, |s| {
                s.limited.enabled = false;
                s.limited.capacity = 0;
            });
        }

        let template = template
            .ok_or_else(|| ArenaError::InvalidArgument("a template is required".into()))?;
        let template = self.require_template(template)?;
        let holders = self
            .sessions
            .occupants(&name)
            .iter()
            .filter_map(|&p| self.sessions.occupancy(p))
            .filter(|o| o.has_limited_loadout)
            .count();
        if holders > count as usize {
            return Err(ArenaError::InvalidArgument(format!(
                "{holders} players already hold the limited loadout"
            )));
        }
        self.update_space(&name, |s| {
            s.limited.enabled = true;
            s.limited.capacity = count;
            s.limited.template = template;
        })
    }

    pub fn set_death_template(&mut self, space: &str, template: Option<&str>) -> Result<(), ArenaError> {
        let template = template.map(|t| self.require_template(t)).transpose()?;
        self.update_space(space, |s| s.death_template = template)
    }

    pub fn set_death_respawn(&mut self, space: &str, pos: TilePos) -> Result<(), ArenaError> {
        self.update_space(space, |s| s.death_spawn = Some(pos))
    }

    /// Buff id 0 disables the entry buff.
    pub fn set_entry_buff(&mut self, space: &str, buff: i32) -> Result<(), ArenaError> {
        if buff < 0 {
            return Err(ArenaError::InvalidArgument(format!("invalid buff id: {buff}")));
        }
        let buff = (buff > 0).then_some(buff);
        self.update_space(space, |s| s.entry_buff = buff)
    }

    pub fn set_countdown(&mut self, space: &str, secs: i64) -> Result<(), ArenaError> {
        let secs = to_u32("countdown", secs)?;
        self.update_space(space, |s| s.countdown_secs = secs)
    }

    pub fn list_spaces(&self) -> Vec<SpaceSummary> {
        self.spaces
            .iter()
            .map(|s| SpaceSummary {
                name: s.name.clone(),
                occupants: self.sessions.occupant_count(&s.name),
                capacity: s.capacity,
            })
            .collect()
    }

    fn update_space<F>(&mut self, space: &str, edit: F) -> Result<(), ArenaError>
    where
        F: FnOnce(&mut Space),
    {
        let space = self.spaces.require_mut(space)?;
        edit(space);
        let name = space.name.clone();
        self.persist_space(&name);
        tracing::info!(space = %name, "space updated");
        Ok(())
    }

    // ---- templates ------------------------------------------------------

    /// Capture the player's live inventory as `name`, overwriting any existing
    /// template. Returns true when one was replaced.
    pub fn save_template_from_player(
        &mut self,
        host: &dyn Host,
        name: &str,
        player: PlayerId,
    ) -> Result<bool, ArenaError> {
        let name = non_empty("template", name)?;
        let live = host.player(player).ok_or(ArenaError::PlayerOffline(player))?;
        let template = capture(&live.inventory);
        self.persist("template", |s| s.save_template(&name, &template));
        let replaced = self.templates.insert(name.clone(), template).is_some();
        tracing::info!(template = %name, player = ?player, replaced, "template saved");
        Ok(replaced)
    }

    pub fn create_empty_template(&mut self, name: &str) -> Result<(), ArenaError> {
        let name = non_empty("template", name)?;
        if self.templates.contains_key(&name) {
            return Err(ArenaError::TemplateExists(name));
        }
        let template = InventoryTemplate::empty();
        self.persist("template", |s| s.save_template(&name, &template));
        self.templates.insert(name.clone(), template);
        tracing::info!(template = %name, "empty template created");
        Ok(())
    }

    /// Spaces still naming the template fall back to clearing the inventory.
    pub fn delete_template(&mut self, name: &str) -> Result<(), ArenaError> {
        if self.templates.remove(name).is_none() {
            return Err(ArenaError::TemplateNotFound(name.to_string()));
        }
        self.persist("template deletion", |s| s.delete_template(name));
        tracing::info!(template = %name, "template deleted");
        Ok(())
    }

    pub fn list_templates(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn set_template_vitals(&mut self, name: &str, vitals: Vitals) -> Result<(), ArenaError> {
        let Vitals {
            life,
            life_max,
            mana,
            mana_max,
        } = vitals;
        if life < 0 || life_max < 1 || mana < 0 || mana_max < 0 {
            return Err(ArenaError::InvalidArgument(format!(
                "invalid vitals: life {life}/{life_max}, mana {mana}/{mana_max}"
            )));
        }
        self.update_template(name, |t| t.vitals = vitals)
    }

    /// Set one slot (`itemsN` or `armorN`) of a template. Item id 0 clears it.
    pub fn set_template_item(
        &mut self,
        name: &str,
        slot: &str,
        item: ItemSlot,
    ) -> Result<(), ArenaError> {
        let (cat, index) = parse_slot(slot)?;
        if item.item_id < 0 || item.stack < 0 {
            return Err(ArenaError::InvalidArgument(format!(
                "invalid item {} x{}",
                item.item_id, item.stack
            )));
        }
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| ArenaError::TemplateNotFound(name.to_string()))?;
        let len = template.category(cat).len();
        if index >= len {
            return Err(ArenaError::InvalidArgument(format!(
                "slot {slot} out of range, template has {len}"
            )));
        }
        self.update_template(name, |t| t.category_mut(cat)[index] = item)
    }

    fn require_template(&self, name: &str) -> Result<String, ArenaError> {
        match self.templates.get_key_value(name) {
            Some((key, _)) => Ok(key.clone()),
            None => Err(ArenaError::TemplateNotFound(name.to_string())),
        }
    }

    fn update_template<F>(&mut self, name: &str, edit: F) -> Result<(), ArenaError>
    where
        F: FnOnce(&mut InventoryTemplate),
    {
        let template = self
            .templates
            .get_mut(name)
            .ok_or_else(|| ArenaError::TemplateNotFound(name.to_string()))?;
        edit(template);
        if let Some(template) = self.templates.get(name) {
            self.persist("template", |s| s.save_template(name, template));
        }
        tracing::info!(template = %name, "template updated");
        Ok(())
    }

    // ---- overrides ------------------------------------------------------

    /// Validate, upsert, persist, then tell the occupants. Returns the value
    /// replaced, if any. Takes effect on the next loadout placement.
    pub fn set_override(
        &mut self,
        host: &mut dyn Host,
        space: &str,
        item_id: i32,
        param: &str,
        value: &str,
    ) -> Result<Option<String>, ArenaError> {
        check_item_id(item_id)?;
        let ov = ItemOverride::new(item_id, param, value)?;
        let space = self.spaces.require_mut(space)?;
        let name = space.name.clone();
        let previous = space.set_override(ov.clone()).map(|old| old.value);
        self.persist("override", |s| s.save_override(&name, &ov));

        tracing::info!(space = %name, item_id, param = %ov.param(), value = %ov.value, "override set");
        let occupants = self.sessions.occupants(&name);
        host.broadcast(
            &occupants,
            Tone::Notice,
            &format!("Item {item_id} override: {} = {}", ov.param(), ov.value),
        );
        Ok(previous)
    }

    pub fn get_override(&self, space: &str, item_id: i32, param: &str) -> Result<String, ArenaError> {
        let param = OverrideParam::parse(param)?;
        let space = self.spaces.require(space)?;
        space
            .find_override(item_id, param)
            .map(|o| o.value.clone())
            .ok_or_else(|| ArenaError::OverrideNotFound {
                space: space.name.clone(),
                item_id,
                param,
            })
    }

    pub fn list_overrides(&self, space: &str, item_id: Option<i32>) -> Result<Vec<ItemOverride>, ArenaError> {
        let space = self.spaces.require(space)?;
        Ok(space
            .overrides
            .iter()
            .filter(|o| item_id.map_or(true, |id| o.item_id == id))
            .cloned()
            .collect())
    }

    pub fn remove_override(
        &mut self,
        space: &str,
        item_id: i32,
        param: &str,
    ) -> Result<ItemOverride, ArenaError> {
        let param = OverrideParam::parse(param)?;
        let space = self.spaces.require_mut(space)?;
        let removed = space.remove_override(item_id, param)?;
        let name = space.name.clone();
        self.persist("override deletion", |s| s.delete_override(&name, item_id, param));
        tracing::info!(space = %name, item_id, param = %param, "override removed");
        Ok(removed)
    }
}

//! Maps host events onto `ArenaCore` operations and turns their results into
//! player-facing replies.

use arena::{ArenaCore, ArenaError};
use inventory::{apply, ItemSlot, Vitals};
use net::{AdminCommand, ChannelHost, Host, HostEvent, LivePlayer, Tone};
use session::PlayerId;
use space::TilePos;

/// Handle one host event to completion.
pub fn dispatch(core: &mut ArenaCore, host: &mut ChannelHost, event: HostEvent, now_ms: i64) {
    let player = event.player();
    let result = match event {
        HostEvent::Connect {
            player,
            name,
            hostile,
            position,
            inventory,
        } => {
            let mut live = LivePlayer::new(player, name);
            live.hostile = hostile;
            live.position = position;
            if let Some(template) = inventory {
                apply(&template, &mut live.inventory, core.catalog());
            }
            tracing::info!(player = ?player, name = %live.name, "player connected");
            host.connect(live);
            Ok(())
        }
        HostEvent::Disconnect { player } => {
            core.disconnect(host, player);
            host.disconnect(player);
            tracing::info!(player = ?player, "player disconnected");
            Ok(())
        }
        HostEvent::Move { player, x, y } => {
            if let Some(live) = host.player_mut(player) {
                live.position = TilePos::new(x, y);
            }
            Ok(())
        }
        HostEvent::Inventory { player, inventory } => {
            let catalog = core.catalog();
            if let Some(live) = host.player_mut(player) {
                apply(&inventory, &mut live.inventory, catalog);
            }
            Ok(())
        }
        HostEvent::Pvp { player, hostile } => {
            if let Some(live) = host.player_mut(player) {
                live.hostile = hostile;
            }
            Ok(())
        }
        HostEvent::Join { player, space } => core.join(host, player, &space, now_ms).map(|_| ()),
        HostEvent::Leave { player } => core.leave(host, player).map(|_| ()),
        HostEvent::Pick { player, template } => {
            core.pick_loadout(host, player, &template).map(|_| ())
        }
        HostEvent::Sign { player, x, y } => core
            .on_sign_click(host, player, TilePos::new(x, y), now_ms)
            .map(|_| ()),
        HostEvent::Death { player } => {
            core.on_death(host, player);
            Ok(())
        }
        HostEvent::Chat { player, text } => {
            core.on_chat(host, player, &text);
            Ok(())
        }
        HostEvent::Drop {
            player,
            index,
            item,
        } => {
            core.on_item_drop(host, player, index, item);
            Ok(())
        }
        HostEvent::Admin { player, command } => run_admin(core, host, player, command)
            .map(|reply| host.message(player, Tone::Success, &reply)),
    };

    if let Err(e) = result {
        tracing::debug!(player = ?player, error = %e, "request rejected");
        host.message(player, Tone::Error, &e.to_string());
    }
}

fn admin_position(host: &ChannelHost, player: PlayerId) -> Result<TilePos, ArenaError> {
    host.player(player)
        .map(|p| p.position)
        .ok_or(ArenaError::PlayerOffline(player))
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

/// Run an admin command and describe the outcome.
pub fn run_admin(
    core: &mut ArenaCore,
    host: &mut ChannelHost,
    player: PlayerId,
    command: AdminCommand,
) -> Result<String, ArenaError> {
    tracing::debug!(player = ?player, command = ?command, "admin command");
    let reply = match command {
        AdminCommand::CreateSpace { name } => {
            let pos = admin_position(host, player)?;
            let name = core.create_space(&name, pos)?;
            format!("Space '{name}' created with spawn {pos}.")
        }
        AdminCommand::DeleteSpace { name } => {
            let evicted = core.delete_space(host, &name)?;
            format!("Space '{name}' deleted, {evicted} players returned to the lobby.")
        }
        AdminCommand::SetCapacity { space, capacity } => {
            let capacity = core.set_capacity(&space, capacity)?;
            format!("Capacity of '{space}' set to {capacity}.")
        }
        AdminCommand::SetSpawn { space } => {
            let pos = admin_position(host, player)?;
            core.set_spawn(&space, pos)?;
            format!("Spawn of '{space}' set to {pos}.")
        }
        AdminCommand::AddTemplate { space, template } => {
            let template = core.add_template(&space, &template)?;
            format!("Template '{template}' added to '{space}'.")
        }
        AdminCommand::RemoveTemplate { space, template } => {
            let template = core.remove_template(&space, &template)?;
            format!("Template '{template}' removed from '{space}'.")
        }
        AdminCommand::SpaceTemplates { space } => {
            let templates = core.space_templates(&space)?;
            format!("Templates of '{space}': {}", join_or_none(&templates))
        }
        AdminCommand::SetLimited {
            space,
            count,
            template,
        } => {
            core.set_limited_loadout(&space, count, template.as_deref())?;
            match template {
                Some(t) if count > 0 => format!("Limited loadout of '{space}': {count} x '{t}'."),
                _ => format!("Limited loadout of '{space}' disabled."),
            }
        }
        AdminCommand::SetDeathTemplate { space, template } => {
            core.set_death_template(&space, template.as_deref())?;
            match template {
                Some(t) => format!("Death template of '{space}' set to '{t}'."),
                None => format!("Death template of '{space}' cleared."),
            }
        }
        AdminCommand::SetDeathSpawn { space } => {
            let pos = admin_position(host, player)?;
            core.set_death_respawn(&space, pos)?;
            format!("Death respawn of '{space}' set to {pos}.")
        }
        AdminCommand::SetEntryBuff { space, buff } => {
            core.set_entry_buff(&space, buff)?;
            format!("Entry buff of '{space}' set to {buff}.")
        }
        AdminCommand::SetCountdown { space, secs } => {
            core.set_countdown(&space, secs)?;
            format!("Countdown of '{space}' set to {secs}s.")
        }
        AdminCommand::ListSpaces => {
            let rows: Vec<String> = core
                .list_spaces()
                .into_iter()
                .map(|s| format!("{} ({}/{})", s.name, s.occupants, s.capacity))
                .collect();
            format!("Spaces: {}", join_or_none(&rows))
        }
        AdminCommand::SaveTemplate { name } => {
            let replaced = core.save_template_from_player(&*host, &name, player)?;
            if replaced {
                format!("Template '{name}' overwritten from your inventory.")
            } else {
                format!("Template '{name}' saved from your inventory.")
            }
        }
        AdminCommand::CreateTemplate { name } => {
            core.create_empty_template(&name)?;
            format!("Empty template '{name}' created.")
        }
        AdminCommand::DeleteTemplate { name } => {
            core.delete_template(&name)?;
            format!("Template '{name}' deleted.")
        }
        AdminCommand::ListTemplates => {
            format!("Templates: {}", join_or_none(&core.list_templates()))
        }
        AdminCommand::SetTemplateVitals {
            name,
            life,
            life_max,
            mana,
            mana_max,
        } => {
            core.set_template_vitals(
                &name,
                Vitals {
                    life,
                    life_max,
                    mana,
                    mana_max,
                },
            )?;
            format!("Vitals of '{name}' set to {life}/{life_max} life, {mana}/{mana_max} mana.")
        }
        AdminCommand::SetTemplateItem {
            name,
            slot,
            item_id,
            stack,
            prefix,
        } => {
            core.set_template_item(&name, &slot, ItemSlot::new(item_id, stack, prefix))?;
            format!("Slot {slot} of '{name}' set to item {item_id} x{stack}.")
        }
        AdminCommand::SetOverride {
            space,
            item_id,
            param,
            value,
        } => match core.set_override(host, &space, item_id, &param, &value)? {
            Some(old) => format!("Override {param} of item {item_id} in '{space}': {old} -> {value}."),
            None => format!("Override {param} of item {item_id} in '{space}' set to {value}."),
        },
        AdminCommand::GetOverride {
            space,
            item_id,
            param,
        } => {
            let value = core.get_override(&space, item_id, &param)?;
            format!("Override {param} of item {item_id} in '{space}': {value}")
        }
        AdminCommand::ListOverrides { space, item_id } => {
            let rows: Vec<String> = core
                .list_overrides(&space, item_id)?
                .iter()
                .map(|o| format!("item {} {}={}", o.item_id, o.param(), o.value))
                .collect();
            format!("Overrides of '{space}': {}", join_or_none(&rows))
        }
        AdminCommand::RemoveOverride {
            space,
            item_id,
            param,
        } => {
            let removed = core.remove_override(&space, item_id, &param)?;
            format!(
                "Override {} of item {item_id} removed from '{space}'.",
                removed.param()
            )
        }
        AdminCommand::LinkSign { space } => {
            let space = core.request_sign_link(player, &space)?;
            format!("Interact with a sign to link it to '{space}'.")
        }
        AdminCommand::UnlinkSign => {
            core.request_sign_unlink(player);
            "Interact with a sign to unlink it.".to_string()
        }
        AdminCommand::AddRewardArea {
            name,
            radius,
            reward,
            cooldown_secs,
        } => {
            let pos = admin_position(host, player)?;
            core.add_reward_area(&name, pos, radius, reward, cooldown_secs)?;
            format!("Reward area '{name}' added at {pos} (radius {radius}, {reward} coins every {cooldown_secs}s).")
        }
    };
    Ok(reply)
}

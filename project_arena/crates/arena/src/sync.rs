use inventory::{apply, apply_override, wire_slots, InventoryTemplate, Item, ItemCatalog, ItemOverride};
use net::{encode_override, Host};
use session::PlayerId;
use space::Space;

/// Per-slot result of a restore: the placed item and the overrides applied to it.
struct PlacedSlot<'a> {
    wire: usize,
    item: Item,
    overrides: Vec<&'a ItemOverride>,
}

/// Restore `template` onto the player's live inventory and push it to the
/// client.
///
/// Order on the wire: view refresh, then for every slot its slot update
/// followed by one side-channel packet per override of that item, then
/// vitals. Lobby restores pass `space = None` and carry no overrides.
///
/// Returns the number of override packets sent.
pub fn sync_inventory(
    host: &mut dyn Host,
    player: PlayerId,
    template: &InventoryTemplate,
    space: Option<&Space>,
    catalog: &dyn ItemCatalog,
) -> usize {
    host.refresh_view(player);

    let Some(live) = host.player_mut(player) else {
        tracing::debug!(player = ?player, "inventory sync skipped, player offline");
        return 0;
    };
    apply(template, &mut live.inventory, catalog);

    let mut placed = Vec::new();
    for (cat, idx, wire) in wire_slots() {
        let item = &mut live.inventory.category_mut(cat)[idx];
        let mut overrides = Vec::new();
        if let Some(space) = space {
            if item.id != 0 {
                for ov in space.overrides_for(item.id) {
                    apply_override(item, &ov.kind);
                    overrides.push(ov);
                }
            }
        }
        placed.push(PlacedSlot {
            wire,
            item: item.clone(),
            overrides,
        });
    }

    let mut packets = 0;
    for slot in placed {
        host.send_slot(player, slot.wire, &slot.item);
        for ov in slot.overrides {
            match encode_override(ov.item_id, ov.param().wire_name(), &ov.value) {
                Ok(bytes) => {
                    host.send_raw(player, bytes);
                    packets += 1;
                }
                Err(e) => {
                    tracing::error!(player = ?player, item_id = ov.item_id, error = %e, "override packet not sent");
                }
            }
        }
    }

    host.sync_vitals(player);
    packets
}

/// Reset a world item to catalog defaults and reapply the space's overrides.
pub fn override_world_item(item: &Item, space: &Space, catalog: &dyn ItemCatalog) -> Item {
    let mut fresh = catalog.instantiate(item.to_slot());
    for ov in space.overrides_for(fresh.id) {
        apply_override(&mut fresh, &ov.kind);
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog, connect, drain, host};
    use inventory::{ItemSlot, SlotCategory, TOTAL_SLOTS};
    use net::HostCommand;
    use space::TilePos;

    fn sword_template() -> InventoryTemplate {
        let mut tpl = InventoryTemplate::empty();
        tpl.items[0] = ItemSlot::new(100, 1, 0);
        tpl.armor[1] = ItemSlot::new(100, 1, 0);
        tpl
    }

    #[test]
    fn wire_order_and_single_packet_per_override() {
        let (mut host, mut rx) = host();
        connect(&mut host, 1, "Alice");
        let mut space = Space::new("Arena", TilePos::default());
        space.set_override(ItemOverride::new(100, "damage", "2.0").unwrap());

        let mut tpl = InventoryTemplate::empty();
        tpl.items[3] = ItemSlot::new(100, 1, 0);
        let sent = sync_inventory(&mut host, PlayerId(1), &tpl, Some(&space), catalog().as_ref());
        assert_eq!(sent, 1);

        let cmds = drain(&mut rx);
        assert_eq!(cmds.len(), 1 + TOTAL_SLOTS + 1 + 1);
        assert!(matches!(cmds[0], HostCommand::RefreshView { .. }));
        assert!(matches!(cmds[4], HostCommand::Slot { slot: 3, item_id: 100, .. }));
        assert!(matches!(cmds[5], HostCommand::Raw { .. }));
        assert!(matches!(cmds.last(), Some(HostCommand::Vitals { .. })));

        let live = host_player_item(&host, SlotCategory::Inventory, 3);
        assert_eq!(live.stats.damage, 20);
    }

    #[test]
    fn overrides_apply_in_every_category() {
        let (mut host, mut rx) = host();
        connect(&mut host, 1, "Alice");
        let mut space = Space::new("Arena", TilePos::default());
        space.set_override(ItemOverride::new(100, "damage", "3").unwrap());

        let sent = sync_inventory(
            &mut host,
            PlayerId(1),
            &sword_template(),
            Some(&space),
            catalog().as_ref(),
        );
        assert_eq!(sent, 2);
        assert_eq!(host_player_item(&host, SlotCategory::Armor, 1).stats.damage, 30);
        drain(&mut rx);
    }

    #[test]
    fn lobby_restore_has_no_overrides() {
        let (mut host, mut rx) = host();
        connect(&mut host, 1, "Alice");
        let sent = sync_inventory(&mut host, PlayerId(1), &sword_template(), None, catalog().as_ref());
        assert_eq!(sent, 0);
        assert_eq!(host_player_item(&host, SlotCategory::Inventory, 0).stats.damage, 10);
        assert!(drain(&mut rx)
            .iter()
            .all(|c| !matches!(c, HostCommand::Raw { .. })));
    }

    #[test]
    fn world_item_override_is_idempotent() {
        let mut space = Space::new("Arena", TilePos::default());
        space.set_override(ItemOverride::new(100, "damage", "2").unwrap());
        let cat = catalog();
        let dropped = cat.instantiate(ItemSlot::new(100, 1, 0));

        let once = override_world_item(&dropped, &space, cat.as_ref());
        let twice = override_world_item(&once, &space, cat.as_ref());
        assert_eq!(once.stats.damage, 20);
        assert_eq!(twice, once);
    }

    fn host_player_item(host: &net::ChannelHost, cat: SlotCategory, idx: usize) -> Item {
        host.player(PlayerId(1)).unwrap().inventory.category(cat)[idx].clone()
    }
}

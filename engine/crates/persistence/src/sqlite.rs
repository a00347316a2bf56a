use std::collections::BTreeMap;
use std::path::Path;

use inventory::{InventoryTemplate, ItemOverride, ItemSlot, OverrideParam, Vitals};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use space::registry::name_key;
use space::{RewardArea, Space, TilePos};

use crate::error::PersistenceError;
use crate::schema;
use crate::store::ArenaStore;

/// Slot lists of a template row. Vitals have their own columns.
#[derive(Serialize)]
struct SlotsRef<'a> {
    items: &'a [ItemSlot],
    armor: &'a [ItemSlot],
    dyes: &'a [ItemSlot],
    misc_equips: &'a [ItemSlot],
    misc_dyes: &'a [ItemSlot],
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Slots {
    items: Vec<ItemSlot>,
    armor: Vec<ItemSlot>,
    dyes: Vec<ItemSlot>,
    misc_equips: Vec<ItemSlot>,
    misc_dyes: Vec<ItemSlot>,
}

/// SQLite-backed `ArenaStore`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database at the given file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        schema::create_tables(&conn)?;
        tracing::info!(path = %path.display(), "arena store opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }
}

impl ArenaStore for SqliteStore {
    fn load_spaces(&self) -> Result<Vec<Space>, PersistenceError> {
        let mut spaces: BTreeMap<String, Space> = BTreeMap::new();

        let mut stmt = self
            .conn
            .prepare("SELECT name, definition FROM spaces ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (name, definition) = row?;
            match serde_json::from_str::<Space>(&definition) {
                Ok(mut space) => {
                    space.name = name;
                    spaces.insert(name_key(&space.name), space);
                }
                Err(e) => {
                    tracing::warn!(space = %name, error = %e, "skipping unreadable space definition");
                }
            }
        }

        let mut stmt = self
            .conn
            .prepare("SELECT space_name, x, y FROM signs ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                TilePos::new(row.get(1)?, row.get(2)?),
            ))
        })?;
        for row in rows {
            let (space_name, pos) = row?;
            match spaces.get_mut(&name_key(&space_name)) {
                Some(space) => {
                    space.link_sign(pos);
                }
                None => {
                    tracing::warn!(space = %space_name, %pos, "sign linked to unknown space");
                }
            }
        }

        let mut stmt = self
            .conn
            .prepare("SELECT space_name, item_id, param, value FROM item_overrides ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        for row in rows {
            let (space_name, item_id, param, value) = row?;
            let Some(space) = spaces.get_mut(&name_key(&space_name)) else {
                tracing::warn!(space = %space_name, item_id, "override for unknown space");
                continue;
            };
            match ItemOverride::new(item_id, &param, &value) {
                Ok(ov) => {
                    space.set_override(ov);
                }
                Err(e) => {
                    tracing::warn!(space = %space_name, item_id, %param, error = %e, "skipping invalid override");
                }
            }
        }

        Ok(spaces.into_values().collect())
    }

    fn save_space(&self, space: &Space) -> Result<(), PersistenceError> {
        let definition = serde_json::to_string(space)?;
        self.conn.execute(
            "INSERT INTO spaces (name, definition) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET definition = excluded.definition,
                                             updated_at = datetime('now')",
            params![space.name, definition],
        )?;
        Ok(())
    }

    fn delete_space(&self, name: &str) -> Result<(), PersistenceError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM signs WHERE space_name = ?1", params![name])?;
        tx.execute("DELETE FROM item_overrides WHERE space_name = ?1", params![name])?;
        tx.execute("DELETE FROM spaces WHERE name = ?1", params![name])?;
        tx.commit()?;
        Ok(())
    }

    fn save_sign(&self, space: &str, pos: TilePos) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO signs (x, y, space_name) VALUES (?1, ?2, ?3)",
            params![pos.x, pos.y, space],
        )?;
        Ok(())
    }

    fn delete_sign(&self, pos: TilePos) -> Result<(), PersistenceError> {
        self.conn.execute(
            "DELETE FROM signs WHERE x = ?1 AND y = ?2",
            params![pos.x, pos.y],
        )?;
        Ok(())
    }

    fn save_override(&self, space: &str, ov: &ItemOverride) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO item_overrides (space_name, item_id, param, value)
             VALUES (?1, ?2, ?3, ?4)",
            params![space, ov.item_id, ov.param().wire_name(), ov.value],
        )?;
        Ok(())
    }

    fn delete_override(
        &self,
        space: &str,
        item_id: i32,
        param: OverrideParam,
    ) -> Result<(), PersistenceError> {
        self.conn.execute(
            "DELETE FROM item_overrides WHERE space_name = ?1 AND item_id = ?2 AND param = ?3",
            params![space, item_id, param.wire_name()],
        )?;
        Ok(())
    }

    fn load_templates(&self) -> Result<Vec<(String, InventoryTemplate)>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, slots, life, life_max, mana, mana_max FROM templates ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                Vitals {
                    life: row.get(2)?,
                    life_max: row.get(3)?,
                    mana: row.get(4)?,
                    mana_max: row.get(5)?,
                },
            ))
        })?;

        let mut templates = Vec::new();
        for row in rows {
            let (name, slots, vitals) = row?;
            match serde_json::from_str::<Slots>(&slots) {
                Ok(s) => templates.push((
                    name,
                    InventoryTemplate {
                        items: s.items,
                        armor: s.armor,
                        dyes: s.dyes,
                        misc_equips: s.misc_equips,
                        misc_dyes: s.misc_dyes,
                        vitals,
                    },
                )),
                Err(e) => {
                    tracing::warn!(template = %name, error = %e, "skipping unreadable template");
                }
            }
        }
        Ok(templates)
    }

    fn save_template(&self, name: &str, template: &InventoryTemplate) -> Result<(), PersistenceError> {
        let slots = serde_json::to_string(&SlotsRef {
            items: &template.items,
            armor: &template.armor,
            dyes: &template.dyes,
            misc_equips: &template.misc_equips,
            misc_dyes: &template.misc_dyes,
        })?;
        let v = template.vitals;
        self.conn.execute(
            "INSERT OR REPLACE INTO templates (name, slots, life, life_max, mana, mana_max)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![name, slots, v.life, v.life_max, v.mana, v.mana_max],
        )?;
        Ok(())
    }

    fn delete_template(&self, name: &str) -> Result<(), PersistenceError> {
        self.conn
            .execute("DELETE FROM templates WHERE name = ?1", params![name])?;
        Ok(())
    }

    fn load_reward_areas(&self) -> Result<Vec<RewardArea>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, x, y, radius, reward, cooldown_secs, last_reward
             FROM reward_areas ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                RewardArea::new(
                    row.get::<_, String>(0)?,
                    TilePos::new(row.get(1)?, row.get(2)?),
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ),
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut areas = Vec::new();
        for row in rows {
            let (mut area, last_reward) = row?;
            match serde_json::from_str(&last_reward) {
                Ok(map) => area.last_reward = map,
                Err(e) => {
                    tracing::warn!(area = %area.name, error = %e, "resetting unreadable reward cooldowns");
                }
            }
            areas.push(area);
        }
        Ok(areas)
    }

    fn save_reward_area(&self, area: &RewardArea) -> Result<(), PersistenceError> {
        let last_reward = serde_json::to_string(&area.last_reward)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO reward_areas
                 (name, x, y, radius, reward, cooldown_secs, last_reward)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                area.name,
                area.center.x,
                area.center.y,
                area.radius,
                area.reward,
                area.cooldown_secs,
                last_reward
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use space::LimitedLoadout;

    fn arena() -> Space {
        let mut space = Space::new("Arena", TilePos::new(100, 200));
        space.capacity = 2;
        space.add_template("murderer").unwrap();
        space.add_template("innocent").unwrap();
        space.limited = LimitedLoadout {
            enabled: true,
            capacity: 1,
            template: "murderer".into(),
        };
        space
    }

    #[test]
    fn space_definition_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_space(&arena()).unwrap();

        let loaded = store.load_spaces().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], arena());
    }

    #[test]
    fn save_space_overwrites() {
        let store = SqliteStore::open_memory().unwrap();
        let mut space = arena();
        store.save_space(&space).unwrap();
        space.capacity = 8;
        store.save_space(&space).unwrap();

        let loaded = store.load_spaces().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].capacity, 8);
    }

    #[test]
    fn signs_and_overrides_attach_to_space() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_space(&arena()).unwrap();
        store.save_sign("arena", TilePos::new(5, 5)).unwrap();
        store
            .save_override("Arena", &ItemOverride::new(100, "damage", "2.0").unwrap())
            .unwrap();
        store
            .save_override("Arena", &ItemOverride::new(100, "attacktime", "0.5").unwrap())
            .unwrap();

        let loaded = store.load_spaces().unwrap();
        let space = &loaded[0];
        assert_eq!(space.signs, vec![TilePos::new(5, 5)]);
        assert_eq!(space.overrides.len(), 2);
        assert_eq!(
            space
                .find_override(100, OverrideParam::UseTimeScale)
                .map(|o| o.value.as_str()),
            Some("0.5")
        );
    }

    #[test]
    fn override_upsert_and_delete() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_space(&arena()).unwrap();
        store
            .save_override("Arena", &ItemOverride::new(100, "damage", "2").unwrap())
            .unwrap();
        store
            .save_override("Arena", &ItemOverride::new(100, "damage", "3").unwrap())
            .unwrap();
        let loaded = store.load_spaces().unwrap();
        assert_eq!(loaded[0].overrides.len(), 1);
        assert_eq!(loaded[0].overrides[0].value, "3");

        store
            .delete_override("Arena", 100, OverrideParam::Damage)
            .unwrap();
        assert!(store.load_spaces().unwrap()[0].overrides.is_empty());
    }

    #[test]
    fn invalid_override_rows_are_skipped() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_space(&arena()).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO item_overrides (space_name, item_id, param, value) VALUES ('Arena', 1, 'cooldown', '2')",
                [],
            )
            .unwrap();

        let loaded = store.load_spaces().unwrap();
        assert!(loaded[0].overrides.is_empty());
    }

    #[test]
    fn sign_relink_replaces_owner() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_space(&arena()).unwrap();
        store.save_space(&Space::new("Other", TilePos::default())).unwrap();
        store.save_sign("Arena", TilePos::new(1, 1)).unwrap();
        store.save_sign("Other", TilePos::new(1, 1)).unwrap();

        let loaded = store.load_spaces().unwrap();
        let arena = loaded.iter().find(|s| s.name == "Arena").unwrap();
        let other = loaded.iter().find(|s| s.name == "Other").unwrap();
        assert!(arena.signs.is_empty());
        assert_eq!(other.signs, vec![TilePos::new(1, 1)]);

        store.delete_sign(TilePos::new(1, 1)).unwrap();
        assert!(store.load_spaces().unwrap().iter().all(|s| s.signs.is_empty()));
    }

    #[test]
    fn delete_space_cascades() {
        let store = SqliteStore::open_memory().unwrap();
        store.save_space(&arena()).unwrap();
        store.save_sign("Arena", TilePos::new(1, 1)).unwrap();
        store
            .save_override("Arena", &ItemOverride::new(1, "crit", "4").unwrap())
            .unwrap();

        store.delete_space("ARENA").unwrap();
        assert!(store.load_spaces().unwrap().is_empty());

        // Re-creating the name must not resurrect old links.
        store.save_space(&arena()).unwrap();
        let loaded = store.load_spaces().unwrap();
        assert!(loaded[0].signs.is_empty());
        assert!(loaded[0].overrides.is_empty());
    }

    #[test]
    fn template_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let mut tpl = InventoryTemplate::empty();
        tpl.items[0] = ItemSlot::new(100, 1, 0);
        tpl.armor[2] = ItemSlot::new(200, 1, 5);
        tpl.vitals = Vitals {
            life: 400,
            life_max: 400,
            mana: 200,
            mana_max: 200,
        };
        store.save_template("warrior", &tpl).unwrap();

        let loaded = store.load_templates().unwrap();
        assert_eq!(loaded, vec![("warrior".to_string(), tpl)]);

        store.delete_template("warrior").unwrap();
        assert!(store.load_templates().unwrap().is_empty());
    }

    #[test]
    fn reward_area_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let mut area = RewardArea::new("pit", TilePos::new(10, 10), 5, 25, 60);
        area.record_payout(3, 1_700_000_000_000);
        store.save_reward_area(&area).unwrap();

        let loaded = store.load_reward_areas().unwrap();
        assert_eq!(loaded, vec![area]);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("arena.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_space(&arena()).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_spaces().unwrap().len(), 1);
    }
}

use rusqlite::Connection;

use crate::error::PersistenceError;

pub fn create_tables(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS spaces (
            name        TEXT PRIMARY KEY COLLATE NOCASE,
            definition  TEXT NOT NULL DEFAULT '{}',
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS templates (
            name        TEXT PRIMARY KEY,
            slots       TEXT NOT NULL DEFAULT '{}',
            life        INTEGER NOT NULL DEFAULT 100,
            life_max    INTEGER NOT NULL DEFAULT 100,
            mana        INTEGER NOT NULL DEFAULT 20,
            mana_max    INTEGER NOT NULL DEFAULT 20
        );

        CREATE TABLE IF NOT EXISTS signs (
            x           INTEGER NOT NULL,
            y           INTEGER NOT NULL,
            space_name  TEXT NOT NULL COLLATE NOCASE,
            PRIMARY KEY (x, y)
        );

        CREATE TABLE IF NOT EXISTS item_overrides (
            space_name  TEXT NOT NULL COLLATE NOCASE,
            item_id     INTEGER NOT NULL,
            param       TEXT NOT NULL,
            value       TEXT NOT NULL,
            PRIMARY KEY (space_name, item_id, param)
        );

        CREATE TABLE IF NOT EXISTS reward_areas (
            name          TEXT PRIMARY KEY COLLATE NOCASE,
            x             INTEGER NOT NULL,
            y             INTEGER NOT NULL,
            radius        INTEGER NOT NULL,
            reward        INTEGER NOT NULL,
            cooldown_secs INTEGER NOT NULL,
            last_reward   TEXT NOT NULL DEFAULT '{}'
        );
        ",
    )?;
    Ok(())
}

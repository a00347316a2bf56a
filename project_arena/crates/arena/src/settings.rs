use space::WorldBounds;

/// Tunables for the arena core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSettings {
    /// Two clicks on the same sign closer together than this join the space.
    pub sign_debounce_ms: i64,
    pub spawn_refresh_secs: i64,
    pub entry_buff_ticks: i32,
    pub world: WorldBounds,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            sign_debounce_ms: 500,
            spawn_refresh_secs: 600,
            entry_buff_ticks: 99_999,
            world: WorldBounds::default(),
        }
    }
}

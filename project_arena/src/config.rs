use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use arena::ArenaSettings;
use inventory::{ItemStats, StaticCatalog};
use space::WorldBounds;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: String,
    /// Off: run in memory only.
    pub enabled: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: "data/arena.db".to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaSection {
    pub sign_debounce_ms: i64,
    pub spawn_refresh_secs: i64,
    pub entry_buff_ticks: i32,
}

impl Default for ArenaSection {
    fn default() -> Self {
        Self {
            sign_debounce_ms: 500,
            spawn_refresh_secs: 600,
            entry_buff_ticks: 99_999,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickSection {
    pub tps: u32,
}

impl Default for TickSection {
    fn default() -> Self {
        Self { tps: 60 }
    }
}

/// Base stats of one item id, as listed under `[[items]]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemEntry {
    pub id: i32,
    #[serde(flatten)]
    pub stats: ItemStats,
}

/// Top-level arena server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub store: StoreSection,
    pub world: WorldBounds,
    pub arena: ArenaSection,
    pub tick: TickSection,
    pub items: Vec<ItemEntry>,
}

impl ServerConfig {
    /// Load configuration from an optional TOML file path.
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config_path {
            Some(path) if Path::new(path).exists() => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            _ => Self::default(),
        };
        Ok(config)
    }

    pub fn arena_settings(&self) -> ArenaSettings {
        ArenaSettings {
            sign_debounce_ms: self.arena.sign_debounce_ms,
            spawn_refresh_secs: self.arena.spawn_refresh_secs,
            entry_buff_ticks: self.arena.entry_buff_ticks,
            world: self.world,
        }
    }

    pub fn catalog(&self) -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        for entry in &self.items {
            catalog.insert(entry.id, entry.stats);
        }
        catalog
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.tick.tps.max(1)))
    }
}

/// Parse CLI arguments and load config.
/// Supports: --config <path>
pub fn parse_cli_args() -> ServerConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if let Some(val) = args.get(i + 1) {
                    config_path = Some(val.as_str());
                    i += 2;
                } else {
                    eprintln!("--config requires a path argument");
                    std::process::exit(1);
                }
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    match ServerConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}

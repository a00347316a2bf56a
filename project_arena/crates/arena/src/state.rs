use std::collections::BTreeMap;

use inventory::{InventoryTemplate, ItemCatalog};
use persistence::{ArenaStore, PersistenceError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use session::{PlayerId, PlayerSession, SessionTable};
use space::{RewardArea, Space, SpaceRegistry, SpawnCache};

use crate::settings::ArenaSettings;

/// Owns every arena registry and the per-player session table. All handlers
/// take `&mut self`; the host drives them one event at a time.
pub struct ArenaCore {
    pub(crate) spaces: SpaceRegistry,
    /// Loadouts by exact name.
    pub(crate) templates: BTreeMap<String, InventoryTemplate>,
    pub(crate) sessions: SessionTable,
    pub(crate) reward_areas: Vec<RewardArea>,
    pub(crate) store: Option<Box<dyn ArenaStore + Send>>,
    pub(crate) catalog: Box<dyn ItemCatalog + Send>,
    pub(crate) spawns: SpawnCache,
    pub(crate) settings: ArenaSettings,
    pub(crate) rng: StdRng,
}

impl ArenaCore {
    pub fn new(catalog: Box<dyn ItemCatalog + Send>, settings: ArenaSettings) -> Self {
        Self::with_rng(catalog, settings, StdRng::from_entropy())
    }

    /// Deterministic allocation and spawn generation.
    pub fn with_rng(
        catalog: Box<dyn ItemCatalog + Send>,
        settings: ArenaSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            spaces: SpaceRegistry::new(),
            templates: BTreeMap::new(),
            sessions: SessionTable::new(),
            reward_areas: Vec::new(),
            store: None,
            catalog,
            spawns: SpawnCache::new(settings.world, settings.spawn_refresh_secs),
            settings,
            rng,
        }
    }

    /// Load everything from `store` and write through to it from now on.
    /// A failed load is logged and leaves the in-memory state as it was.
    pub fn attach_store(&mut self, store: Box<dyn ArenaStore + Send>) {
        match store.load_spaces() {
            Ok(spaces) => {
                tracing::info!(count = spaces.len(), "spaces loaded");
                for space in spaces {
                    self.spaces.upsert(space);
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to load spaces"),
        }
        match store.load_templates() {
            Ok(templates) => {
                tracing::info!(count = templates.len(), "templates loaded");
                self.templates.extend(templates);
            }
            Err(e) => tracing::error!(error = %e, "failed to load templates"),
        }
        match store.load_reward_areas() {
            Ok(areas) => {
                tracing::info!(count = areas.len(), "reward areas loaded");
                self.reward_areas = areas;
            }
            Err(e) => tracing::error!(error = %e, "failed to load reward areas"),
        }
        self.store = Some(store);
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Run a write against the store. Failures are logged; in-memory state
    /// is never rolled back.
    pub(crate) fn persist<F>(&self, what: &str, write: F)
    where
        F: FnOnce(&dyn ArenaStore) -> Result<(), PersistenceError>,
    {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        if let Err(e) = write(store) {
            tracing::error!(error = %e, "failed to persist {what}");
        }
    }

    pub(crate) fn persist_space(&self, name: &str) {
        if let Some(space) = self.spaces.get(name) {
            self.persist("space", |s| s.save_space(space));
        }
    }

    pub fn spaces(&self) -> &SpaceRegistry {
        &self.spaces
    }

    pub fn space(&self, name: &str) -> Option<&Space> {
        self.spaces.get(name)
    }

    pub fn template(&self, name: &str) -> Option<&InventoryTemplate> {
        self.templates.get(name)
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn session(&self, player: PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(player)
    }

    pub fn reward_areas(&self) -> &[RewardArea] {
        &self.reward_areas
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &dyn ItemCatalog {
        self.catalog.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog, FailingStore};
    use persistence::SqliteStore;
    use space::TilePos;

    #[test]
    fn attach_store_loads_definitions() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .save_space(&Space::new("Arena", TilePos::new(1, 1)))
            .unwrap();
        store
            .save_template("kit", &InventoryTemplate::empty())
            .unwrap();
        store
            .save_reward_area(&RewardArea::new("pit", TilePos::default(), 3, 5, 10))
            .unwrap();

        let mut core = ArenaCore::new(catalog(), ArenaSettings::default());
        core.attach_store(Box::new(store));

        assert!(core.has_store());
        assert!(core.space("arena").is_some());
        assert!(core.template("kit").is_some());
        assert_eq!(core.reward_areas().len(), 1);
    }

    #[test]
    fn unavailable_store_keeps_running_in_memory() {
        let mut core = ArenaCore::new(catalog(), ArenaSettings::default());
        core.attach_store(Box::new(FailingStore));
        assert!(core.spaces().is_empty());

        core.spaces.upsert(Space::new("Arena", TilePos::default()));
        core.persist_space("Arena");
        assert!(core.space("Arena").is_some());
    }
}

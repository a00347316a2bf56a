use std::collections::BTreeMap;

use crate::model::{Space, SpaceError, TilePos};

/// Registry key for a space name. Space identity is case-insensitive.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// All known spaces, keyed case-insensitively by name.
#[derive(Debug, Default)]
pub struct SpaceRegistry {
    spaces: BTreeMap<String, Space>,
}

impl SpaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_new(&mut self, space: Space) -> Result<&mut Space, SpaceError> {
        let key = name_key(&space.name);
        if self.spaces.contains_key(&key) {
            return Err(SpaceError::AlreadyExists(space.name));
        }
        Ok(self.spaces.entry(key).or_insert(space))
    }

    /// Insert or replace. Used when loading from the store.
    pub fn upsert(&mut self, space: Space) {
        self.spaces.insert(name_key(&space.name), space);
    }

    pub fn get(&self, name: &str) -> Option<&Space> {
        self.spaces.get(&name_key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Space> {
        self.spaces.get_mut(&name_key(name))
    }

    pub fn require(&self, name: &str) -> Result<&Space, SpaceError> {
        self.get(name)
            .ok_or_else(|| SpaceError::NotFound(name.to_string()))
    }

    pub fn require_mut(&mut self, name: &str) -> Result<&mut Space, SpaceError> {
        self.get_mut(name)
            .ok_or_else(|| SpaceError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.spaces.contains_key(&name_key(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<Space> {
        self.spaces.remove(&name_key(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Space> {
        self.spaces.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Space> {
        self.spaces.values_mut()
    }

    /// Display names in key order.
    pub fn names(&self) -> Vec<String> {
        self.spaces.values().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// The space a sign coordinate is linked to, if any.
    pub fn space_for_sign(&self, pos: TilePos) -> Option<&Space> {
        self.spaces.values().find(|s| s.has_sign(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        let mut reg = SpaceRegistry::new();
        reg.insert_new(Space::new("Arena", TilePos::default()))
            .unwrap();
        assert!(reg.contains("arena"));
        assert_eq!(reg.get("ARENA").map(|s| s.name.as_str()), Some("Arena"));
        assert!(matches!(
            reg.insert_new(Space::new("aRENA", TilePos::default())),
            Err(SpaceError::AlreadyExists(_))
        ));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn require_reports_missing() {
        let reg = SpaceRegistry::new();
        assert!(matches!(reg.require("nope"), Err(SpaceError::NotFound(_))));
    }

    #[test]
    fn sign_lookup() {
        let mut reg = SpaceRegistry::new();
        reg.insert_new(Space::new("A", TilePos::default()))
            .unwrap()
            .link_sign(TilePos::new(1, 1));
        reg.insert_new(Space::new("B", TilePos::default()))
            .unwrap()
            .link_sign(TilePos::new(2, 2));

        assert_eq!(
            reg.space_for_sign(TilePos::new(2, 2)).map(|s| s.name.as_str()),
            Some("B")
        );
        assert!(reg.space_for_sign(TilePos::new(3, 3)).is_none());
    }

    #[test]
    fn remove_by_any_case() {
        let mut reg = SpaceRegistry::new();
        reg.insert_new(Space::new("Arena", TilePos::default()))
            .unwrap();
        assert!(reg.remove("ARENA").is_some());
        assert!(reg.is_empty());
    }
}

use std::fmt;

use inventory::{ItemOverride, OverrideParam};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum SpaceError {
    #[error("space '{0}' already exists")]
    AlreadyExists(String),

    #[error("space '{0}' not found")]
    NotFound(String),

    #[error("template '{template}' is already offered by space '{space}'")]
    TemplateAlreadyOffered { space: String, template: String },

    #[error("template '{template}' is not offered by space '{space}'")]
    TemplateNotOffered { space: String, template: String },

    #[error("space '{space}' has no '{param}' override for item {item_id}")]
    OverrideNotFound {
        space: String,
        item_id: i32,
        param: OverrideParam,
    },
}

/// World tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance truncated toward zero.
    pub fn distance_to(self, other: TilePos) -> i32 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt() as i32
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// A loadout handed to at most `capacity` occupants at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitedLoadout {
    pub enabled: bool,
    pub capacity: u32,
    pub template: String,
}

impl LimitedLoadout {
    pub fn is_active(&self) -> bool {
        self.enabled && self.capacity > 0 && !self.template.is_empty()
    }

    /// Whether `name` is the reserved template (only meaningful while active).
    pub fn reserves(&self, name: &str) -> bool {
        self.is_active() && self.template.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomSpawn {
    pub pos: TilePos,
    /// Unix seconds.
    pub generated_at: i64,
}

/// An arena definition. Signs and overrides are stored in their own tables
/// and attached after loading, so they are skipped by serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Space {
    pub name: String,
    pub capacity: u32,
    pub spawn: TilePos,
    pub death_spawn: Option<TilePos>,
    pub death_template: Option<String>,
    pub templates: Vec<String>,
    pub limited: LimitedLoadout,
    pub entry_buff: Option<i32>,
    pub countdown_secs: u32,
    pub random_spawn: Option<RandomSpawn>,
    #[serde(skip)]
    pub signs: Vec<TilePos>,
    #[serde(skip)]
    pub overrides: Vec<ItemOverride>,
}

impl Default for Space {
    fn default() -> Self {
        Self::new("", TilePos::default())
    }
}

impl Space {
    pub fn new(name: impl Into<String>, spawn: TilePos) -> Self {
        Self {
            name: name.into(),
            capacity: DEFAULT_CAPACITY,
            spawn,
            death_spawn: None,
            death_template: None,
            templates: Vec::new(),
            limited: LimitedLoadout::default(),
            entry_buff: None,
            countdown_secs: 0,
            random_spawn: None,
            signs: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Offered template name as stored, matched case-insensitively.
    pub fn offered_name(&self, template: &str) -> Option<&str> {
        self.templates
            .iter()
            .find(|t| t.eq_ignore_ascii_case(template))
            .map(String::as_str)
    }

    pub fn offers(&self, template: &str) -> bool {
        self.offered_name(template).is_some()
    }

    pub fn add_template(&mut self, template: &str) -> Result<(), SpaceError> {
        if self.offers(template) {
            return Err(SpaceError::TemplateAlreadyOffered {
                space: self.name.clone(),
                template: template.to_string(),
            });
        }
        self.templates.push(template.to_string());
        Ok(())
    }

    pub fn remove_template(&mut self, template: &str) -> Result<String, SpaceError> {
        match self
            .templates
            .iter()
            .position(|t| t.eq_ignore_ascii_case(template))
        {
            Some(idx) => Ok(self.templates.remove(idx)),
            None => Err(SpaceError::TemplateNotOffered {
                space: self.name.clone(),
                template: template.to_string(),
            }),
        }
    }

    /// Templates eligible for random or preferred selection: the pool minus the
    /// reserved limited template.
    pub fn open_templates(&self) -> impl Iterator<Item = &str> + '_ {
        self.templates
            .iter()
            .map(String::as_str)
            .filter(|t| !self.limited.reserves(t))
    }

    pub fn overrides_for(&self, item_id: i32) -> impl Iterator<Item = &ItemOverride> + '_ {
        self.overrides.iter().filter(move |o| o.item_id == item_id)
    }

    pub fn find_override(&self, item_id: i32, param: OverrideParam) -> Option<&ItemOverride> {
        self.overrides
            .iter()
            .find(|o| o.item_id == item_id && o.param() == param)
    }

    /// Insert or replace the override for `(item_id, param)`. Returns the
    /// value it replaced.
    pub fn set_override(&mut self, ov: ItemOverride) -> Option<ItemOverride> {
        let existing = self
            .overrides
            .iter_mut()
            .find(|o| o.item_id == ov.item_id && o.param() == ov.param());
        match existing {
            Some(slot) => Some(std::mem::replace(slot, ov)),
            None => {
                self.overrides.push(ov);
                None
            }
        }
    }

    pub fn remove_override(
        &mut self,
        item_id: i32,
        param: OverrideParam,
    ) -> Result<ItemOverride, SpaceError> {
        match self
            .overrides
            .iter()
            .position(|o| o.item_id == item_id && o.param() == param)
        {
            Some(idx) => Ok(self.overrides.remove(idx)),
            None => Err(SpaceError::OverrideNotFound {
                space: self.name.clone(),
                item_id,
                param,
            }),
        }
    }

    pub fn has_sign(&self, pos: TilePos) -> bool {
        self.signs.contains(&pos)
    }

    /// Returns false if the sign was already linked here.
    pub fn link_sign(&mut self, pos: TilePos) -> bool {
        if self.has_sign(pos) {
            return false;
        }
        self.signs.push(pos);
        true
    }

    pub fn unlink_sign(&mut self, pos: TilePos) -> bool {
        let before = self.signs.len();
        self.signs.retain(|s| *s != pos);
        self.signs.len() != before
    }

    /// The cached random point once one exists, else the fixed spawn.
    pub fn teleport_target(&self) -> TilePos {
        self.random_spawn.map(|r| r.pos).unwrap_or(self.spawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_truncates() {
        let a = TilePos::new(0, 0);
        assert_eq!(a.distance_to(TilePos::new(3, 4)), 5);
        assert_eq!(a.distance_to(TilePos::new(1, 1)), 1);
        assert_eq!(a.distance_to(TilePos::new(2, 2)), 2);
    }

    #[test]
    fn template_pool_is_case_insensitive() {
        let mut space = Space::new("Arena", TilePos::new(10, 10));
        space.add_template("Warrior").unwrap();
        assert!(space.offers("warrior"));
        assert_eq!(space.offered_name("WARRIOR"), Some("Warrior"));
        assert!(matches!(
            space.add_template("warrior"),
            Err(SpaceError::TemplateAlreadyOffered { .. })
        ));
        assert_eq!(space.remove_template("WARRIOR").unwrap(), "Warrior");
        assert!(space.templates.is_empty());
    }

    #[test]
    fn open_templates_skip_reserved_limited() {
        let mut space = Space::new("Arena", TilePos::default());
        space.add_template("murderer").unwrap();
        space.add_template("innocent").unwrap();
        assert_eq!(space.open_templates().count(), 2);

        space.limited = LimitedLoadout {
            enabled: true,
            capacity: 1,
            template: "Murderer".into(),
        };
        let open: Vec<&str> = space.open_templates().collect();
        assert_eq!(open, vec!["innocent"]);
    }

    #[test]
    fn override_upsert_keeps_one_per_param() {
        let mut space = Space::new("Arena", TilePos::default());
        assert!(space
            .set_override(ItemOverride::new(100, "damage", "2").unwrap())
            .is_none());
        let old = space.set_override(ItemOverride::new(100, "damage", "3").unwrap());
        assert_eq!(old.map(|o| o.value), Some("2".to_string()));
        space.set_override(ItemOverride::new(100, "crit", "5").unwrap());
        assert_eq!(space.overrides_for(100).count(), 2);
        assert_eq!(
            space
                .find_override(100, OverrideParam::Damage)
                .map(|o| o.value.as_str()),
            Some("3")
        );

        space.remove_override(100, OverrideParam::Damage).unwrap();
        assert!(matches!(
            space.remove_override(100, OverrideParam::Damage),
            Err(SpaceError::OverrideNotFound { .. })
        ));
    }

    #[test]
    fn sign_links_are_unique() {
        let mut space = Space::new("Arena", TilePos::default());
        let pos = TilePos::new(5, 6);
        assert!(space.link_sign(pos));
        assert!(!space.link_sign(pos));
        assert!(space.unlink_sign(pos));
        assert!(!space.unlink_sign(pos));
    }

    #[test]
    fn teleport_prefers_random_point() {
        let mut space = Space::new("Arena", TilePos::new(1, 2));
        assert_eq!(space.teleport_target(), TilePos::new(1, 2));
        space.random_spawn = Some(RandomSpawn {
            pos: TilePos::new(500, 600),
            generated_at: 0,
        });
        assert_eq!(space.teleport_target(), TilePos::new(500, 600));
    }

    #[test]
    fn definition_json_skips_signs_and_overrides() {
        let mut space = Space::new("Arena", TilePos::new(1, 2));
        space.link_sign(TilePos::new(3, 3));
        space.set_override(ItemOverride::new(1, "damage", "2").unwrap());
        let json = serde_json::to_string(&space).unwrap();
        assert!(!json.contains("signs"));

        let back: Space = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Arena");
        assert_eq!(back.capacity, DEFAULT_CAPACITY);
        assert!(back.signs.is_empty());
        assert!(back.overrides.is_empty());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let space: Space = serde_json::from_str(r#"{"name":"Old"}"#).unwrap();
        assert_eq!(space.capacity, DEFAULT_CAPACITY);
        assert!(!space.limited.is_active());
    }
}

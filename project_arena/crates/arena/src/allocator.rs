use rand::seq::SliceRandom;
use rand::Rng;
use space::Space;

/// Which loadout a joining player receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// The player's sticky preference, still offered by the space.
    Preferred(String),
    /// The capacity-limited template; the session must be marked as a holder.
    Limited(String),
    Random(String),
    /// Nothing to hand out: the inventory is cleared.
    Empty,
}

impl Allocation {
    pub fn template(&self) -> Option<&str> {
        match self {
            Self::Preferred(t) | Self::Limited(t) | Self::Random(t) => Some(t),
            Self::Empty => None,
        }
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, Self::Limited(_))
    }
}

/// Pick a loadout for a player joining `space`.
///
/// `limited_holders` is the number of *other* occupants currently marked as
/// holding the limited loadout. Counting and marking happen within the same
/// event turn, so no other join can interleave.
pub fn select<R: Rng + ?Sized>(
    space: &Space,
    preference: Option<&str>,
    limited_holders: usize,
    rng: &mut R,
) -> Allocation {
    if space.templates.is_empty() {
        return Allocation::Empty;
    }

    if let Some(pref) = preference {
        if !space.limited.reserves(pref) {
            if let Some(name) = space.offered_name(pref) {
                return Allocation::Preferred(name.to_string());
            }
        }
    }

    let limited = &space.limited;
    if limited.is_active() && limited_holders < limited.capacity as usize {
        return Allocation::Limited(limited.template.clone());
    }

    let open: Vec<&str> = space.open_templates().collect();
    match open.choose(rng) {
        Some(name) => Allocation::Random(name.to_string()),
        None => Allocation::Empty,
    }
}

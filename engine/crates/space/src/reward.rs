use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::TilePos;

/// Circular zone paying a flat reward to players standing in it, at most
/// once per cooldown per player.
///
/// `last_reward` maps player slot to unix milliseconds of the last payout.
/// Entries are never evicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardArea {
    pub name: String,
    pub center: TilePos,
    pub radius: i32,
    pub reward: i64,
    pub cooldown_secs: i64,
    #[serde(default)]
    pub last_reward: BTreeMap<u16, i64>,
}

impl RewardArea {
    pub fn new(name: impl Into<String>, center: TilePos, radius: i32, reward: i64, cooldown_secs: i64) -> Self {
        Self {
            name: name.into(),
            center,
            radius,
            reward,
            cooldown_secs,
            last_reward: BTreeMap::new(),
        }
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        self.center.distance_to(pos) <= self.radius
    }

    /// Whether `player` at `pos` is due a payout at `now_ms`.
    pub fn is_due(&self, player: u16, pos: TilePos, now_ms: i64) -> bool {
        if !self.contains(pos) {
            return false;
        }
        match self.last_reward.get(&player) {
            None => true,
            Some(&last) => now_ms.saturating_sub(last) >= self.cooldown_secs.saturating_mul(1000),
        }
    }

    pub fn record_payout(&mut self, player: u16, now_ms: i64) {
        self.last_reward.insert(player, now_ms);
    }
}

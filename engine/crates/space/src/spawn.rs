use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{RandomSpawn, Space, TilePos};

/// Playable world extent in tiles. Random points stay `margin` tiles away
/// from every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBounds {
    pub width: i32,
    pub height: i32,
    pub border_margin: i32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 8400,
            height: 2400,
            border_margin: 100,
        }
    }
}

impl WorldBounds {
    /// Uniform point in `[margin, extent - margin)` on each axis. Degenerate
    /// bounds collapse to the margin.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> TilePos {
        let lo = self.border_margin;
        let axis = |rng: &mut R, extent: i32| {
            let hi = extent - self.border_margin;
            if hi > lo {
                rng.gen_range(lo..hi)
            } else {
                lo
            }
        };
        let x = axis(rng, self.width);
        let y = axis(rng, self.height);
        TilePos::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnResolution {
    pub target: TilePos,
    /// A new random point was generated and must be persisted.
    pub refreshed: bool,
}

/// Single-slot random spawn cache with a refresh interval.
#[derive(Debug, Clone, Copy)]
pub struct SpawnCache {
    pub bounds: WorldBounds,
    pub refresh_secs: i64,
}

impl SpawnCache {
    pub fn new(bounds: WorldBounds, refresh_secs: i64) -> Self {
        Self {
            bounds,
            refresh_secs,
        }
    }

    pub fn is_stale(&self, space: &Space, now_secs: i64) -> bool {
        match space.random_spawn {
            None => true,
            Some(cached) => now_secs - cached.generated_at >= self.refresh_secs,
        }
    }

    /// Refresh the space's cached point when stale and return the teleport target.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        space: &mut Space,
        now_secs: i64,
        rng: &mut R,
    ) -> SpawnResolution {
        let refreshed = self.is_stale(space, now_secs);
        if refreshed {
            let pos = self.bounds.random_point(rng);
            space.random_spawn = Some(RandomSpawn {
                pos,
                generated_at: now_secs,
            });
            tracing::debug!(space = %space.name, %pos, "random spawn refreshed");
        }
        SpawnResolution {
            target: space.teleport_target(),
            refreshed,
        }
    }
}

pub mod model;
pub mod registry;
pub mod reward;
pub mod spawn;

pub use model::{LimitedLoadout, RandomSpawn, Space, SpaceError, TilePos, DEFAULT_CAPACITY};
pub use registry::SpaceRegistry;
pub use reward::RewardArea;
pub use spawn::{SpawnCache, SpawnResolution, WorldBounds};

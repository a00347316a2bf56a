pub mod admin;
pub mod allocator;
pub mod error;
pub mod membership;
pub mod rewards;
pub mod settings;
pub mod signs;
pub mod state;
pub mod sync;

#[cfg(test)]
mod testing;

pub use admin::SpaceSummary;
pub use allocator::Allocation;
pub use error::ArenaError;
pub use membership::JoinReport;
pub use settings::ArenaSettings;
pub use signs::SignOutcome;
pub use state::ArenaCore;

pub mod error;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use error::PersistenceError;
pub use sqlite::SqliteStore;
pub use store::ArenaStore;

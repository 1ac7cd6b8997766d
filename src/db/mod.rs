pub mod seed;
pub mod sqlite;
pub mod store;

pub use sqlite::{create_pool, run_migrations, SqliteStore};
pub use store::MusicStore;

#[cfg(test)]
pub use store::MockMusicStore;

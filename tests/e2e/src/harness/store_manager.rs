//! Test Store Manager
//!
//! Provides isolated experience stores for testing:
//! - Temporary SQLite databases that are automatically cleaned up
//! - In-memory stores for tests that don't need durability
//! - Concurrent test isolation (one database file per manager)

use std::path::PathBuf;
use std::sync::Arc;

use reverie_core::storage::{ExperienceStore, MemoryStore, SqliteStore};
use tempfile::TempDir;

/// Manager for isolated test stores
///
/// Creates one database per test to prevent interference. The backing
/// temporary directory is deleted when the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let manager = TestStoreManager::new_temp();
/// let store = manager.store();
/// store.store(ExperienceInput::user_message("u1", "hello"))?;
/// ```
pub struct TestStoreManager {
    store: Arc<SqliteStore>,
    /// Kept alive to prevent premature deletion
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl TestStoreManager {
    /// Open a fresh SQLite store in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("reverie-test.db");
        let store = SqliteStore::new(Some(db_path.clone())).expect("open test store");
        Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// Shared handle to the store as the trait object engines take
    pub fn store(&self) -> Arc<dyn ExperienceStore> {
        Arc::clone(&self.store) as Arc<dyn ExperienceStore>
    }

    /// The concrete store, for assertions on storage behavior
    pub fn sqlite(&self) -> Arc<SqliteStore> {
        Arc::clone(&self.store)
    }

    /// Path to the backing database file
    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }
}

/// A throwaway in-memory store for tests that don't need durability
pub fn memory_store() -> Arc<dyn ExperienceStore> {
    Arc::new(MemoryStore::new())
}

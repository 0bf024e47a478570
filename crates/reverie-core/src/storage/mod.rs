//! Storage Module
//!
//! Experience persistence with:
//! - SQLite-backed store with versioned migrations
//! - In-memory store with identical observable behavior
//! - Keyword similarity lookup over stored payloads
//! - Retention cleanup via archival marking

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use migrations::{apply_migrations, MIGRATIONS};
pub use sqlite::SqliteStore;

use crate::experience::{Experience, ExperienceInput, ExperienceStats};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Payload serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Lock poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// EXPERIENCE STORE
// ============================================================================

/// Default number of records kept by [`ExperienceStore::cleanup`]
pub const DEFAULT_RETENTION: usize = 1000;

/// Default result limit for [`ExperienceStore::find_similar`]
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// Persistence seam for experience records
///
/// Implementations enrich on store (tags, intensity, importance boosts)
/// and never surface archived records from `retrieve`. All methods take
/// `&self` so engines can share a store behind `Arc<dyn ExperienceStore>`.
pub trait ExperienceStore: Send + Sync {
    /// Enrich and persist a new experience, returning the stored record
    fn store(&self, input: ExperienceInput) -> Result<Experience>;

    /// Most recent unarchived records for a user, newest first
    fn retrieve(&self, user_id: &str, limit: usize) -> Result<Vec<Experience>>;

    /// Keyword lookup over payload and emotional context
    ///
    /// Case-insensitive substring match, ordered by importance then
    /// recency.
    fn find_similar(&self, user_id: &str, query: &str, limit: usize) -> Result<Vec<Experience>>;

    /// Archive everything beyond the `keep` most important records
    ///
    /// Ties break toward recency. Returns the number of records archived.
    fn cleanup(&self, user_id: &str, keep: usize) -> Result<usize>;

    /// Summary statistics over a user's unarchived records
    fn stats(&self, user_id: &str) -> Result<ExperienceStats>;
}

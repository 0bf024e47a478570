//! SQLite Experience Store
//!
//! Durable experience log. Every write is committed before the call
//! returns; a crash between calls never loses acknowledged records.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use super::{ExperienceStore, Result, StorageError};
use crate::experience::{Experience, ExperienceInput, ExperienceStats, MemoryHealth};

// ============================================================================
// SQLITE STORE
// ============================================================================

/// SQLite-backed experience store
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self`, making the store `Send + Sync` so engines
/// can share it behind `Arc<dyn ExperienceStore>`.
pub struct SqliteStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl SqliteStore {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        // Apply encryption key if SQLCipher is enabled and key is provided
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("REVERIE_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Create a new store instance
    ///
    /// `db_path: None` resolves to the platform data directory.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "reverie", "core").ok_or_else(|| {
                    StorageError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                // Restrict directory permissions to owner-only on Unix
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("reverie.db")
            }
        };

        let writer_conn = Connection::open(&path)?;

        // Restrict database file permissions to owner-only on Unix
        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    /// Parse a stored timestamp, degrading to `None` on malformed values
    fn parse_timestamp(value: &str, id: &str) -> Option<DateTime<Utc>> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!("Malformed timestamp '{}' on experience {}: {}", value, id, e);
                None
            }
        }
    }

    /// Convert a row to an Experience
    ///
    /// One unreadable row degrades to a placeholder record instead of
    /// failing the whole batch.
    fn row_to_experience(row: &rusqlite::Row) -> rusqlite::Result<Experience> {
        let id: String = row.get("id")?;
        let user_id: String = row.get("user_id")?;
        let payload_json: String = row.get("payload")?;
        let context_json: String = row.get("emotional_context")?;
        let importance: f64 = row.get("importance")?;
        let timestamp_raw: String = row.get("timestamp")?;
        let tags_json: String = row.get("tags")?;
        let archived: i64 = row.get("archived")?;

        let timestamp = Self::parse_timestamp(&timestamp_raw, &id);

        let payload: Map<String, Value> = match serde_json::from_str(&payload_json) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Unparseable payload on experience {}: {}", id, e);
                let mut fallback = Experience::parse_fallback(&user_id, &payload_json, timestamp);
                fallback.id = id;
                return Ok(fallback);
            }
        };
        let emotional_context = serde_json::from_str(&context_json).unwrap_or_default();
        let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();

        Ok(Experience {
            id,
            user_id,
            payload,
            emotional_context,
            importance,
            timestamp,
            tags,
            archived: archived != 0,
        })
    }

    /// Escape LIKE wildcards in a user-provided query
    fn escape_like(query: &str) -> String {
        query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    }
}

impl ExperienceStore for SqliteStore {
    fn store(&self, input: ExperienceInput) -> Result<Experience> {
        let (enriched, tags) = input.enriched();
        let id = Uuid::new_v4().to_string();
        let timestamp = enriched.timestamp.unwrap_or_else(Utc::now);

        let payload_json = serde_json::to_string(&enriched.payload)?;
        let context_json = serde_json::to_string(&enriched.emotional_context)?;
        let tags_json = serde_json::to_string(&tags)?;

        {
            let writer = self
                .writer
                .lock()
                .map_err(|_| StorageError::LockPoisoned("experience writer".to_string()))?;
            writer.execute(
                "INSERT INTO experiences (
                    id, user_id, payload, emotional_context,
                    importance, timestamp, tags, archived
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
                params![
                    id,
                    enriched.user_id,
                    payload_json,
                    context_json,
                    enriched.importance,
                    timestamp.to_rfc3339(),
                    tags_json,
                ],
            )?;
        }

        tracing::debug!(user_id = %enriched.user_id, experience_id = %id, "Stored experience");

        Ok(Experience {
            id,
            user_id: enriched.user_id,
            payload: enriched.payload,
            emotional_context: enriched.emotional_context,
            importance: enriched.importance,
            timestamp: Some(timestamp),
            tags,
            archived: false,
        })
    }

    fn retrieve(&self, user_id: &str, limit: usize) -> Result<Vec<Experience>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::LockPoisoned("experience reader".to_string()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM experiences
             WHERE user_id = ?1 AND archived = 0
             ORDER BY timestamp DESC
             LIMIT ?2",
        )?;

        let records = stmt
            .query_map(params![user_id, limit as i64], Self::row_to_experience)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn find_similar(&self, user_id: &str, query: &str, limit: usize) -> Result<Vec<Experience>> {
        let needle = format!("%{}%", Self::escape_like(&query.to_lowercase()));

        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::LockPoisoned("experience reader".to_string()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM experiences
             WHERE user_id = ?1 AND archived = 0
               AND (LOWER(payload) LIKE ?2 ESCAPE '\\'
                    OR LOWER(emotional_context) LIKE ?2 ESCAPE '\\')
             ORDER BY importance DESC, timestamp DESC
             LIMIT ?3",
        )?;

        let records = stmt
            .query_map(
                params![user_id, needle, limit as i64],
                Self::row_to_experience,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn cleanup(&self, user_id: &str, keep: usize) -> Result<usize> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::LockPoisoned("experience writer".to_string()))?;
        let archived = writer.execute(
            "UPDATE experiences SET archived = 1
             WHERE user_id = ?1 AND archived = 0
               AND id NOT IN (
                   SELECT id FROM experiences
                   WHERE user_id = ?1 AND archived = 0
                   ORDER BY importance DESC, timestamp DESC
                   LIMIT ?2
               )",
            params![user_id, keep as i64],
        )?;

        if archived > 0 {
            tracing::info!(user_id = %user_id, archived, "Archived low-importance experiences");
        }
        Ok(archived)
    }

    fn stats(&self, user_id: &str) -> Result<ExperienceStats> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::LockPoisoned("experience reader".to_string()))?;

        let (count, average, earliest_raw, latest_raw) = reader.query_row(
            "SELECT COUNT(*), AVG(importance), MIN(timestamp), MAX(timestamp)
             FROM experiences
             WHERE user_id = ?1 AND archived = 0",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )?;

        let total = count.max(0) as usize;
        Ok(ExperienceStats {
            total_experiences: total,
            average_importance: average.unwrap_or(0.0),
            earliest: earliest_raw.and_then(|s| Self::parse_timestamp(&s, "stats")),
            latest: latest_raw.and_then(|s| Self::parse_timestamp(&s, "stats")),
            memory_health: MemoryHealth::from_count(total),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

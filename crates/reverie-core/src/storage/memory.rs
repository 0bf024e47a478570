//! In-Memory Experience Store
//!
//! Store implementation backed by a per-user vector. Observable behavior
//! matches [`SqliteStore`]; intended for tests and embedded callers that
//! do not want a database file.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::{ExperienceStore, Result, StorageError};
use crate::experience::{Experience, ExperienceInput, ExperienceStats};

/// In-memory experience store
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Vec<Experience>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built record, bypassing ingest enrichment
    ///
    /// Lets tests shape edge cases (missing timestamps, pre-archived
    /// rows) that the normal write path never produces.
    pub fn insert_raw(&self, record: Experience) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned("experience records".to_string()))?;
        records.entry(record.user_id.clone()).or_default().push(record);
        Ok(())
    }

    /// Missing timestamps sort as newest
    fn sort_key(record: &Experience) -> DateTime<Utc> {
        record.timestamp.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl ExperienceStore for MemoryStore {
    fn store(&self, input: ExperienceInput) -> Result<Experience> {
        let (enriched, tags) = input.enriched();
        let timestamp = enriched.timestamp.unwrap_or_else(Utc::now);

        let record = Experience {
            id: Uuid::new_v4().to_string(),
            user_id: enriched.user_id.clone(),
            payload: enriched.payload,
            emotional_context: enriched.emotional_context,
            importance: enriched.importance,
            timestamp: Some(timestamp),
            tags,
            archived: false,
        };

        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned("experience records".to_string()))?;
        records
            .entry(enriched.user_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn retrieve(&self, user_id: &str, limit: usize) -> Result<Vec<Experience>> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned("experience records".to_string()))?;

        let mut visible: Vec<Experience> = records
            .get(user_id)
            .map(|rs| rs.iter().filter(|r| !r.archived).cloned().collect())
            .unwrap_or_default();
        visible.sort_by(|a, b| Self::sort_key(b).cmp(&Self::sort_key(a)));
        visible.truncate(limit);
        Ok(visible)
    }

    fn find_similar(&self, user_id: &str, query: &str, limit: usize) -> Result<Vec<Experience>> {
        let needle = query.to_lowercase();
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned("experience records".to_string()))?;

        let mut hits = Vec::new();
        for record in records.get(user_id).into_iter().flatten() {
            if record.archived {
                continue;
            }
            let payload_text = serde_json::to_string(&record.payload)?.to_lowercase();
            let context_text = serde_json::to_string(&record.emotional_context)?.to_lowercase();
            if payload_text.contains(&needle) || context_text.contains(&needle) {
                hits.push(record.clone());
            }
        }

        hits.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| Self::sort_key(b).cmp(&Self::sort_key(a)))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    fn cleanup(&self, user_id: &str, keep: usize) -> Result<usize> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned("experience records".to_string()))?;

        let Some(user_records) = records.get_mut(user_id) else {
            return Ok(0);
        };

        let mut live: Vec<usize> = user_records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.archived)
            .map(|(i, _)| i)
            .collect();
        if live.len() <= keep {
            return Ok(0);
        }

        live.sort_by(|&a, &b| {
            let (ra, rb) = (&user_records[a], &user_records[b]);
            rb.importance
                .partial_cmp(&ra.importance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| Self::sort_key(rb).cmp(&Self::sort_key(ra)))
        });

        let mut archived = 0;
        for &index in live.iter().skip(keep) {
            user_records[index].archived = true;
            archived += 1;
        }

        if archived > 0 {
            tracing::info!(user_id = %user_id, archived, "Archived low-importance experiences");
        }
        Ok(archived)
    }

    fn stats(&self, user_id: &str) -> Result<ExperienceStats> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned("experience records".to_string()))?;
        let visible: Vec<Experience> = records
            .get(user_id)
            .map(|rs| rs.iter().filter(|r| !r.archived).cloned().collect())
            .unwrap_or_default();
        Ok(ExperienceStats::from_records(&visible))
    }
}

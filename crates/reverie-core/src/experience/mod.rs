//! Experience module - Records and ingest enrichment
//!
//! Everything Reverie knows about a user starts as an experience record:
//! - Free-form payload with a `type` tag and optional message text
//! - Emotional context as a name-to-intensity map
//! - Importance scoring with ingest-time boosts
//! - Semantic tags derived at store time

mod record;

pub use record::{
    derive_tags, emotional_intensity, enhanced_importance, Experience, ExperienceInput,
    CONSOLIDATED_MEMORY_KIND, DEFAULT_IMPORTANCE, KIND_KEY, MESSAGE_KEY, USER_MESSAGE_KIND,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// MEMORY HEALTH
// ============================================================================

/// Coarse health grade for a user's experience history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemoryHealth {
    /// More than 50 records on file
    Excellent,
    /// More than 10 records on file
    Good,
    /// At least one record, still accumulating
    Developing,
    /// Nothing stored yet
    NoData,
}

impl MemoryHealth {
    /// Grade a record count
    pub fn from_count(count: usize) -> Self {
        if count == 0 {
            MemoryHealth::NoData
        } else if count > 50 {
            MemoryHealth::Excellent
        } else if count > 10 {
            MemoryHealth::Good
        } else {
            MemoryHealth::Developing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryHealth::Excellent => "excellent",
            MemoryHealth::Good => "good",
            MemoryHealth::Developing => "developing",
            MemoryHealth::NoData => "no_data",
        }
    }
}

impl std::fmt::Display for MemoryHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemoryHealth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excellent" => Ok(MemoryHealth::Excellent),
            "good" => Ok(MemoryHealth::Good),
            "developing" => Ok(MemoryHealth::Developing),
            "no_data" | "nodata" => Ok(MemoryHealth::NoData),
            _ => Err(format!("Unknown memory health: {}", s)),
        }
    }
}

// ============================================================================
// EXPERIENCE STATISTICS
// ============================================================================

/// Per-user summary of stored experiences
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceStats {
    /// Number of unarchived records
    pub total_experiences: usize,
    /// Mean importance across unarchived records
    pub average_importance: f64,
    /// Timestamp of the oldest record
    pub earliest: Option<DateTime<Utc>>,
    /// Timestamp of the newest record
    pub latest: Option<DateTime<Utc>>,
    /// Coarse health grade derived from the count
    pub memory_health: MemoryHealth,
}

impl Default for ExperienceStats {
    fn default() -> Self {
        Self {
            total_experiences: 0,
            average_importance: 0.0,
            earliest: None,
            latest: None,
            memory_health: MemoryHealth::NoData,
        }
    }
}

impl ExperienceStats {
    /// Summarize a batch of records
    pub fn from_records(records: &[Experience]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let total = records.len();
        let average_importance =
            records.iter().map(|r| r.importance).sum::<f64>() / total as f64;
        let timestamps: Vec<DateTime<Utc>> =
            records.iter().filter_map(|r| r.timestamp).collect();
        Self {
            total_experiences: total,
            average_importance,
            earliest: timestamps.iter().min().copied(),
            latest: timestamps.iter().max().copied(),
            memory_health: MemoryHealth::from_count(total),
        }
    }
}

//! # Experience Records
//!
//! The unit of memory in Reverie: a timestamped record of one user
//! interaction, with free-form payload, emotional context, and an
//! importance score. Records are immutable once stored; cleanup archives
//! rather than deletes.
//!
//! Ingest enrichment mirrors what callers get for free when they store
//! through [`ExperienceInput::enriched`]: an emotional-intensity estimate,
//! semantic tags for indexing, and importance boosts for emotionally
//! loaded or help-seeking content.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Payload key carrying the record kind tag
pub const KIND_KEY: &str = "type";

/// Payload key carrying optional message text
pub const MESSAGE_KEY: &str = "message";

/// Kind tag used for synthetic consolidation records
pub const CONSOLIDATED_MEMORY_KIND: &str = "consolidated_memory";

/// Kind tag used for ordinary user messages
pub const USER_MESSAGE_KIND: &str = "user_message";

/// Importance applied when the caller does not provide one
pub const DEFAULT_IMPORTANCE: f64 = 0.5;

// ============================================================================
// EXPERIENCE RECORD
// ============================================================================

/// One recorded user interaction
///
/// Owned canonically by the experience store; every other component holds
/// read-only derived views. `timestamp` is `None` when the stored value
/// could not be parsed - such records are excluded from temporal analysis
/// but participate in everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Owner of the record
    pub user_id: String,

    // ===== Content =====
    /// Free-form payload; carries at least a `type` tag, usually `message`
    pub payload: Map<String, Value>,

    /// Emotion name to intensity in [0,1]
    #[serde(default)]
    pub emotional_context: HashMap<String, f64>,

    // ===== Scoring =====
    /// Importance in [0,1]
    pub importance: f64,

    // ===== Bookkeeping =====
    /// Creation time; `None` when the stored timestamp was malformed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Semantic tags derived at ingest (`type:`, `topic:`, `emotion:`, `time:`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Archival marker; archived records drop out of retrieval
    #[serde(default)]
    pub archived: bool,
}

impl Experience {
    /// Kind tag from the payload, if present
    pub fn kind(&self) -> Option<&str> {
        self.payload.get(KIND_KEY).and_then(Value::as_str)
    }

    /// Message text from the payload, if present
    pub fn message(&self) -> Option<&str> {
        self.payload.get(MESSAGE_KEY).and_then(Value::as_str)
    }

    /// Whether this record is an ordinary user message
    pub fn is_user_message(&self) -> bool {
        self.kind() == Some(USER_MESSAGE_KIND)
    }

    /// Whether this record is a synthetic consolidation
    pub fn is_consolidated_memory(&self) -> bool {
        self.kind() == Some(CONSOLIDATED_MEMORY_KIND)
    }

    /// Placeholder record substituted when a stored row cannot be parsed
    ///
    /// Keeps retrieval total: one bad row degrades to a low-signal record
    /// instead of failing the batch.
    pub fn parse_fallback(user_id: &str, raw: &str, timestamp: Option<DateTime<Utc>>) -> Self {
        let mut payload = Map::new();
        payload.insert("content".to_string(), Value::from("parsing_error"));
        payload.insert("rawData".to_string(), Value::from(raw));
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            payload,
            emotional_context: HashMap::new(),
            importance: DEFAULT_IMPORTANCE,
            timestamp,
            tags: Vec::new(),
            archived: false,
        }
    }
}

// ============================================================================
// INGEST INPUT
// ============================================================================

/// Input for storing a new experience
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExperienceInput {
    /// Owner of the record
    pub user_id: String,

    /// Free-form payload; should carry a `type` tag
    pub payload: Map<String, Value>,

    /// Emotion name to intensity in [0,1]
    #[serde(default)]
    pub emotional_context: HashMap<String, f64>,

    /// Base importance in [0,1]; clamped on store
    #[serde(default = "default_importance")]
    pub importance: f64,

    /// Explicit creation time; `None` means "now"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn default_importance() -> f64 {
    DEFAULT_IMPORTANCE
}

impl Default for ExperienceInput {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            payload: Map::new(),
            emotional_context: HashMap::new(),
            importance: DEFAULT_IMPORTANCE,
            timestamp: None,
        }
    }
}

impl ExperienceInput {
    /// Minimal input: a user message with the given text
    pub fn user_message(user_id: &str, message: &str) -> Self {
        let mut payload = Map::new();
        payload.insert(KIND_KEY.to_string(), Value::from(USER_MESSAGE_KIND));
        payload.insert(MESSAGE_KEY.to_string(), Value::from(message));
        Self {
            user_id: user_id.to_string(),
            payload,
            ..Default::default()
        }
    }

    /// Attach emotional context
    pub fn with_emotional_context(mut self, context: HashMap<String, f64>) -> Self {
        self.emotional_context = context;
        self
    }

    /// Attach a base importance
    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    /// Attach an explicit timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Message text from the payload, if present
    pub fn message(&self) -> Option<&str> {
        self.payload.get(MESSAGE_KEY).and_then(Value::as_str)
    }

    /// Apply ingest enrichment: intensity estimate, semantic tags, and
    /// importance boosts
    ///
    /// Returns the tags separately so the store can index them; the
    /// estimated intensity lands in the payload under `emotionalIntensity`.
    pub fn enriched(mut self) -> (Self, Vec<String>) {
        let intensity = emotional_intensity(&self.emotional_context);
        self.payload
            .insert("emotionalIntensity".to_string(), Value::from(intensity));

        let reference = self.timestamp.unwrap_or_else(Utc::now);
        let tags = derive_tags(&self.payload, &self.emotional_context, reference);

        self.importance = enhanced_importance(
            self.message(),
            &self.emotional_context,
            self.importance,
        );
        (self, tags)
    }
}

// ============================================================================
// ENRICHMENT
// ============================================================================

/// Intensity weight per recognized emotion key
const INTENSITY_INDICATORS: [(&str, f64); 20] = [
    ("stress", 0.8),
    ("stressed", 0.8),
    ("anxiety", 0.7),
    ("excited", 0.7),
    ("happy", 0.6),
    ("joy", 0.6),
    ("angry", 0.9),
    ("frustrated", 0.7),
    ("upset", 0.6),
    ("sad", 0.6),
    ("worried", 0.7),
    ("concerned", 0.5),
    ("seeking_help", 0.5),
    ("positive", 0.4),
    ("calm", 0.2),
    ("negative", 0.6),
    ("confused", 0.4),
    ("uncertain", 0.3),
    ("urgency", 0.8),
    ("emergency", 0.9),
];

/// Topic keyword groups used for `topic:` tags
const TAG_TOPICS: [(&str, &[&str]); 7] = [
    ("work", &["work", "job", "career", "office", "project", "deadline", "meeting"]),
    ("stress", &["stress", "overwhelmed", "pressure", "anxiety", "worried"]),
    ("help", &["help", "assist", "support", "guidance", "stuck"]),
    ("time", &["time", "schedule", "busy", "calendar", "manage"]),
    ("learning", &["learn", "understand", "study", "confused", "education"]),
    ("health", &["health", "tired", "sleep", "exercise", "wellness"]),
    ("social", &["family", "friend", "colleague", "relationship", "social"]),
];

/// Estimate overall emotional intensity from a context map
///
/// Takes the strongest weighted signal: each recognized emotion key
/// contributes `value * weight`, and the maximum wins.
pub fn emotional_intensity(context: &HashMap<String, f64>) -> f64 {
    let mut max_intensity: f64 = 0.0;
    for (emotion, value) in context {
        let key = emotion.to_lowercase();
        if let Some((_, weight)) = INTENSITY_INDICATORS.iter().find(|(name, _)| *name == key) {
            max_intensity = max_intensity.max(value * weight);
        }
    }
    max_intensity.min(1.0)
}

/// Derive semantic tags for a record
pub fn derive_tags(
    payload: &Map<String, Value>,
    context: &HashMap<String, f64>,
    reference: DateTime<Utc>,
) -> Vec<String> {
    let mut tags = Vec::new();

    if let Some(kind) = payload.get(KIND_KEY).and_then(Value::as_str) {
        tags.push(format!("type:{kind}"));
    }

    if let Some(message) = payload.get(MESSAGE_KEY).and_then(Value::as_str) {
        let lowered = message.to_lowercase();
        for (topic, keywords) in TAG_TOPICS {
            if keywords.iter().any(|k| lowered.contains(k)) {
                tags.push(format!("topic:{topic}"));
            }
        }
    }

    for emotion in context.keys() {
        tags.push(format!("emotion:{}", emotion.to_lowercase()));
    }

    let hour = reference.hour();
    let period = if (6..12).contains(&hour) {
        "morning"
    } else if (12..18).contains(&hour) {
        "afternoon"
    } else {
        "evening"
    };
    tags.push(format!("time:{period}"));

    tags.sort();
    tags.dedup();
    tags
}

/// Boost a base importance from content signals, clamped to [0,1]
pub fn enhanced_importance(
    message: Option<&str>,
    context: &HashMap<String, f64>,
    base: f64,
) -> f64 {
    let mut importance = base.clamp(0.0, 1.0);

    importance += emotional_intensity(context) * 0.3;

    if let Some(message) = message {
        if message.len() > 100 {
            importance += 0.1;
        }
        let lowered = message.to_lowercase();
        if ["help", "urgent", "important", "emergency"]
            .iter()
            .any(|w| lowered.contains(w))
        {
            importance += 0.2;
        }
        if ["stressed", "overwhelmed", "anxious"]
            .iter()
            .any(|w| lowered.contains(w))
        {
            importance += 0.15;
        }
    }

    importance.min(1.0)
}

// ============================================================================
// TESTS
// ============================================================================

//! # Relationship Entities
//!
//! One entity per (user, name) pair: a person, place, or concept the
//! user mentions, with cumulative relationship metrics. Entities are
//! never deleted; they represent relationship memory that only
//! accumulates.
//!
//! Extraction is table-driven: possessive person phrases, place nouns,
//! and concept keyword groups. The tables are deliberately small - the
//! point is to track the handful of entities that recur, not to be a
//! general NER pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Interactions retained per entity; counts are unbounded
pub const INTERACTION_HISTORY_CAPACITY: usize = 50;

/// Characters of surrounding message kept as mention context
const CONTEXT_WINDOW: usize = 20;

/// Emotion keys that mark an interaction as positive
pub const POSITIVE_EMOTIONS: [&str; 4] = ["positive", "happy", "excited", "grateful"];

/// Emotion keys that mark an interaction as negative
pub const NEGATIVE_EMOTIONS: [&str; 4] = ["stress", "frustrated", "angry", "sad"];

// ============================================================================
// EXTRACTION TABLES
// ============================================================================

/// Possessive phrases that name a person ("my boss" tracks entity "boss")
const PERSON_PHRASES: [&str; 7] = [
    "my boss",
    "my manager",
    "my colleague",
    "my friend",
    "my family",
    "my partner",
    "my spouse",
];

/// Place nouns tracked as entities
const PLACE_NOUNS: [&str; 8] = [
    "office", "home", "work", "gym", "school", "hospital", "store", "restaurant",
];

/// Concept keyword groups; the first keyword anchors the context window
const CONCEPT_GROUPS: [(&str, &[&str]); 5] = [
    ("work_project", &["project", "task", "assignment", "deadline"]),
    ("health", &["doctor", "exercise", "diet", "sleep"]),
    ("learning", &["course", "study", "book", "skill"]),
    ("technology", &["computer", "software", "app", "device"]),
    ("finance", &["money", "budget", "savings", "investment"]),
];

// ============================================================================
// ENTITY TYPE
// ============================================================================

/// What kind of thing an entity is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Place,
    Concept,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "person",
            EntityType::Place => "place",
            EntityType::Concept => "concept",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "person" => Ok(EntityType::Person),
            "place" => Ok(EntityType::Place),
            "concept" => Ok(EntityType::Concept),
            _ => Err(format!("Unknown entity type: {}", s)),
        }
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// One entity mention found in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntity {
    /// Normalized entity name ("boss", "office", "work_project")
    pub name: String,
    pub entity_type: EntityType,
    /// Message excerpt around the mention
    pub context: String,
}

/// All entity mentions in a message, table order
pub fn extract_entities(message: &str) -> Vec<ExtractedEntity> {
    let lowered = message.to_lowercase();
    let mut entities = Vec::new();

    for phrase in PERSON_PHRASES {
        if lowered.contains(phrase) {
            entities.push(ExtractedEntity {
                name: phrase.trim_start_matches("my ").to_string(),
                entity_type: EntityType::Person,
                context: context_around(message, &lowered, phrase),
            });
        }
    }

    for place in PLACE_NOUNS {
        if lowered.contains(place) {
            entities.push(ExtractedEntity {
                name: place.to_string(),
                entity_type: EntityType::Place,
                context: context_around(message, &lowered, place),
            });
        }
    }

    for (concept, keywords) in CONCEPT_GROUPS {
        if let Some(hit) = keywords.iter().find(|k| lowered.contains(*k)) {
            entities.push(ExtractedEntity {
                name: concept.to_string(),
                entity_type: EntityType::Concept,
                context: context_around(message, &lowered, hit),
            });
        }
    }

    entities
}

/// Excerpt around the first match, clamped to char boundaries
fn context_around(message: &str, lowered: &str, needle: &str) -> String {
    let Some(at) = lowered.find(needle) else {
        return message.chars().take(50).collect();
    };
    let start = message
        .char_indices()
        .map(|(i, _)| i)
        .filter(|&i| i <= at)
        .rev()
        .nth(CONTEXT_WINDOW - 1)
        .unwrap_or(0);
    let end = message
        .char_indices()
        .map(|(i, _)| i)
        .find(|&i| i >= at + needle.len() + CONTEXT_WINDOW)
        .unwrap_or(message.len());
    message[start..end].trim().to_string()
}

// ============================================================================
// INTERACTION RECORD
// ============================================================================

/// One recorded mention of an entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    /// Full message that mentioned the entity
    pub message: String,
    /// Excerpt around the mention
    pub context: String,
    /// Emotional context active at the time
    #[serde(default)]
    pub emotional_context: HashMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(message: &str, context: &str, emotional_context: HashMap<String, f64>) -> Self {
        Self {
            message: message.to_string(),
            context: context.to_string(),
            emotional_context,
            timestamp: Utc::now(),
        }
    }

    /// Whether the associated emotions intersect the positive set
    pub fn is_positive(&self) -> bool {
        self.emotional_context
            .keys()
            .any(|e| POSITIVE_EMOTIONS.contains(&e.to_lowercase().as_str()))
    }

    /// Whether the associated emotions intersect the negative set
    pub fn is_negative(&self) -> bool {
        self.emotional_context
            .keys()
            .any(|e| NEGATIVE_EMOTIONS.contains(&e.to_lowercase().as_str()))
    }

    /// Context tags for this interaction (emotions plus topic markers)
    pub fn context_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .emotional_context
            .keys()
            .map(|e| format!("emotion:{}", e.to_lowercase()))
            .collect();

        let lowered = self.message.to_lowercase();
        if lowered.contains("work") {
            tags.push("context:work".to_string());
        }
        if lowered.contains("help") {
            tags.push("context:help".to_string());
        }
        if lowered.contains("problem") || lowered.contains("issue") {
            tags.push("context:problem".to_string());
        }
        if lowered.contains("good") || lowered.contains("great") {
            tags.push("context:positive".to_string());
        }

        tags.sort();
        tags.dedup();
        tags
    }
}

// ============================================================================
// RELATIONSHIP WEIGHTS
// ============================================================================

/// Tunable constants for relationship scoring
///
/// The defaults are the empirically chosen values; treat them as
/// starting points, not business rules.
#[derive(Debug, Clone)]
pub struct RelationshipWeights {
    /// Familiarity on first mention
    pub initial_familiarity: f64,
    /// Strength on first mention
    pub initial_strength: f64,
    /// Trust on first mention
    pub initial_trust: f64,
    /// Interactions after which familiarity saturates at 1.0
    pub familiarity_saturation: f64,
    /// Familiarity share of the strength blend
    pub strength_familiarity_weight: f64,
    /// Positivity share of the strength blend
    pub strength_positivity_weight: f64,
}

impl Default for RelationshipWeights {
    fn default() -> Self {
        Self {
            initial_familiarity: 0.05,
            initial_strength: 0.1,
            initial_trust: 0.5,
            familiarity_saturation: 20.0,
            strength_familiarity_weight: 0.6,
            strength_positivity_weight: 0.4,
        }
    }
}

// ============================================================================
// RELATIONSHIP ENTITY
// ============================================================================

/// Cumulative relationship state for one tracked entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEntity {
    pub entity_name: String,
    pub entity_type: EntityType,

    // ===== Metrics =====
    /// Blended familiarity/positivity score in [0,1]
    pub relationship_strength: f64,
    /// Trust in [0,1]; starts neutral
    pub trust_level: f64,
    /// Interaction count scaled to [0,1]
    pub familiarity: f64,
    /// Emotion to intensity, blended `(old+new)/2` per mention
    pub emotional_associations: HashMap<String, f64>,

    // ===== Interaction tracking =====
    /// Most recent interactions, oldest first, capped
    pub interaction_history: VecDeque<InteractionRecord>,
    pub total_interactions: usize,
    pub positive_interactions: usize,
    pub negative_interactions: usize,
    pub first_interaction: DateTime<Utc>,
    pub last_interaction: DateTime<Utc>,

    /// Sorted unique tags across all interactions
    pub context_tags: Vec<String>,
}

impl RelationshipEntity {
    /// Create from a first mention
    pub fn first_mention(
        name: &str,
        entity_type: EntityType,
        interaction: InteractionRecord,
        weights: &RelationshipWeights,
    ) -> Self {
        let positive = interaction.is_positive() as usize;
        // An interaction that is both counts once, as negative
        let negative = (!interaction.is_positive() && interaction.is_negative()) as usize;
        let timestamp = interaction.timestamp;
        let emotional_associations = interaction.emotional_context.clone();
        let context_tags = interaction.context_tags();

        let mut history = VecDeque::with_capacity(INTERACTION_HISTORY_CAPACITY);
        history.push_back(interaction);

        Self {
            entity_name: name.to_string(),
            entity_type,
            relationship_strength: weights.initial_strength,
            trust_level: weights.initial_trust,
            familiarity: weights.initial_familiarity,
            emotional_associations,
            interaction_history: history,
            total_interactions: 1,
            positive_interactions: positive,
            negative_interactions: negative,
            first_interaction: timestamp,
            last_interaction: timestamp,
            context_tags,
        }
    }

    /// Fold in a subsequent mention and recompute metrics
    pub fn record_interaction(
        &mut self,
        interaction: InteractionRecord,
        weights: &RelationshipWeights,
    ) {
        self.total_interactions += 1;
        self.last_interaction = interaction.timestamp;

        // Blend emotions toward the new observation
        for (emotion, intensity) in &interaction.emotional_context {
            let entry = self
                .emotional_associations
                .entry(emotion.clone())
                .or_insert(*intensity);
            *entry = ((*entry + intensity) / 2.0).clamp(0.0, 1.0);
        }

        if interaction.is_positive() {
            self.positive_interactions += 1;
        } else if interaction.is_negative() {
            self.negative_interactions += 1;
        }

        for tag in interaction.context_tags() {
            if !self.context_tags.contains(&tag) {
                self.context_tags.push(tag);
            }
        }
        self.context_tags.sort();

        if self.interaction_history.len() >= INTERACTION_HISTORY_CAPACITY {
            self.interaction_history.pop_front();
        }
        self.interaction_history.push_back(interaction);

        self.familiarity =
            (self.total_interactions as f64 / weights.familiarity_saturation).min(1.0);
        self.relationship_strength = self.compute_strength(weights);
    }

    /// `familiarity*0.6 + positivityRatio*0.4`, falling back to half the
    /// familiarity before any emotional interaction is observed
    fn compute_strength(&self, weights: &RelationshipWeights) -> f64 {
        let emotional = self.positive_interactions + self.negative_interactions;
        let strength = if emotional > 0 {
            let positivity = self.positive_interactions as f64 / emotional as f64;
            self.familiarity * weights.strength_familiarity_weight
                + positivity * weights.strength_positivity_weight
        } else {
            self.familiarity * 0.5
        };
        strength.clamp(0.0, 1.0)
    }

    /// Up to the five most recent interactions, newest first
    pub fn recent_interactions(&self) -> Vec<&InteractionRecord> {
        self.interaction_history.iter().rev().take(5).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! # Relationship Network
//!
//! Incrementally maintained relationship graph per user. Every stored
//! user message flows through [`RelationshipNetwork::update_from_interaction`],
//! which extracts entity mentions and folds them into per-entity state.
//! Aggregation produces a network summary with strength buckets, a
//! normalized emotional profile, and a coarse health grade.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::entity::{
    extract_entities, EntityType, ExtractedEntity, InteractionRecord, RelationshipEntity,
    RelationshipWeights,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Relationship network error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RelationshipError {
    /// Lock poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Relationship network result type
pub type Result<T> = std::result::Result<T, RelationshipError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tunables for relationship tracking and aggregation
#[derive(Debug, Clone)]
pub struct RelationshipConfig {
    /// Scoring constants applied per entity
    pub weights: RelationshipWeights,
    /// Strength above which a bond counts as strong
    pub strong_threshold: f64,
    /// Strength above which a bond counts as moderate
    pub moderate_threshold: f64,
    /// Entities listed in the most-interacted ranking
    pub most_interacted_limit: usize,
    /// Insight sentences rendered per user
    pub insight_limit: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            weights: RelationshipWeights::default(),
            strong_threshold: 0.7,
            moderate_threshold: 0.4,
            most_interacted_limit: 5,
            insight_limit: 4,
        }
    }
}

impl RelationshipConfig {
    pub fn with_weights(mut self, weights: RelationshipWeights) -> Self {
        self.weights = weights;
        self
    }
}

// ============================================================================
// NETWORK SUMMARY
// ============================================================================

/// Coarse health grade for a user's relationship network
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NetworkHealth {
    /// More than 30% of bonds are strong
    Excellent,
    /// More than 10% of bonds are strong
    Good,
    /// Mean strength above 0.3
    Developing,
    /// Weak bonds throughout
    NeedsAttention,
    /// No entities tracked yet
    NoData,
}

impl NetworkHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkHealth::Excellent => "excellent",
            NetworkHealth::Good => "good",
            NetworkHealth::Developing => "developing",
            NetworkHealth::NeedsAttention => "needs_attention",
            NetworkHealth::NoData => "no_data",
        }
    }
}

impl std::fmt::Display for NetworkHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bond counts by strength bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StrengthBuckets {
    pub strong: usize,
    pub moderate: usize,
    pub weak: usize,
}

/// Ranking entry in the most-interacted list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRank {
    pub name: String,
    pub entity_type: EntityType,
    pub interactions: usize,
    pub strength: f64,
}

/// Aggregate view over one user's tracked entities
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    pub total_relationships: usize,
    /// Entity counts per type name
    pub by_type: HashMap<String, usize>,
    pub by_strength: StrengthBuckets,
    pub average_relationship_strength: f64,
    /// Emotion share across all entities, normalized to sum 1
    pub emotional_profile: HashMap<String, f64>,
    /// Up to five entities by interaction count, descending
    pub most_interacted: Vec<EntityRank>,
    pub network_health: NetworkHealth,
}

impl NetworkSummary {
    fn empty() -> Self {
        Self {
            total_relationships: 0,
            by_type: HashMap::new(),
            by_strength: StrengthBuckets::default(),
            average_relationship_strength: 0.0,
            emotional_profile: HashMap::new(),
            most_interacted: Vec::new(),
            network_health: NetworkHealth::NoData,
        }
    }
}

// ============================================================================
// RELATIONSHIP NETWORK
// ============================================================================

/// Per-user relationship graph, keyed by (user, entity name)
pub struct RelationshipNetwork {
    entities: Arc<RwLock<HashMap<String, HashMap<String, RelationshipEntity>>>>,
    config: RelationshipConfig,
}

impl Default for RelationshipNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipNetwork {
    pub fn new() -> Self {
        Self::with_config(RelationshipConfig::default())
    }

    pub fn with_config(config: RelationshipConfig) -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    pub fn config(&self) -> &RelationshipConfig {
        &self.config
    }

    /// Extract entities from a message and fold each into the graph
    ///
    /// Returns the extracted mentions; an empty vector means nothing in
    /// the message named a tracked entity.
    pub fn update_from_interaction(
        &self,
        user_id: &str,
        message: &str,
        emotional_context: &HashMap<String, f64>,
    ) -> Result<Vec<ExtractedEntity>> {
        let mentions = extract_entities(message);

        for mention in &mentions {
            let interaction =
                InteractionRecord::new(message, &mention.context, emotional_context.clone());
            self.add_or_update(user_id, &mention.name, mention.entity_type, interaction)?;
        }

        if !mentions.is_empty() {
            tracing::debug!(
                user_id = %user_id,
                mentions = mentions.len(),
                "Relationship graph updated"
            );
        }
        Ok(mentions)
    }

    /// Create the entity on first mention, otherwise fold the interaction in
    pub fn add_or_update(
        &self,
        user_id: &str,
        entity_name: &str,
        entity_type: EntityType,
        interaction: InteractionRecord,
    ) -> Result<()> {
        let mut entities = self
            .entities
            .write()
            .map_err(|_| RelationshipError::LockPoisoned("relationship entities".to_string()))?;

        let user_entities = entities.entry(user_id.to_string()).or_default();
        match user_entities.get_mut(entity_name) {
            Some(entity) => entity.record_interaction(interaction, &self.config.weights),
            None => {
                user_entities.insert(
                    entity_name.to_string(),
                    RelationshipEntity::first_mention(
                        entity_name,
                        entity_type,
                        interaction,
                        &self.config.weights,
                    ),
                );
            }
        }
        Ok(())
    }

    /// One entity's state, if tracked
    pub fn get(&self, user_id: &str, entity_name: &str) -> Result<Option<RelationshipEntity>> {
        let entities = self
            .entities
            .read()
            .map_err(|_| RelationshipError::LockPoisoned("relationship entities".to_string()))?;
        Ok(entities
            .get(user_id)
            .and_then(|user| user.get(entity_name))
            .cloned())
    }

    /// Aggregate the user's graph into a network summary
    pub fn network(&self, user_id: &str) -> Result<NetworkSummary> {
        let entities = self
            .entities
            .read()
            .map_err(|_| RelationshipError::LockPoisoned("relationship entities".to_string()))?;

        let Some(user_entities) = entities.get(user_id).filter(|u| !u.is_empty()) else {
            return Ok(NetworkSummary::empty());
        };

        let total = user_entities.len();
        let mut by_type: HashMap<String, usize> = HashMap::new();
        let mut buckets = StrengthBuckets::default();
        let mut total_strength = 0.0;
        let mut emotion_counts: HashMap<String, usize> = HashMap::new();
        let mut ranking: Vec<EntityRank> = Vec::with_capacity(total);

        for entity in user_entities.values() {
            *by_type.entry(entity.entity_type.as_str().to_string()).or_default() += 1;

            if entity.relationship_strength > self.config.strong_threshold {
                buckets.strong += 1;
            } else if entity.relationship_strength > self.config.moderate_threshold {
                buckets.moderate += 1;
            } else {
                buckets.weak += 1;
            }
            total_strength += entity.relationship_strength;

            for emotion in entity.emotional_associations.keys() {
                *emotion_counts.entry(emotion.clone()).or_default() += 1;
            }

            ranking.push(EntityRank {
                name: entity.entity_name.clone(),
                entity_type: entity.entity_type,
                interactions: entity.total_interactions,
                strength: entity.relationship_strength,
            });
        }

        ranking.sort_by(|a, b| {
            b.interactions
                .cmp(&a.interactions)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranking.truncate(self.config.most_interacted_limit);

        let total_emotions: usize = emotion_counts.values().sum();
        let emotional_profile = emotion_counts
            .into_iter()
            .map(|(emotion, count)| (emotion, count as f64 / total_emotions.max(1) as f64))
            .collect();

        let average = total_strength / total as f64;
        let strong_ratio = buckets.strong as f64 / total as f64;
        let health = if strong_ratio > 0.3 {
            NetworkHealth::Excellent
        } else if strong_ratio > 0.1 {
            NetworkHealth::Good
        } else if average > 0.3 {
            NetworkHealth::Developing
        } else {
            NetworkHealth::NeedsAttention
        };

        Ok(NetworkSummary {
            total_relationships: total,
            by_type,
            by_strength: buckets,
            average_relationship_strength: average,
            emotional_profile,
            most_interacted: ranking,
            network_health: health,
        })
    }

    /// Render up to four insight sentences from the network summary
    pub fn insights(&self, user_id: &str) -> Result<Vec<String>> {
        let network = self.network(user_id)?;

        if network.total_relationships == 0 {
            return Ok(vec![
                "Continue interacting to build relationship intelligence".to_string(),
            ]);
        }

        let mut insights = Vec::new();

        let total = network.total_relationships;
        if total > 10 {
            insights.push(format!("Rich relationship network with {total} tracked entities"));
        } else if total > 5 {
            insights.push(format!("Growing relationship awareness with {total} entities"));
        } else {
            insights.push(format!("Building relationship context with {total} entities"));
        }

        let average = network.average_relationship_strength;
        if average > 0.6 {
            insights.push("Strong relationships with good emotional connections".to_string());
        } else if average > 0.4 {
            insights.push(
                "Moderate relationship strength - continue building connections".to_string(),
            );
        } else {
            insights.push("Early relationship development stage".to_string());
        }

        if network.emotional_profile.get("stress").copied().unwrap_or(0.0) > 0.3 {
            insights.push(
                "Stress frequently associated with relationships - monitor for support needs"
                    .to_string(),
            );
        }
        if network.emotional_profile.get("positive").copied().unwrap_or(0.0) > 0.4 {
            insights.push("Positive emotional associations with relationships".to_string());
        }

        let people = network.by_type.get("person").copied().unwrap_or(0);
        let concepts = network.by_type.get("concept").copied().unwrap_or(0);
        if people > concepts {
            insights.push("Person-focused relationship pattern".to_string());
        }
        if concepts > 3 {
            insights.push("Strong conceptual relationship awareness".to_string());
        }

        insights.truncate(self.config.insight_limit);
        Ok(insights)
    }
}

// ============================================================================
// TESTS
// ============================================================================

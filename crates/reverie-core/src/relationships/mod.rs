//! # Relationships
//!
//! Entity extraction and relationship graph maintenance. [`entity`]
//! holds the extraction tables and per-entity scoring; [`network`]
//! holds the per-user graph engine and its aggregation surface.

mod entity;
mod network;

pub use entity::{
    extract_entities, EntityType, ExtractedEntity, InteractionRecord, RelationshipEntity,
    RelationshipWeights, INTERACTION_HISTORY_CAPACITY,
};
pub use network::{
    EntityRank, NetworkHealth, NetworkSummary, RelationshipConfig, RelationshipError,
    RelationshipNetwork, Result, StrengthBuckets,
};

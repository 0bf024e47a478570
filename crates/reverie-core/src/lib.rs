//! # Reverie Core
//!
//! Memory intelligence engine for assistant systems. Turns a stream of
//! raw interaction records into consolidated knowledge and anticipatory
//! action:
//!
//! - **Experience Store**: durable experience records with ingest-time
//!   enrichment (intensity estimation, semantic tags, importance boosts)
//! - **Pattern Recognition**: behavioral, emotional, temporal,
//!   communication, and help-seeking pattern mining with need prediction
//! - **Memory Consolidation**: theme discovery over experience history,
//!   distilled into durable `consolidated_memory` records that compound
//!   across passes
//! - **Relationship Network**: entity extraction from messages and an
//!   incrementally scored per-user relationship graph
//! - **Proactive Intelligence**: predicted needs converted into a
//!   deduplicated task queue, executed under cooldown and concurrency
//!   gates through a pluggable executor
//!
//! Pipeline: raw record -> classified signal -> aggregated pattern ->
//! consolidated knowledge -> proactive task.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reverie_core::prelude::*;
//!
//! let store: Arc<dyn ExperienceStore> = Arc::new(MemoryStore::new());
//!
//! // Record an interaction
//! store.store(ExperienceInput::user_message("alex", "so stressed about this deadline"))?;
//!
//! // Mine patterns and predict needs
//! let patterns = PatternEngine::new(Arc::clone(&store));
//! let analysis = patterns.analyze("alex")?;
//!
//! // Plan and execute proactive interventions
//! let proactive = ProactiveEngine::new(Arc::clone(&store));
//! let plan = proactive.plan_next_actions("alex")?;
//! let report = proactive.execute_tasks("alex", &TemplateResponder)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): compile SQLite into the binary
//! - `encryption`: SQLCipher-backed encrypted experience store

#![cfg_attr(docsrs, feature(doc_cfg))]
// Only warn about missing docs for public items exported from the crate root
// Internal struct fields and enum variants don't need documentation
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod classify;
pub mod consolidation;
pub mod experience;
pub mod patterns;
pub mod proactive;
pub mod relationships;
pub mod storage;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use experience::{Experience, ExperienceInput, ExperienceStats, MemoryHealth};

pub use storage::{ExperienceStore, MemoryStore, SqliteStore, StorageError};

pub use classify::{ClassifiedMessage, Classifier, Intent, KeywordClassifier, SuggestedResponder};

pub use patterns::{
    NeedForecast, NeedKind, PatternAnalysis, PatternConfig, PatternEngine, PredictedNeed,
};

pub use consolidation::{
    ConsolidatedTheme, ConsolidationConfig, ConsolidationEngine, ConsolidationReport, ThemeKind,
};

pub use relationships::{
    EntityType, NetworkSummary, RelationshipConfig, RelationshipEntity, RelationshipNetwork,
};

pub use proactive::{
    ProactiveConfig, ProactiveEngine, ProactiveTask, Respondable, TaskOutcome, TaskPriority,
    TaskStatus, TemplateResponder,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenience imports for common usage
pub mod prelude {
    pub use crate::{
        ClassifiedMessage, Classifier, ConsolidationEngine, Experience, ExperienceInput,
        ExperienceStore, KeywordClassifier, MemoryStore, PatternEngine, ProactiveEngine,
        ProactiveTask, RelationshipNetwork, Respondable, SqliteStore, TaskOutcome,
        TemplateResponder,
    };
}

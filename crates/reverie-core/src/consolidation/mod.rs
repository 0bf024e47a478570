//! # Memory Consolidation
//!
//! Theme discovery and knowledge distillation. [`themes`] carries the
//! theme catalog and its matching rules; [`engine`] runs consolidation
//! passes and persists the results.

mod engine;
mod themes;

pub use engine::{
    ConsolidatedTheme, ConsolidationConfig, ConsolidationEngine, ConsolidationError,
    ConsolidationReport, ConsolidationStatus, Result, StoredConsolidation,
};
pub use themes::{fallback_themes, structured_themes, ThemeKind};

//! Pattern Recognition Module
//!
//! Mines five independent pattern categories from a user's experience
//! window:
//! - Behavioral (communication style, recurring topics)
//! - Emotional (stress frequency, stability, dominant emotions)
//! - Temporal (peak hours, activity periods, schedule consistency)
//! - Communication (inquisitive/expressive style, interaction cadence)
//! - Help-seeking (help frequency, help topics, problem-solving style)
//!
//! The engine also predicts near-term user needs from the structured
//! category results. All outputs are typed records; insight strings are
//! render-only and nothing downstream parses them.

mod analysis;
mod engine;

pub use analysis::{
    AnalysisStatus, BehavioralPatterns, CommunicationPatterns, EmotionalPatterns,
    HelpSeekingPatterns, NeedForecast, NeedKind, PatternAnalysis, PatternSummary, PredictedNeed,
    TemporalPatterns,
};
pub use engine::{PatternConfig, PatternEngine, PatternError, Result};

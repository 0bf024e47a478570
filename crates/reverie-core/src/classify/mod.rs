//! Classification Module
//!
//! Structured message classification behind a pluggable seam:
//! - [`Classifier`] trait with a keyword-driven default implementation
//! - [`ClassifiedMessage`] contract consumed by the analysis engines
//!
//! Engines never scrape natural-language strings out of classifier
//! output; everything downstream reads typed fields from the contract.

mod keyword;

pub use keyword::KeywordClassifier;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Classification error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// Backend failed to produce a classification
    #[error("Classifier backend error: {0}")]
    Backend(String),
    /// Backend is not ready to serve requests
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
}

/// Classification result type
pub type Result<T> = std::result::Result<T, ClassifyError>;

// ============================================================================
// INTENT
// ============================================================================

/// What the user is trying to accomplish with a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Asking for information
    Question,
    /// Asking for help with a problem
    RequestHelp,
    /// Arranging meetings or appointments
    Scheduling,
    /// Organizing tasks or todos
    TaskPlanning,
    /// Looking for emotional support
    EmotionalSupport,
    /// Anything else
    #[default]
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Question => "question",
            Intent::RequestHelp => "request_help",
            Intent::Scheduling => "scheduling",
            Intent::TaskPlanning => "task_planning",
            Intent::EmotionalSupport => "emotional_support",
            Intent::General => "general",
        }
    }

    /// Whether this intent calls for a concrete follow-up action
    pub fn requires_action(&self) -> bool {
        matches!(
            self,
            Intent::RequestHelp | Intent::TaskPlanning | Intent::Scheduling
        )
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "question" => Ok(Intent::Question),
            "request_help" | "requesthelp" => Ok(Intent::RequestHelp),
            "scheduling" => Ok(Intent::Scheduling),
            "task_planning" | "taskplanning" => Ok(Intent::TaskPlanning),
            "emotional_support" | "emotionalsupport" => Ok(Intent::EmotionalSupport),
            "general" => Ok(Intent::General),
            _ => Err(format!("Unknown intent: {}", s)),
        }
    }
}

// ============================================================================
// SUGGESTED RESPONDER
// ============================================================================

/// Which support capability should handle the message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedResponder {
    /// Stress and emotional regulation support
    StressSupport,
    /// Task and productivity support
    Productivity,
    /// Conversation and communication support
    Communication,
    /// General contextual support
    #[default]
    Context,
}

impl SuggestedResponder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedResponder::StressSupport => "stress_support",
            SuggestedResponder::Productivity => "productivity",
            SuggestedResponder::Communication => "communication",
            SuggestedResponder::Context => "context",
        }
    }
}

impl std::fmt::Display for SuggestedResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SuggestedResponder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stress_support" | "stresssupport" => Ok(SuggestedResponder::StressSupport),
            "productivity" => Ok(SuggestedResponder::Productivity),
            "communication" => Ok(SuggestedResponder::Communication),
            "context" => Ok(SuggestedResponder::Context),
            _ => Err(format!("Unknown responder: {}", s)),
        }
    }
}

// ============================================================================
// CLASSIFIED MESSAGE
// ============================================================================

/// Structured classification of one message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedMessage {
    /// Detected emotion name to strength in [0,1]
    pub emotions: HashMap<String, f64>,
    /// Strongest detected emotion, if any
    pub primary_emotion: Option<String>,
    /// Strength of the strongest emotion
    pub intensity: f64,
    /// Detected intent
    pub intent: Intent,
    /// Estimated importance in [0,1]
    pub importance: f64,
    /// Whether the message calls for a concrete follow-up
    pub requires_action: bool,
    /// Capability best suited to respond
    pub responder: SuggestedResponder,
    /// Classifier confidence in [0,1]
    pub confidence: f64,
}

impl Default for ClassifiedMessage {
    fn default() -> Self {
        Self {
            emotions: HashMap::new(),
            primary_emotion: None,
            intensity: 0.0,
            intent: Intent::General,
            importance: 0.5,
            requires_action: false,
            responder: SuggestedResponder::Context,
            confidence: 0.0,
        }
    }
}

impl ClassifiedMessage {
    /// Strength of a named emotion, zero when absent
    pub fn emotion(&self, name: &str) -> f64 {
        self.emotions.get(name).copied().unwrap_or(0.0)
    }
}

// ============================================================================
// CLASSIFIER SEAM
// ============================================================================

/// Pluggable message classifier
///
/// The default keyword implementation never fails; structured backends
/// (LLM, remote service) may fail per message, and consuming engines
/// degrade to keyword heuristics when they do.
pub trait Classifier: Send + Sync {
    /// Classify a single message
    fn classify(&self, message: &str) -> Result<ClassifiedMessage>;

    /// Whether this backend produces model-grade structured output
    ///
    /// Structured backends earn a confidence bonus in consolidation.
    fn is_structured(&self) -> bool {
        false
    }
}

//! Theme catalog and matching rules
//!
//! Two classification paths feed the same catalog: structured rules read
//! typed fields off a [`ClassifiedMessage`], keyword fallback rules scan
//! the raw message and stored emotional context. An experience can match
//! several themes at once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::classify::{ClassifiedMessage, Intent, SuggestedResponder};

// ============================================================================
// THEME KIND
// ============================================================================

/// Recurring behavioral theme discovered during consolidation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKind {
    // ===== Structured catalog =====
    /// Stress paired with a help or support request
    StressManagementNeeds,
    /// Stress without an explicit support request
    StressResponsePatterns,
    /// Productivity topics under stress
    WorkStressManagement,
    /// Productivity topics without stress
    ProductivityFocusedInteractions,
    /// Help-seeking paired with confusion
    LearningSupportNeeds,
    /// Help-seeking without confusion
    GeneralHelpSeeking,
    /// Communication-routed messages
    CommunicationOptimization,
    /// Explicit emotional support requests
    EmotionalWellnessFocus,
    /// Curiosity or question-driven messages
    LearningCuriosityPattern,
    /// High-importance messages
    HighEngagementInteractions,
    /// Catch-all when structured classification fails per message
    GeneralInteractions,

    // ===== Keyword fallback catalog =====
    /// Help-related keywords
    HelpSeekingPattern,
    /// Stress keywords or stored stress context
    StressRelatedInteractions,
    /// Work keywords
    WorkRelatedDiscussions,
}

impl ThemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKind::StressManagementNeeds => "stress_management_needs",
            ThemeKind::StressResponsePatterns => "stress_response_patterns",
            ThemeKind::WorkStressManagement => "work_stress_management",
            ThemeKind::ProductivityFocusedInteractions => "productivity_focused_interactions",
            ThemeKind::LearningSupportNeeds => "learning_support_needs",
            ThemeKind::GeneralHelpSeeking => "general_help_seeking",
            ThemeKind::CommunicationOptimization => "communication_optimization",
            ThemeKind::EmotionalWellnessFocus => "emotional_wellness_focus",
            ThemeKind::LearningCuriosityPattern => "learning_curiosity_pattern",
            ThemeKind::HighEngagementInteractions => "high_engagement_interactions",
            ThemeKind::GeneralInteractions => "general_interactions",
            ThemeKind::HelpSeekingPattern => "help_seeking_pattern",
            ThemeKind::StressRelatedInteractions => "stress_related_interactions",
            ThemeKind::WorkRelatedDiscussions => "work_related_discussions",
        }
    }

    /// Stress family, used by cross-theme insight rendering
    pub fn is_stress_related(&self) -> bool {
        matches!(
            self,
            ThemeKind::StressManagementNeeds
                | ThemeKind::StressResponsePatterns
                | ThemeKind::WorkStressManagement
                | ThemeKind::StressRelatedInteractions
        )
    }

    /// Work/productivity family
    pub fn is_work_related(&self) -> bool {
        matches!(
            self,
            ThemeKind::WorkStressManagement
                | ThemeKind::ProductivityFocusedInteractions
                | ThemeKind::WorkRelatedDiscussions
        )
    }

    /// Help-seeking family
    pub fn is_help_related(&self) -> bool {
        matches!(
            self,
            ThemeKind::LearningSupportNeeds
                | ThemeKind::GeneralHelpSeeking
                | ThemeKind::HelpSeekingPattern
        )
    }

    /// Learning family
    pub fn is_learning_related(&self) -> bool {
        matches!(
            self,
            ThemeKind::LearningSupportNeeds | ThemeKind::LearningCuriosityPattern
        )
    }
}

impl std::fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ThemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stress_management_needs" => Ok(ThemeKind::StressManagementNeeds),
            "stress_response_patterns" => Ok(ThemeKind::StressResponsePatterns),
            "work_stress_management" => Ok(ThemeKind::WorkStressManagement),
            "productivity_focused_interactions" => Ok(ThemeKind::ProductivityFocusedInteractions),
            "learning_support_needs" => Ok(ThemeKind::LearningSupportNeeds),
            "general_help_seeking" => Ok(ThemeKind::GeneralHelpSeeking),
            "communication_optimization" => Ok(ThemeKind::CommunicationOptimization),
            "emotional_wellness_focus" => Ok(ThemeKind::EmotionalWellnessFocus),
            "learning_curiosity_pattern" => Ok(ThemeKind::LearningCuriosityPattern),
            "high_engagement_interactions" => Ok(ThemeKind::HighEngagementInteractions),
            "general_interactions" => Ok(ThemeKind::GeneralInteractions),
            "help_seeking_pattern" => Ok(ThemeKind::HelpSeekingPattern),
            "stress_related_interactions" => Ok(ThemeKind::StressRelatedInteractions),
            "work_related_discussions" => Ok(ThemeKind::WorkRelatedDiscussions),
            _ => Err(format!("Unknown theme: {}", s)),
        }
    }
}

// ============================================================================
// MATCHING
// ============================================================================

const HELP_KEYWORDS: [&str; 4] = ["help", "assist", "support", "stuck"];
const STRESS_KEYWORDS: [&str; 2] = ["stress", "overwhelmed"];
const WORK_KEYWORDS: [&str; 4] = ["work", "job", "project", "deadline"];

/// Themes matched from a structured classification
pub fn structured_themes(classified: &ClassifiedMessage) -> Vec<ThemeKind> {
    let mut themes = Vec::new();

    if classified.emotion("stress") > 0.5 || classified.emotion("anxiety") > 0.5 {
        if matches!(
            classified.intent,
            Intent::RequestHelp | Intent::EmotionalSupport
        ) {
            themes.push(ThemeKind::StressManagementNeeds);
        } else {
            themes.push(ThemeKind::StressResponsePatterns);
        }
    }

    if classified.responder == SuggestedResponder::Productivity {
        if classified.emotion("stress") > 0.4 {
            themes.push(ThemeKind::WorkStressManagement);
        } else {
            themes.push(ThemeKind::ProductivityFocusedInteractions);
        }
    }

    if classified.intent == Intent::RequestHelp || classified.emotion("seeking_help") > 0.4 {
        if classified.emotion("confusion") > 0.5 {
            themes.push(ThemeKind::LearningSupportNeeds);
        } else {
            themes.push(ThemeKind::GeneralHelpSeeking);
        }
    }

    if classified.responder == SuggestedResponder::Communication {
        themes.push(ThemeKind::CommunicationOptimization);
    }

    if classified.intent == Intent::EmotionalSupport {
        themes.push(ThemeKind::EmotionalWellnessFocus);
    }

    if classified.emotion("curiosity") > 0.4 || classified.intent == Intent::Question {
        themes.push(ThemeKind::LearningCuriosityPattern);
    }

    if classified.importance > 0.7 {
        themes.push(ThemeKind::HighEngagementInteractions);
    }

    themes
}

/// Themes matched from raw message text and stored emotional context
pub fn fallback_themes(message: &str, emotional_context: &HashMap<String, f64>) -> Vec<ThemeKind> {
    let lower = message.to_lowercase();
    let mut themes = Vec::new();

    if HELP_KEYWORDS.iter().any(|w| lower.contains(w)) {
        themes.push(ThemeKind::HelpSeekingPattern);
    }

    if emotional_context.contains_key("stress") || STRESS_KEYWORDS.iter().any(|w| lower.contains(w))
    {
        themes.push(ThemeKind::StressRelatedInteractions);
    }

    if WORK_KEYWORDS.iter().any(|w| lower.contains(w)) {
        themes.push(ThemeKind::WorkRelatedDiscussions);
    }

    themes
}

// ============================================================================
// TESTS
// ============================================================================

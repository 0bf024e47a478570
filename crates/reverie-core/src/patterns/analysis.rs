//! # Pattern Analysis Results
//!
//! Typed result contract for behavioral pattern mining. Downstream
//! consumers (proactive planning, consolidation) read these fields
//! directly; none of them parse insight strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ANALYSIS STATUS
// ============================================================================

/// Outcome grade for an analysis run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Full analysis over sufficient data
    Success,
    /// Analysis completed but an enrichment backend failed
    Degraded,
    /// Not enough experiences to mine patterns
    InsufficientData,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Success => "success",
            AnalysisStatus::Degraded => "degraded",
            AnalysisStatus::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// PATTERN CATEGORIES
// ============================================================================

/// Behavioral patterns mined from user messages
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralPatterns {
    /// Detected behavior names (`concise_communicator`, `focus_on_work`, ...)
    pub detected_behaviors: Vec<String>,
    /// Topic frequency for the top recurring topics
    pub behavior_frequency: HashMap<String, usize>,
    /// Behavior count scaled to [0,1]
    pub consistency_score: f64,
}

/// Emotional patterns across all experiences
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalPatterns {
    /// Detected trend names (`high_stress_frequency`, `emotionally_stable`, ...)
    pub emotional_trends: Vec<String>,
    /// Share of experiences with stress indicators
    pub stress_frequency: f64,
    /// Inverse of mean emotional intensity, in [0,1]
    pub emotional_stability: f64,
    /// Occurrence counts for the five most frequent emotions
    pub dominant_emotions: HashMap<String, usize>,
}

/// Activity timing patterns
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemporalPatterns {
    /// Active period names (`morning_active`, `evening_active`, ...)
    pub activity_periods: Vec<String>,
    /// Hours of day at or near peak activity, ascending
    pub peak_hours: Vec<u32>,
    /// Inverse of active-hour spread, in [0,1]
    pub schedule_consistency: f64,
}

/// Communication style patterns
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPatterns {
    /// Style names (`inquisitive`, `expressive`)
    pub communication_style: Vec<String>,
    /// Estimated user messages per day over the analysis window
    pub interaction_frequency: f64,
}

/// Help-seeking behavior patterns
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HelpSeekingPatterns {
    /// Share of user messages containing help indicators
    pub help_frequency: f64,
    /// Up to three most frequent topics within help requests
    pub help_topics: Vec<String>,
    /// Exactly one style name once any messages exist
    pub problem_solving_style: Vec<String>,
}

// ============================================================================
// PATTERN SUMMARY
// ============================================================================

/// Roll-up across all pattern categories
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatternSummary {
    /// Count of all detected pattern names
    pub total_patterns_detected: usize,
    /// Number of category analyses that ran
    pub pattern_categories: usize,
    /// First five detected patterns in category order
    pub strongest_patterns: Vec<String>,
    /// Number of distinct pattern names
    pub pattern_diversity: usize,
}

impl PatternSummary {
    /// Collect pattern names in category order: behavioral, emotional,
    /// temporal, communication, help-seeking
    pub fn collect(
        behavioral: &BehavioralPatterns,
        emotional: &EmotionalPatterns,
        temporal: &TemporalPatterns,
        communication: &CommunicationPatterns,
        help_seeking: &HelpSeekingPatterns,
    ) -> Self {
        let mut all_patterns: Vec<String> = Vec::new();
        all_patterns.extend(behavioral.detected_behaviors.iter().cloned());
        all_patterns.extend(emotional.emotional_trends.iter().cloned());
        all_patterns.extend(temporal.activity_periods.iter().cloned());
        all_patterns.extend(communication.communication_style.iter().cloned());
        all_patterns.extend(help_seeking.problem_solving_style.iter().cloned());

        let diversity = all_patterns
            .iter()
            .collect::<std::collections::HashSet<_>>()
            .len();

        Self {
            total_patterns_detected: all_patterns.len(),
            pattern_categories: 5,
            strongest_patterns: all_patterns.into_iter().take(5).collect(),
            pattern_diversity: diversity,
        }
    }
}

// ============================================================================
// PATTERN ANALYSIS
// ============================================================================

/// Complete pattern analysis for one user
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    /// User analyzed
    pub user_id: String,
    /// Outcome grade
    pub status: AnalysisStatus,
    /// Number of experiences that fed the analysis
    pub total_experiences: usize,
    /// Window the analysis covered, in days
    pub analysis_period_days: i64,

    // ===== Categories =====
    pub behavioral: BehavioralPatterns,
    pub emotional: EmotionalPatterns,
    pub temporal: TemporalPatterns,
    pub communication: CommunicationPatterns,
    pub help_seeking: HelpSeekingPatterns,

    // ===== Roll-up =====
    pub summary: PatternSummary,
    /// Overall confidence in [0,1]
    pub confidence: f64,
    /// Up to seven actionable insight strings
    pub actionable_insights: Vec<String>,
    /// Reason attached to insufficient-data results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub generated_at: DateTime<Utc>,
}

impl PatternAnalysis {
    /// Result returned when too few experiences exist to mine patterns
    pub fn insufficient(user_id: &str, days: i64, reason: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            status: AnalysisStatus::InsufficientData,
            total_experiences: 0,
            analysis_period_days: days,
            behavioral: BehavioralPatterns::default(),
            emotional: EmotionalPatterns::default(),
            temporal: TemporalPatterns::default(),
            communication: CommunicationPatterns::default(),
            help_seeking: HelpSeekingPatterns::default(),
            summary: PatternSummary::default(),
            confidence: 0.0,
            actionable_insights: vec![
                "Continue interacting to build pattern recognition data".to_string(),
            ],
            message: Some(reason.to_string()),
            generated_at: Utc::now(),
        }
    }
}

// ============================================================================
// NEED PREDICTION
// ============================================================================

/// A user need the system anticipates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NeedKind {
    StressManagementSupport,
    ProactiveAssistance,
    EngagementOptimization,
    ImmediateStressRelief,
    UrgentAssistance,
    AssistanceWithWork,
    LearningSupport,
    ProductivityOptimization,
    EmotionalSupport,
    GeneralSupport,
}

impl NeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedKind::StressManagementSupport => "stress_management_support",
            NeedKind::ProactiveAssistance => "proactive_assistance",
            NeedKind::EngagementOptimization => "engagement_optimization",
            NeedKind::ImmediateStressRelief => "immediate_stress_relief",
            NeedKind::UrgentAssistance => "urgent_assistance",
            NeedKind::AssistanceWithWork => "assistance_with_work",
            NeedKind::LearningSupport => "learning_support",
            NeedKind::ProductivityOptimization => "productivity_optimization",
            NeedKind::EmotionalSupport => "emotional_support",
            NeedKind::GeneralSupport => "general_support",
        }
    }

    /// Human-readable form used in task descriptions
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for NeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NeedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stress_management_support" => Ok(NeedKind::StressManagementSupport),
            "proactive_assistance" => Ok(NeedKind::ProactiveAssistance),
            "engagement_optimization" => Ok(NeedKind::EngagementOptimization),
            "immediate_stress_relief" => Ok(NeedKind::ImmediateStressRelief),
            "urgent_assistance" => Ok(NeedKind::UrgentAssistance),
            "assistance_with_work" => Ok(NeedKind::AssistanceWithWork),
            "learning_support" => Ok(NeedKind::LearningSupport),
            "productivity_optimization" => Ok(NeedKind::ProductivityOptimization),
            "emotional_support" => Ok(NeedKind::EmotionalSupport),
            "general_support" => Ok(NeedKind::GeneralSupport),
            _ => Err(format!("Unknown need: {}", s)),
        }
    }
}

/// One predicted need with supporting evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedNeed {
    /// What the user is expected to need
    pub predicted_need: NeedKind,
    /// Prediction confidence in [0,1]
    pub confidence: f64,
    /// Why the prediction fired
    pub reasoning: String,
    /// Concrete follow-up actions
    pub suggested_actions: Vec<String>,
}

/// Full need forecast for one user
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedForecast {
    /// Predictions ordered by detection
    pub predictions: Vec<PredictedNeed>,
    /// Mean prediction confidence, zero when empty
    pub prediction_confidence: f64,
    /// Recent experience count backing the forecast
    pub based_on_experiences: usize,
    pub generated_at: DateTime<Utc>,
}

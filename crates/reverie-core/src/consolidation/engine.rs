//! # Memory Consolidation Engine
//!
//! Groups a user's experiences into recurring behavioral themes, distills
//! each theme into durable knowledge, and writes the result back to the
//! store as high-importance `consolidated_memory` records. Later passes
//! see earlier consolidations, so knowledge compounds across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::themes::{fallback_themes, structured_themes, ThemeKind};
use crate::classify::Classifier;
use crate::experience::{Experience, ExperienceInput, CONSOLIDATED_MEMORY_KIND, KIND_KEY};
use crate::storage::{ExperienceStore, StorageError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Consolidation error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    /// Storage failure while loading or persisting
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Consolidation result type
pub type Result<T> = std::result::Result<T, ConsolidationError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tunables for memory consolidation
#[derive(Debug, Clone)]
pub struct ConsolidationConfig {
    /// How many experiences to load per run
    pub retrieval_limit: usize,
    /// Minimum members before a theme is retained
    pub min_experiences_for_pattern: usize,
    /// Member count at which a theme reaches full strength
    pub strength_saturation: f64,
    /// Members sampled when averaging a theme's emotional profile
    pub profile_sample: usize,
    /// Confidence bonus when a structured classifier drove the run
    pub structured_bonus: f64,
    /// Importance assigned to written-back consolidation records
    pub consolidated_importance: f64,
    /// Cross-theme insight cap
    pub insight_limit: usize,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            retrieval_limit: 100,
            min_experiences_for_pattern: 3,
            strength_saturation: 10.0,
            profile_sample: 10,
            structured_bonus: 0.2,
            consolidated_importance: 0.9,
            insight_limit: 7,
        }
    }
}

impl ConsolidationConfig {
    pub fn with_retrieval_limit(mut self, limit: usize) -> Self {
        self.retrieval_limit = limit;
        self
    }

    pub fn with_min_experiences(mut self, min: usize) -> Self {
        self.min_experiences_for_pattern = min;
        self
    }
}

// ============================================================================
// REPORT TYPES
// ============================================================================

/// Outcome class of a consolidation run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationStatus {
    /// Themes were consolidated and written back
    Success,
    /// Too few experiences to find patterns
    InsufficientData,
}

/// One theme distilled from its member experiences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedTheme {
    pub theme: ThemeKind,
    pub total_experiences: usize,
    /// min(1, members / saturation)
    pub pattern_strength: f64,
    /// Emotion means across sampled members
    pub emotional_profile: HashMap<String, f64>,
    pub behavioral_insights: Vec<String>,
    /// Narrative knowledge summary
    pub consolidated_knowledge: String,
}

/// Result of one consolidation run
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationReport {
    pub status: ConsolidationStatus,
    /// True when the structured classifier failed for some messages
    pub degraded: bool,
    /// Retained themes, strongest first
    pub themes: Vec<ConsolidatedTheme>,
    /// Cross-theme insights, capped
    pub insights: Vec<String>,
    pub experiences_processed: usize,
    /// Overall confidence in [0,1]
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
}

impl ConsolidationReport {
    fn insufficient(count: usize) -> Self {
        Self {
            status: ConsolidationStatus::InsufficientData,
            degraded: false,
            themes: Vec::new(),
            insights: Vec::new(),
            experiences_processed: count,
            confidence: 0.0,
            generated_at: Utc::now(),
        }
    }
}

/// Previously persisted consolidation, read back from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConsolidation {
    pub theme: String,
    pub pattern_strength: f64,
    pub total_experiences: usize,
    pub knowledge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

// ============================================================================
// CONSOLIDATION ENGINE
// ============================================================================

const THEME_KEY: &str = "theme";
const KNOWLEDGE_KEY: &str = "knowledgeSummary";
const STRENGTH_KEY: &str = "patternStrength";
const MEMBER_COUNT_KEY: &str = "totalExperiences";

/// Theme discovery and knowledge distillation over stored experiences
pub struct ConsolidationEngine {
    store: Arc<dyn ExperienceStore>,
    classifier: Option<Arc<dyn Classifier>>,
    config: ConsolidationConfig,
}

impl ConsolidationEngine {
    pub fn new(store: Arc<dyn ExperienceStore>) -> Self {
        Self {
            store,
            classifier: None,
            config: ConsolidationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ConsolidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a classifier for structured theme identification
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Run a full consolidation pass for one user
    pub fn consolidate(&self, user_id: &str) -> Result<ConsolidationReport> {
        let experiences = self.store.retrieve(user_id, self.config.retrieval_limit)?;

        if experiences.len() < self.config.min_experiences_for_pattern {
            tracing::debug!(
                user_id = %user_id,
                count = experiences.len(),
                "Too few experiences to consolidate"
            );
            return Ok(ConsolidationReport::insufficient(experiences.len()));
        }

        let (groups, degraded) = self.identify_themes(&experiences);

        let mut themes: Vec<ConsolidatedTheme> = groups
            .into_iter()
            .map(|(theme, members)| self.consolidate_theme(theme, &members))
            .collect();
        themes.sort_by(|a, b| {
            b.pattern_strength
                .partial_cmp(&a.pattern_strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let insights = self.cross_theme_insights(&themes);
        let confidence = self.overall_confidence(&themes);

        self.persist_themes(user_id, &themes)?;

        tracing::info!(
            user_id = %user_id,
            themes = themes.len(),
            confidence = confidence,
            degraded = degraded,
            "Consolidation complete"
        );

        Ok(ConsolidationReport {
            status: ConsolidationStatus::Success,
            degraded,
            themes,
            insights,
            experiences_processed: experiences.len(),
            confidence,
            generated_at: Utc::now(),
        })
    }

    /// Read back previously stored consolidations, strongest first
    pub fn consolidated_insights(&self, user_id: &str) -> Result<Vec<StoredConsolidation>> {
        let experiences = self.store.retrieve(user_id, 200)?;

        let mut stored: Vec<StoredConsolidation> = experiences
            .iter()
            .filter(|e| e.is_consolidated_memory())
            .map(|e| StoredConsolidation {
                theme: e
                    .payload
                    .get(THEME_KEY)
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                pattern_strength: e
                    .payload
                    .get(STRENGTH_KEY)
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
                total_experiences: e
                    .payload
                    .get(MEMBER_COUNT_KEY)
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as usize,
                knowledge: e
                    .payload
                    .get(KNOWLEDGE_KEY)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                timestamp: e.timestamp,
            })
            .collect();

        stored.sort_by(|a, b| {
            b.pattern_strength
                .partial_cmp(&a.pattern_strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(stored)
    }

    // ========================================================================
    // THEME IDENTIFICATION
    // ========================================================================

    /// Group experiences by theme, preserving first-seen theme order
    ///
    /// Only message-bearing records participate; consolidation records and
    /// blank messages are skipped, so re-running a pass never shrinks a
    /// theme. Returns the retained groups and whether any structured
    /// classification failed.
    fn identify_themes<'a>(
        &self,
        experiences: &'a [Experience],
    ) -> (Vec<(ThemeKind, Vec<&'a Experience>)>, bool) {
        let mut groups: Vec<(ThemeKind, Vec<&'a Experience>)> = Vec::new();
        let mut degraded = false;

        for experience in experiences {
            let Some(message) = experience.message() else {
                continue;
            };
            if message.trim().len() < 5 {
                continue;
            }

            let themes = match &self.classifier {
                Some(classifier) => match classifier.classify(message) {
                    Ok(classified) => structured_themes(&classified),
                    Err(error) => {
                        tracing::warn!(error = %error, "Classifier failed, filing as general");
                        degraded = true;
                        vec![ThemeKind::GeneralInteractions]
                    }
                },
                None => fallback_themes(message, &experience.emotional_context),
            };

            for theme in themes {
                match groups.iter_mut().find(|(t, _)| *t == theme) {
                    Some((_, members)) => members.push(experience),
                    None => groups.push((theme, vec![experience])),
                }
            }
        }

        groups.retain(|(_, members)| members.len() >= self.config.min_experiences_for_pattern);
        (groups, degraded)
    }

    // ========================================================================
    // PER-THEME CONSOLIDATION
    // ========================================================================

    fn consolidate_theme(&self, theme: ThemeKind, members: &[&Experience]) -> ConsolidatedTheme {
        let count = members.len();
        let pattern_strength = (count as f64 / self.config.strength_saturation).min(1.0);

        // Emotion means over a bounded sample
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
        for experience in members.iter().take(self.config.profile_sample) {
            for (emotion, intensity) in &experience.emotional_context {
                let entry = sums.entry(emotion.clone()).or_insert((0.0, 0));
                entry.0 += intensity;
                entry.1 += 1;
            }
        }
        let emotional_profile: HashMap<String, f64> = sums
            .into_iter()
            .map(|(emotion, (sum, n))| (emotion, sum / n as f64))
            .collect();

        let behavioral_insights = self.behavioral_insights(theme, count);
        let consolidated_knowledge =
            self.knowledge_summary(theme, count, pattern_strength, &emotional_profile);

        ConsolidatedTheme {
            theme,
            total_experiences: count,
            pattern_strength,
            emotional_profile,
            behavioral_insights,
            consolidated_knowledge,
        }
    }

    /// Templated observations from theme identity and occurrence counts
    fn behavioral_insights(&self, theme: ThemeKind, count: usize) -> Vec<String> {
        let mut insights = Vec::new();

        // Analysis window is four weeks
        let per_week = count as f64 / 4.0;
        if per_week > 3.0 {
            insights.push(format!(
                "High frequency pattern: {per_week:.1} occurrences per week"
            ));
        } else if per_week > 1.0 {
            insights.push(format!("Regular pattern: {per_week:.1} occurrences per week"));
        } else {
            insights.push(format!(
                "Occasional pattern: {per_week:.1} occurrences per week"
            ));
        }

        if count > 7 {
            insights.push("Highly consistent behavioral pattern".to_string());
        } else if count > 4 {
            insights.push("Moderately consistent pattern".to_string());
        }

        if theme.is_stress_related() {
            insights.push("User experiences recurring stress episodes".to_string());
            insights.push("Benefits from proactive stress management support".to_string());
        } else if theme.is_help_related() {
            insights.push("User actively seeks assistance when needed".to_string());
            insights.push("Responds well to guided problem-solving".to_string());
        } else if theme.is_work_related() {
            insights.push("Work-focused interaction pattern".to_string());
            insights.push("Values productivity optimization".to_string());
        }

        insights
    }

    fn knowledge_summary(
        &self,
        theme: ThemeKind,
        count: usize,
        strength: f64,
        profile: &HashMap<String, f64>,
    ) -> String {
        let mut summary = format!(
            "Theme '{theme}' shows {:.1}% pattern strength across {count} interactions. ",
            strength * 100.0
        );

        let dominant = profile.iter().max_by(|a, b| {
            a.1.partial_cmp(b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.cmp(a.0))
        });
        if let Some((emotion, intensity)) = dominant {
            summary.push_str(&format!(
                "Primary emotional association: {emotion} ({intensity:.2}). "
            ));
        }

        let per_week = count as f64 / 4.0;
        if per_week > 2.0 {
            summary.push_str(&format!(
                "High frequency pattern ({per_week:.1}/week) indicating strong user behavior tendency."
            ));
        } else {
            summary.push_str(&format!(
                "Moderate frequency pattern ({per_week:.1}/week) showing emerging behavior."
            ));
        }
        summary
    }

    // ========================================================================
    // CROSS-THEME INSIGHTS AND CONFIDENCE
    // ========================================================================

    fn cross_theme_insights(&self, themes: &[ConsolidatedTheme]) -> Vec<String> {
        let mut insights = Vec::new();

        let stress_members: usize = themes
            .iter()
            .filter(|t| t.theme.is_stress_related())
            .map(|t| t.total_experiences)
            .sum();
        let has_work = themes.iter().any(|t| t.theme.is_work_related());
        if stress_members > 0 && has_work {
            insights.push(format!(
                "Work-related stress is a major pattern ({stress_members} instances) requiring proactive intervention"
            ));
        }

        if let Some(help) = themes.iter().find(|t| t.theme.is_help_related()) {
            insights.push(format!(
                "User actively seeks assistance ({} requests) - proactive guidance highly effective",
                help.total_experiences
            ));
        }

        if let Some(learning) = themes.iter().find(|t| t.theme.is_learning_related()) {
            insights.push(format!(
                "Strong learning orientation detected ({} instances) - detailed explanations preferred",
                learning.total_experiences
            ));
        }

        let strong: Vec<&str> = themes
            .iter()
            .filter(|t| t.pattern_strength > 0.7)
            .map(|t| t.theme.as_str())
            .collect();
        if strong.len() >= 2 {
            insights.push(format!(
                "Multiple strong behavioral patterns identified: {}",
                strong[..strong.len().min(3)].join(", ")
            ));
        }

        for theme in themes {
            if theme.emotional_profile.get("stress").copied().unwrap_or(0.0) > 0.6 {
                insights.push(format!(
                    "High stress intensity in {} - monitor for intervention opportunities",
                    theme.theme
                ));
            }
        }

        insights.truncate(self.config.insight_limit);
        insights
    }

    fn overall_confidence(&self, themes: &[ConsolidatedTheme]) -> f64 {
        if themes.is_empty() {
            return 0.0;
        }

        let total: usize = themes.iter().map(|t| t.total_experiences).sum();
        let mean_strength: f64 =
            themes.iter().map(|t| t.pattern_strength).sum::<f64>() / themes.len() as f64;

        let structured_bonus = match &self.classifier {
            Some(classifier) if classifier.is_structured() => self.config.structured_bonus,
            _ => 0.0,
        };

        ((total as f64 / 50.0) * 0.6 + mean_strength * 0.4 + structured_bonus).min(1.0)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Write each retained theme back as a `consolidated_memory` record
    fn persist_themes(&self, user_id: &str, themes: &[ConsolidatedTheme]) -> Result<()> {
        for theme in themes {
            let mut payload = Map::new();
            payload.insert(KIND_KEY.to_string(), Value::from(CONSOLIDATED_MEMORY_KIND));
            payload.insert(THEME_KEY.to_string(), Value::from(theme.theme.as_str()));
            payload.insert(
                KNOWLEDGE_KEY.to_string(),
                Value::from(theme.consolidated_knowledge.clone()),
            );
            payload.insert(STRENGTH_KEY.to_string(), Value::from(theme.pattern_strength));
            payload.insert(
                MEMBER_COUNT_KEY.to_string(),
                Value::from(theme.total_experiences as u64),
            );

            let mut emotional_context = theme.emotional_profile.clone();
            emotional_context.insert("consolidation".to_string(), 1.0);
            emotional_context.insert("pattern_strength".to_string(), theme.pattern_strength);

            self.store.store(
                ExperienceInput {
                    user_id: user_id.to_string(),
                    payload,
                    emotional_context,
                    importance: self.config.consolidated_importance,
                    timestamp: None,
                },
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

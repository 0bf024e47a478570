//! # Pattern Recognition Engine
//!
//! Mines behavioral, emotional, temporal, communication, and help-seeking
//! patterns from a user's experience history. Pure keyword heuristics by
//! default; an attached [`Classifier`] enriches the emotion tallies and a
//! failing backend degrades the run instead of failing it.

use chrono::{Duration, Timelike, Utc};
use std::sync::Arc;

use super::analysis::{
    AnalysisStatus, BehavioralPatterns, CommunicationPatterns, EmotionalPatterns,
    HelpSeekingPatterns, NeedForecast, NeedKind, PatternAnalysis, PatternSummary, PredictedNeed,
    TemporalPatterns,
};
use crate::classify::Classifier;
use crate::experience::Experience;
use crate::storage::{ExperienceStore, StorageError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Pattern analysis error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Storage failure while loading experiences
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Pattern analysis result type
pub type Result<T> = std::result::Result<T, PatternError>;

// ============================================================================
// KEYWORD TABLES
// ============================================================================

/// Topic keyword groups for behavioral and help-topic mining
const TOPIC_KEYWORDS: [(&str, &[&str]); 9] = [
    ("work", &["work", "job", "career", "office", "project", "deadline", "meeting"]),
    ("stress", &["stress", "overwhelmed", "pressure", "anxiety", "worried"]),
    ("time", &["time", "schedule", "busy", "calendar", "manage", "planning"]),
    ("health", &["health", "tired", "sleep", "exercise", "wellness", "fitness"]),
    ("learning", &["learn", "understand", "study", "confused", "education"]),
    ("technology", &["computer", "software", "app", "technical", "digital"]),
    ("relationship", &["family", "friend", "colleague", "relationship", "social"]),
    ("productivity", &["productive", "efficient", "organize", "focus", "task"]),
    ("emotional", &["feel", "emotion", "mood", "upset", "happy", "sad"]),
];

const STRESS_INDICATORS: [&str; 5] = ["stress", "overwhelmed", "anxiety", "worried", "pressure"];
const POSITIVE_INDICATORS: [&str; 5] = ["happy", "excited", "great", "good", "amazing"];
const NEGATIVE_INDICATORS: [&str; 5] = ["sad", "upset", "frustrated", "angry", "disappointed"];
const HELP_INDICATORS: [&str; 7] =
    ["help", "assist", "support", "stuck", "confused", "how to", "need"];

/// Topics matched in a message, in table order
fn extract_topics(lowered: &str) -> Vec<&'static str> {
    TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(topic, _)| *topic)
        .collect()
}

/// Counter that remembers first-seen order so ties rank deterministically
fn bump(counts: &mut Vec<(String, usize)>, key: &str) {
    if let Some(entry) = counts.iter_mut().find(|(k, _)| k == key) {
        entry.1 += 1;
    } else {
        counts.push((key.to_string(), 1));
    }
}

/// Top `n` entries by count; stable sort keeps first-seen order on ties
fn top_n(mut counts: Vec<(String, usize)>, n: usize) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tunables for pattern analysis and need prediction
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Default analysis window in days
    pub analysis_window_days: i64,
    /// Window used by need prediction, in days
    pub prediction_window_days: i64,
    /// Minimum occurrences before a pattern is trusted
    pub min_pattern_occurrences: usize,
    /// How many experiences to load per analysis
    pub retrieval_limit: usize,
    /// Sample size when the time window holds too little data
    pub fallback_sample: usize,
    /// Stress frequency above which a stress need is predicted
    pub stress_need_threshold: f64,
    /// Help frequency above which an assistance need is predicted
    pub help_need_threshold: f64,
    /// Messages per day above which engagement tuning is predicted
    pub engagement_need_threshold: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            analysis_window_days: 14,
            prediction_window_days: 7,
            min_pattern_occurrences: 3,
            retrieval_limit: 200,
            fallback_sample: 50,
            stress_need_threshold: 0.2,
            help_need_threshold: 0.15,
            engagement_need_threshold: 1.0,
        }
    }
}

impl PatternConfig {
    pub fn with_window_days(mut self, days: i64) -> Self {
        self.analysis_window_days = days;
        self
    }

    pub fn with_min_occurrences(mut self, occurrences: usize) -> Self {
        self.min_pattern_occurrences = occurrences;
        self
    }

    pub fn with_retrieval_limit(mut self, limit: usize) -> Self {
        self.retrieval_limit = limit;
        self
    }
}

// ============================================================================
// PATTERN ENGINE
// ============================================================================

/// Behavioral pattern mining over stored experiences
pub struct PatternEngine {
    store: Arc<dyn ExperienceStore>,
    classifier: Option<Arc<dyn Classifier>>,
    config: PatternConfig,
}

impl PatternEngine {
    pub fn new(store: Arc<dyn ExperienceStore>) -> Self {
        Self {
            store,
            classifier: None,
            config: PatternConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PatternConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a classifier to enrich emotion tallies
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Analyze over the configured default window
    pub fn analyze(&self, user_id: &str) -> Result<PatternAnalysis> {
        self.analyze_window(user_id, self.config.analysis_window_days)
    }

    /// Analyze over an explicit window in days
    ///
    /// Records with unreadable timestamps count as recent. When the
    /// window holds too little data the most recent records are used
    /// instead; below the occurrence minimum the result reports
    /// insufficient data.
    pub fn analyze_window(&self, user_id: &str, days: i64) -> Result<PatternAnalysis> {
        let experiences = self.store.retrieve(user_id, self.config.retrieval_limit)?;

        let cutoff = Utc::now() - Duration::days(days);
        let mut recent: Vec<&Experience> = experiences
            .iter()
            .filter(|e| e.timestamp.is_none_or(|t| t >= cutoff))
            .collect();

        if recent.len() < self.config.min_pattern_occurrences {
            recent = experiences
                .iter()
                .take(self.config.fallback_sample)
                .collect();
        }
        if recent.len() < self.config.min_pattern_occurrences {
            return Ok(PatternAnalysis::insufficient(
                user_id,
                days,
                "Insufficient interaction data",
            ));
        }

        let mut degraded = false;
        let behavioral = self.detect_behavioral(&recent);
        let emotional = self.detect_emotional(&recent, &mut degraded);
        let temporal = self.detect_temporal(&recent);
        let communication = Self::detect_communication(&recent, days);
        let help_seeking = Self::detect_help_seeking(&recent);

        let summary = PatternSummary::collect(
            &behavioral,
            &emotional,
            &temporal,
            &communication,
            &help_seeking,
        );
        let confidence = Self::overall_confidence(recent.len(), summary.total_patterns_detected);
        let actionable_insights = Self::generate_insights(
            &behavioral,
            &emotional,
            &temporal,
            &communication,
            &help_seeking,
        );

        let status = if degraded {
            AnalysisStatus::Degraded
        } else {
            AnalysisStatus::Success
        };

        tracing::debug!(
            user_id = %user_id,
            confidence,
            patterns = summary.total_patterns_detected,
            "Pattern analysis complete"
        );

        Ok(PatternAnalysis {
            user_id: user_id.to_string(),
            status,
            total_experiences: recent.len(),
            analysis_period_days: days,
            behavioral,
            emotional,
            temporal,
            communication,
            help_seeking,
            summary,
            confidence,
            actionable_insights,
            message: None,
            generated_at: Utc::now(),
        })
    }

    /// Predict user needs over the short prediction window
    pub fn predict_needs(&self, user_id: &str) -> Result<NeedForecast> {
        let analysis = self.analyze_window(user_id, self.config.prediction_window_days)?;

        let mut predictions = Vec::new();

        let stress_freq = analysis.emotional.stress_frequency;
        if stress_freq > self.config.stress_need_threshold {
            predictions.push(PredictedNeed {
                predicted_need: NeedKind::StressManagementSupport,
                confidence: f64::min(0.9, 0.6 + stress_freq * 0.4),
                reasoning: format!(
                    "Stress detected in {:.1}% of recent interactions",
                    stress_freq * 100.0
                ),
                suggested_actions: vec![
                    "Proactive stress monitoring".to_string(),
                    "Stress relief techniques".to_string(),
                ],
            });
        }

        let help_freq = analysis.help_seeking.help_frequency;
        if help_freq > self.config.help_need_threshold {
            predictions.push(PredictedNeed {
                predicted_need: NeedKind::ProactiveAssistance,
                confidence: f64::min(0.85, 0.5 + help_freq * 0.5),
                reasoning: format!(
                    "User requests help frequently ({:.1}% of messages)",
                    help_freq * 100.0
                ),
                suggested_actions: vec![
                    "Anticipate needs".to_string(),
                    "Proactive guidance".to_string(),
                ],
            });
        }

        let interaction_freq = analysis.communication.interaction_frequency;
        if interaction_freq > self.config.engagement_need_threshold {
            predictions.push(PredictedNeed {
                predicted_need: NeedKind::EngagementOptimization,
                confidence: 0.7,
                reasoning: format!(
                    "High interaction frequency ({:.1} messages/day)",
                    interaction_freq
                ),
                suggested_actions: vec![
                    "Regular engagement".to_string(),
                    "Response optimization".to_string(),
                ],
            });
        }

        let prediction_confidence = if predictions.is_empty() {
            0.0
        } else {
            predictions.iter().map(|p| p.confidence).sum::<f64>() / predictions.len() as f64
        };

        let based_on_experiences = self.store.retrieve(user_id, 10)?.len();

        tracing::debug!(
            user_id = %user_id,
            predictions = predictions.len(),
            confidence = prediction_confidence,
            "Need forecast complete"
        );

        Ok(NeedForecast {
            predictions,
            prediction_confidence,
            based_on_experiences,
            generated_at: Utc::now(),
        })
    }

    // ========================================================================
    // Category detectors
    // ========================================================================

    fn detect_behavioral(&self, experiences: &[&Experience]) -> BehavioralPatterns {
        let mut patterns = BehavioralPatterns::default();

        let user_messages: Vec<&str> = experiences
            .iter()
            .filter(|e| e.is_user_message())
            .map(|e| e.message().unwrap_or(""))
            .collect();

        if user_messages.len() >= self.config.min_pattern_occurrences {
            let avg_length = user_messages.iter().map(|m| m.chars().count()).sum::<usize>() as f64
                / user_messages.len() as f64;
            if avg_length < 30.0 {
                patterns.detected_behaviors.push("concise_communicator".to_string());
            } else if avg_length > 100.0 {
                patterns.detected_behaviors.push("detailed_communicator".to_string());
            }

            let mut topic_counts: Vec<(String, usize)> = Vec::new();
            for message in &user_messages {
                for topic in extract_topics(&message.to_lowercase()) {
                    bump(&mut topic_counts, topic);
                }
            }

            // First recurring topic wins; the frequency table accompanies it
            let dominant = topic_counts
                .iter()
                .find(|(_, count)| *count >= self.config.min_pattern_occurrences)
                .map(|(topic, _)| topic.clone());
            if let Some(topic) = dominant {
                patterns.detected_behaviors.push(format!("focus_on_{topic}"));
                patterns.behavior_frequency = top_n(topic_counts, 5).into_iter().collect();
            }
        }

        patterns.consistency_score = (patterns.detected_behaviors.len() as f64 * 0.2).min(1.0);
        patterns
    }

    fn detect_emotional(
        &self,
        experiences: &[&Experience],
        degraded: &mut bool,
    ) -> EmotionalPatterns {
        let mut patterns = EmotionalPatterns::default();

        let mut stress_count = 0usize;
        let mut total_intensity = 0.0f64;
        let mut emotional_experience_count = 0usize;
        let mut emotion_counts: Vec<(String, usize)> = Vec::new();

        for exp in experiences {
            let lowered = exp.message().unwrap_or("").to_lowercase();

            if STRESS_INDICATORS.iter().any(|w| lowered.contains(w)) {
                stress_count += 1;
                bump(&mut emotion_counts, "stress");
            }
            if POSITIVE_INDICATORS.iter().any(|w| lowered.contains(w)) {
                bump(&mut emotion_counts, "positive");
            }
            if NEGATIVE_INDICATORS.iter().any(|w| lowered.contains(w)) {
                bump(&mut emotion_counts, "negative");
            }

            if !exp.emotional_context.is_empty() {
                emotional_experience_count += 1;
                let mut context: Vec<(&String, &f64)> = exp.emotional_context.iter().collect();
                context.sort_by(|a, b| a.0.cmp(b.0));
                for (emotion, value) in context {
                    bump(&mut emotion_counts, emotion);
                    total_intensity += value;
                }
            }
        }

        if let Some(classifier) = &self.classifier {
            for exp in experiences {
                if !exp.is_user_message() {
                    continue;
                }
                let Some(message) = exp.message() else { continue };
                match classifier.classify(message) {
                    Ok(signal) => {
                        let mut detected: Vec<&String> = signal.emotions.keys().collect();
                        detected.sort();
                        for emotion in detected {
                            bump(&mut emotion_counts, emotion);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(user_id = %exp.user_id, "Emotion enrichment failed: {}", e);
                        *degraded = true;
                    }
                }
            }
        }

        let total = experiences.len();
        if total > 0 {
            patterns.stress_frequency = stress_count as f64 / total as f64;
            patterns.emotional_stability =
                (1.0 - total_intensity / emotional_experience_count.max(1) as f64).max(0.0);
            patterns.dominant_emotions = top_n(emotion_counts, 5).into_iter().collect();

            if patterns.stress_frequency > 0.3 {
                patterns.emotional_trends.push("high_stress_frequency".to_string());
            }
            if patterns.emotional_stability > 0.7 {
                patterns.emotional_trends.push("emotionally_stable".to_string());
            } else if patterns.emotional_stability < 0.3 {
                patterns.emotional_trends.push("emotionally_variable".to_string());
            }
        }

        patterns
    }

    fn detect_temporal(&self, experiences: &[&Experience]) -> TemporalPatterns {
        let mut patterns = TemporalPatterns::default();

        // Unreadable timestamps drop out of temporal analysis only
        let hours: Vec<u32> = experiences
            .iter()
            .filter_map(|e| e.timestamp)
            .map(|t| t.hour())
            .collect();

        if hours.len() >= self.config.min_pattern_occurrences {
            let mut hour_counts = [0usize; 24];
            for &hour in &hours {
                hour_counts[hour as usize] += 1;
            }

            let max_activity = hour_counts.iter().copied().max().unwrap_or(0);
            let threshold = max_activity as f64 * 0.7;
            let peak_hours: Vec<u32> = (0..24u32)
                .filter(|&h| {
                    let count = hour_counts[h as usize];
                    count > 0 && count as f64 >= threshold
                })
                .collect();

            if peak_hours.iter().any(|&h| (6..12).contains(&h)) {
                patterns.activity_periods.push("morning_active".to_string());
            }
            if peak_hours.iter().any(|&h| (12..18).contains(&h)) {
                patterns.activity_periods.push("afternoon_active".to_string());
            }
            if peak_hours.iter().any(|&h| (18..24).contains(&h) || h < 6) {
                patterns.activity_periods.push("evening_active".to_string());
            }
            patterns.peak_hours = peak_hours;

            let active_hours = hour_counts.iter().filter(|&&c| c > 0).count();
            patterns.schedule_consistency = (1.0 - active_hours as f64 / 24.0).max(0.0);
        }

        patterns
    }

    fn detect_communication(experiences: &[&Experience], days: i64) -> CommunicationPatterns {
        let mut patterns = CommunicationPatterns::default();

        let user_messages: Vec<&str> = experiences
            .iter()
            .filter(|e| e.is_user_message())
            .map(|e| e.message().unwrap_or(""))
            .collect();

        if !user_messages.is_empty() {
            let total = user_messages.len() as f64;
            let questions = user_messages.iter().filter(|m| m.contains('?')).count();
            let exclamations = user_messages.iter().filter(|m| m.contains('!')).count();

            if questions as f64 / total > 0.4 {
                patterns.communication_style.push("inquisitive".to_string());
            }
            if exclamations as f64 / total > 0.3 {
                patterns.communication_style.push("expressive".to_string());
            }

            patterns.interaction_frequency = total / days.max(7) as f64;
        }

        patterns
    }

    fn detect_help_seeking(experiences: &[&Experience]) -> HelpSeekingPatterns {
        let mut patterns = HelpSeekingPatterns::default();

        let mut user_message_count = 0usize;
        let mut help_requests: Vec<String> = Vec::new();
        for exp in experiences {
            if !exp.is_user_message() {
                continue;
            }
            user_message_count += 1;
            let lowered = exp.message().unwrap_or("").to_lowercase();
            if HELP_INDICATORS.iter().any(|w| lowered.contains(w)) {
                help_requests.push(lowered);
            }
        }

        if user_message_count > 0 {
            patterns.help_frequency = help_requests.len() as f64 / user_message_count as f64;

            let mut topic_counts: Vec<(String, usize)> = Vec::new();
            for request in &help_requests {
                for topic in extract_topics(request) {
                    bump(&mut topic_counts, topic);
                }
            }
            patterns.help_topics = top_n(topic_counts, 3).into_iter().map(|(t, _)| t).collect();

            let style = if patterns.help_frequency > 0.3 {
                "frequent_help_seeker"
            } else if patterns.help_frequency < 0.1 {
                "independent_problem_solver"
            } else {
                "balanced_help_seeker"
            };
            patterns.problem_solving_style.push(style.to_string());
        }

        patterns
    }

    // ========================================================================
    // Roll-up
    // ========================================================================

    fn overall_confidence(total_experiences: usize, total_patterns: usize) -> f64 {
        if total_experiences == 0 {
            return 0.0;
        }
        let data_confidence = (total_experiences as f64 / 50.0).min(1.0);
        let pattern_confidence = (total_patterns as f64 / 10.0).min(1.0);
        (data_confidence + pattern_confidence) / 2.0
    }

    fn generate_insights(
        behavioral: &BehavioralPatterns,
        emotional: &EmotionalPatterns,
        temporal: &TemporalPatterns,
        communication: &CommunicationPatterns,
        help_seeking: &HelpSeekingPatterns,
    ) -> Vec<String> {
        let has = |list: &[String], name: &str| list.iter().any(|p| p == name);
        let mut insights: Vec<&str> = Vec::new();

        if has(&behavioral.detected_behaviors, "concise_communicator") {
            insights.push("Provide brief, direct responses - user prefers concise communication");
        } else if has(&behavioral.detected_behaviors, "detailed_communicator") {
            insights
                .push("User appreciates detailed explanations - provide comprehensive responses");
        }

        if emotional.stress_frequency > 0.3 {
            insights.push("Monitor for stress indicators and offer proactive support");
        }
        if has(&emotional.emotional_trends, "emotionally_stable") {
            insights.push(
                "User maintains good emotional balance - focus on maintaining current strategies",
            );
        } else if has(&emotional.emotional_trends, "high_stress_frequency") {
            insights.push("Consider stress management interventions and regular check-ins");
        }

        if has(&temporal.activity_periods, "morning_active") {
            insights
                .push("Schedule important interactions for morning hours when user is most active");
        } else if has(&temporal.activity_periods, "evening_active") {
            insights.push("User is most active in evenings - optimize support for after-hours");
        }

        if has(&communication.communication_style, "inquisitive") {
            insights.push("User asks many questions - prepare comprehensive explanations");
        }
        if has(&communication.communication_style, "expressive") {
            insights.push("User communicates expressively - match energy level in responses");
        }

        if help_seeking.help_frequency > 0.3 {
            insights.push(
                "User benefits from proactive assistance - anticipate needs before explicit requests",
            );
        } else if help_seeking.help_frequency < 0.1 {
            insights
                .push("User prefers independence - offer suggestions rather than detailed guidance");
        }

        insights.truncate(7);
        insights.into_iter().map(String::from).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifiedMessage, ClassifyError};
    use crate::experience::ExperienceInput;
    use crate::storage::MemoryStore;
    use chrono::DateTime;
    use serde_json::Map;
    use std::collections::HashMap;

    struct StaticClassifier;

    impl Classifier for StaticClassifier {
        fn classify(&self, _message: &str) -> crate::classify::Result<ClassifiedMessage> {
            let mut signal = ClassifiedMessage::default();
            signal.emotions.insert("joy".to_string(), 0.9);
            Ok(signal)
        }

        fn is_structured(&self) -> bool {
            true
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classify(&self, _message: &str) -> crate::classify::Result<ClassifiedMessage> {
            Err(ClassifyError::Backend("offline".to_string()))
        }
    }

    fn engine(store: Arc<MemoryStore>) -> PatternEngine {
        PatternEngine::new(store)
    }

    fn seed_messages(store: &MemoryStore, user: &str, messages: &[&str]) {
        for (i, message) in messages.iter().enumerate() {
            let ts = Utc::now() - Duration::hours(i as i64 + 1);
            store
                .store(ExperienceInput::user_message(user, message).with_timestamp(ts))
                .unwrap();
        }
    }

    fn raw_message(user: &str, message: &str, timestamp: Option<DateTime<Utc>>) -> Experience {
        let mut payload = Map::new();
        payload.insert("type".to_string(), serde_json::Value::from("user_message"));
        payload.insert("message".to_string(), serde_json::Value::from(message));
        Experience {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.to_string(),
            payload,
            emotional_context: HashMap::new(),
            importance: 0.5,
            timestamp,
            tags: Vec::new(),
            archived: false,
        }
    }

    #[test]
    fn test_insufficient_data_below_minimum() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(&store, "u1", &["hello", "hi again"]);

        let analysis = engine(store).analyze("u1").unwrap();
        assert_eq!(analysis.status, AnalysisStatus::InsufficientData);
        assert_eq!(analysis.confidence, 0.0);
        assert_eq!(
            analysis.actionable_insights,
            vec!["Continue interacting to build pattern recognition data"]
        );
    }

    #[test]
    fn test_empty_user_insufficient() {
        let store = Arc::new(MemoryStore::new());
        let analysis = engine(store).analyze("nobody").unwrap();
        assert_eq!(analysis.status, AnalysisStatus::InsufficientData);
        assert_eq!(analysis.message.as_deref(), Some("Insufficient interaction data"));
    }

    #[test]
    fn test_concise_communicator_detected() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(&store, "u1", &["ok", "yes", "sounds fine"]);

        let analysis = engine(store).analyze("u1").unwrap();
        assert!(analysis
            .behavioral
            .detected_behaviors
            .contains(&"concise_communicator".to_string()));
        assert!((analysis.behavioral.consistency_score - 0.2).abs() < 1e-9);
        assert!(analysis
            .actionable_insights
            .contains(&"Provide brief, direct responses - user prefers concise communication".to_string()));
    }

    #[test]
    fn test_recurring_topic_becomes_focus_behavior() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(&store, "u1", &["project due", "office is loud", "deadline looms"]);

        let analysis = engine(store).analyze("u1").unwrap();
        assert!(analysis
            .behavioral
            .detected_behaviors
            .contains(&"focus_on_work".to_string()));
        assert_eq!(analysis.behavioral.behavior_frequency.get("work"), Some(&3));
    }

    #[test]
    fn test_stress_frequency_and_trend() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(
            &store,
            "u1",
            &[
                "feeling the pressure at work",
                "so worried about the deadline",
                "overwhelmed by everything",
                "lunch was fine",
            ],
        );

        let analysis = engine(store).analyze("u1").unwrap();
        assert!((analysis.emotional.stress_frequency - 0.75).abs() < 1e-9);
        assert!(analysis
            .emotional
            .emotional_trends
            .contains(&"high_stress_frequency".to_string()));
        assert_eq!(analysis.emotional.dominant_emotions.get("stress"), Some(&3));
        assert!(analysis
            .actionable_insights
            .contains(&"Monitor for stress indicators and offer proactive support".to_string()));
    }

    #[test]
    fn test_morning_activity_detected() {
        let store = Arc::new(MemoryStore::new());
        for day in 1..=4 {
            let ts = (Utc::now() - Duration::days(day))
                .date_naive()
                .and_hms_opt(9, 15, 0)
                .unwrap()
                .and_utc();
            store
                .store(ExperienceInput::user_message("u1", "morning check-in").with_timestamp(ts))
                .unwrap();
        }

        let analysis = engine(store).analyze("u1").unwrap();
        assert!(analysis
            .temporal
            .activity_periods
            .contains(&"morning_active".to_string()));
        assert!(analysis.temporal.peak_hours.contains(&9));
        assert!((analysis.temporal.schedule_consistency - (1.0 - 1.0 / 24.0)).abs() < 1e-9);
    }

    #[test]
    fn test_inquisitive_style() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(
            &store,
            "u1",
            &["what is this?", "can it run?", "is that so?", "fine by me"],
        );

        let analysis = engine(store).analyze("u1").unwrap();
        assert!(analysis
            .communication
            .communication_style
            .contains(&"inquisitive".to_string()));
        assert!((analysis.communication.interaction_frequency - 4.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_frequent_help_seeker() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(
            &store,
            "u1",
            &[
                "help with my schedule",
                "stuck on the project",
                "assist with planning",
                "nice day out",
            ],
        );

        let analysis = engine(store).analyze("u1").unwrap();
        assert!((analysis.help_seeking.help_frequency - 0.75).abs() < 1e-9);
        assert_eq!(
            analysis.help_seeking.problem_solving_style,
            vec!["frequent_help_seeker"]
        );
        assert!(analysis
            .actionable_insights
            .contains(&"User benefits from proactive assistance - anticipate needs before explicit requests".to_string()));
    }

    #[test]
    fn test_unreadable_timestamps_count_as_recent() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..3 {
            store
                .insert_raw(raw_message("u1", &format!("note {i}"), None))
                .unwrap();
        }

        let analysis = engine(store).analyze("u1").unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Success);
        assert_eq!(analysis.total_experiences, 3);
        // No readable timestamps means no temporal patterns
        assert!(analysis.temporal.peak_hours.is_empty());
    }

    #[test]
    fn test_stale_history_falls_back_to_recent_records() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..5 {
            let ts = Utc::now() - Duration::days(30 + i);
            store
                .store(ExperienceInput::user_message("u1", "old note").with_timestamp(ts))
                .unwrap();
        }

        let analysis = engine(store).analyze("u1").unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Success);
        assert_eq!(analysis.total_experiences, 5);
    }

    #[test]
    fn test_classifier_enriches_dominant_emotions() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(&store, "u1", &["plain note", "another note", "third note"]);

        let analysis = engine(store.clone())
            .with_classifier(Arc::new(StaticClassifier))
            .analyze("u1")
            .unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Success);
        assert_eq!(analysis.emotional.dominant_emotions.get("joy"), Some(&3));
    }

    #[test]
    fn test_failing_classifier_degrades_run() {
        let store = Arc::new(MemoryStore::new());
        seed_messages(&store, "u1", &["plain note", "another note", "third note"]);

        let analysis = engine(store)
            .with_classifier(Arc::new(FailingClassifier))
            .analyze("u1")
            .unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Degraded);
        // Heuristic output still present
        assert_eq!(analysis.total_experiences, 3);
    }

    #[test]
    fn test_stress_need_prediction() {
        let store = Arc::new(MemoryStore::new());
        let mut messages = vec![];
        for _ in 0..6 {
            messages.push("feeling the pressure at work today");
        }
        for _ in 0..4 {
            messages.push("the weather is nice");
        }
        seed_messages(&store, "u1", &messages);

        let forecast = engine(store).predict_needs("u1").unwrap();
        let stress = forecast
            .predictions
            .iter()
            .find(|p| p.predicted_need == NeedKind::StressManagementSupport)
            .unwrap();
        assert!((stress.confidence - 0.84).abs() < 1e-9);
        assert!(stress.reasoning.contains("60.0%"));
        assert_eq!(forecast.based_on_experiences, 10);
        assert!(forecast.prediction_confidence > 0.0);
    }

    #[test]
    fn test_quiet_user_yields_no_predictions() {
        let store = Arc::new(MemoryStore::new());
        let forecast = engine(store).predict_needs("nobody").unwrap();
        assert!(forecast.predictions.is_empty());
        assert_eq!(forecast.prediction_confidence, 0.0);
        assert_eq!(forecast.based_on_experiences, 0);
    }

    #[test]
    fn test_confidence_scales_with_data_and_patterns() {
        assert_eq!(PatternEngine::overall_confidence(0, 0), 0.0);
        let low = PatternEngine::overall_confidence(5, 1);
        let high = PatternEngine::overall_confidence(50, 10);
        assert!(low < high);
        assert!((high - 1.0).abs() < 1e-9);
    }
}

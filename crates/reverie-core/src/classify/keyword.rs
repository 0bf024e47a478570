//! # Keyword Classifier
//!
//! Default [`Classifier`] backend. Pure keyword heuristics over the
//! message text, no model calls, never fails. Kept deliberately cheap so
//! it can run inline on every stored message.

use std::collections::HashMap;

use super::{ClassifiedMessage, Classifier, Intent, Result, SuggestedResponder};

/// Confidence reported when nothing beyond defaults matched
const BASE_CONFIDENCE: f64 = 0.6;

/// Confidence reported when at least one lexicon matched
const SIGNAL_CONFIDENCE: f64 = 0.7;

/// Emotion lexicon: name, strength when matched, trigger keywords
///
/// Iteration order breaks primary-emotion ties, so entries stay sorted
/// by descending strength.
const EMOTION_LEXICON: [(&str, f64, &[&str]); 6] = [
    ("urgency", 0.8, &["urgent", "immediately", "asap", "emergency"]),
    ("stress", 0.7, &["stress", "stressed", "overwhelmed", "pressure"]),
    ("seeking_help", 0.6, &["help", "assist", "support", "guidance"]),
    ("positive", 0.6, &["happy", "great", "awesome", "excited"]),
    ("negative", 0.6, &["sad", "upset", "frustrated", "disappointed"]),
    ("curiosity", 0.5, &["learn", "understand", "explain", "curious"]),
];

/// Question words checked when no `?` is present
const QUESTION_WORDS: [&str; 5] = ["what", "how", "why", "when", "where"];

/// Keyword-driven classifier
///
/// The baseline backend every engine can rely on. Swap in a structured
/// backend via the [`Classifier`] seam when model-grade output is
/// available.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn detect_emotions(lowered: &str) -> HashMap<String, f64> {
        let mut emotions = HashMap::new();
        for (name, strength, keywords) in EMOTION_LEXICON {
            if keywords.iter().any(|k| lowered.contains(k)) {
                emotions.insert(name.to_string(), strength);
            }
        }
        emotions
    }

    /// Strongest detected emotion; lexicon order breaks ties
    fn primary_emotion(emotions: &HashMap<String, f64>) -> Option<String> {
        let mut best: Option<(&str, f64)> = None;
        for (name, _, _) in EMOTION_LEXICON {
            if let Some(&value) = emotions.get(name) {
                if best.is_none_or(|(_, current)| value > current) {
                    best = Some((name, value));
                }
            }
        }
        best.map(|(name, _)| name.to_string())
    }

    fn detect_intent(lowered: &str) -> Intent {
        if lowered.contains('?') || QUESTION_WORDS.iter().any(|w| lowered.contains(w)) {
            Intent::Question
        } else if ["help", "assist", "support"].iter().any(|w| lowered.contains(w)) {
            Intent::RequestHelp
        } else if ["schedule", "meeting", "appointment"].iter().any(|w| lowered.contains(w)) {
            Intent::Scheduling
        } else if ["task", "todo", "organize"].iter().any(|w| lowered.contains(w)) {
            Intent::TaskPlanning
        } else {
            Intent::General
        }
    }

    fn estimate_importance(lowered: &str, emotions: &HashMap<String, f64>) -> f64 {
        let mut importance = 0.5;
        if ["urgent", "important", "emergency"].iter().any(|w| lowered.contains(w)) {
            importance = 0.8;
        } else if ["help", "problem", "issue"].iter().any(|w| lowered.contains(w)) {
            importance = 0.7;
        }

        // Emotional escalation overrides the keyword estimate upward only
        if emotions.get("urgency").copied().unwrap_or(0.0) > 0.7 {
            importance = f64::max(importance, 0.9);
        }
        if emotions.get("stress").copied().unwrap_or(0.0) > 0.6 {
            importance = f64::max(importance, 0.7);
        }
        importance
    }

    fn suggest_responder(lowered: &str, emotions: &HashMap<String, f64>) -> SuggestedResponder {
        if emotions.get("stress").copied().unwrap_or(0.0) > 0.6 {
            SuggestedResponder::StressSupport
        } else if ["task", "organize"].iter().any(|w| lowered.contains(w)) {
            SuggestedResponder::Productivity
        } else if ["conversation", "communication"].iter().any(|w| lowered.contains(w)) {
            SuggestedResponder::Communication
        } else {
            SuggestedResponder::Context
        }
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, message: &str) -> Result<ClassifiedMessage> {
        let lowered = message.to_lowercase();

        let emotions = Self::detect_emotions(&lowered);
        let primary_emotion = Self::primary_emotion(&emotions);
        let intensity = emotions.values().copied().fold(0.0, f64::max);

        let intent = Self::detect_intent(&lowered);
        let importance = Self::estimate_importance(&lowered, &emotions);
        let responder = Self::suggest_responder(&lowered, &emotions);

        let confidence = if emotions.is_empty() && intent == Intent::General {
            BASE_CONFIDENCE
        } else {
            SIGNAL_CONFIDENCE
        };

        Ok(ClassifiedMessage {
            requires_action: intent.requires_action(),
            emotions,
            primary_emotion,
            intensity,
            intent,
            importance,
            responder,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(message: &str) -> ClassifiedMessage {
        KeywordClassifier::new().classify(message).unwrap()
    }

    #[test]
    fn test_stress_routes_to_stress_support() {
        let result = classify("I'm so stressed about everything");
        assert!((result.emotion("stress") - 0.7).abs() < 1e-9);
        assert_eq!(result.primary_emotion.as_deref(), Some("stress"));
        assert_eq!(result.responder, SuggestedResponder::StressSupport);
        assert!((result.importance - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_question_intent() {
        let result = classify("what time is it");
        assert_eq!(result.intent, Intent::Question);
        assert!(!result.requires_action);
    }

    #[test]
    fn test_question_mark_wins_over_help() {
        let result = classify("can you help me?");
        assert_eq!(result.intent, Intent::Question);
        assert!((result.emotion("seeking_help") - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_help_request_requires_action() {
        let result = classify("please assist with this");
        assert_eq!(result.intent, Intent::RequestHelp);
        assert!(result.requires_action);
    }

    #[test]
    fn test_scheduling_intent() {
        let result = classify("set up a meeting for tomorrow");
        assert_eq!(result.intent, Intent::Scheduling);
        assert!(result.requires_action);
    }

    #[test]
    fn test_task_planning_routes_to_productivity() {
        let result = classify("organize my todo list");
        assert_eq!(result.intent, Intent::TaskPlanning);
        assert_eq!(result.responder, SuggestedResponder::Productivity);
    }

    #[test]
    fn test_urgency_escalates_importance() {
        let result = classify("deal with this immediately");
        assert!((result.emotion("urgency") - 0.8).abs() < 1e-9);
        assert!((result.importance - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_urgency_outranks_stress_as_primary() {
        let result = classify("urgent, I'm stressed");
        assert_eq!(result.primary_emotion.as_deref(), Some("urgency"));
        assert!((result.intensity - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_neutral_message_defaults() {
        let result = classify("the sky is blue today");
        assert!(result.emotions.is_empty());
        assert!(result.primary_emotion.is_none());
        assert_eq!(result.intent, Intent::General);
        assert_eq!(result.responder, SuggestedResponder::Context);
        assert!((result.importance - 0.5).abs() < 1e-9);
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_not_structured() {
        assert!(!KeywordClassifier::new().is_structured());
    }
}

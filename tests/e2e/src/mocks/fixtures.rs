//! Test Data Factory
//!
//! Generates realistic experience batches for seeding test stores:
//! - A stressful work week with escalating emotional context
//! - Persistent help-seeking behavior
//! - A balanced week with mixed topics and moods
//! - Messages rich in entity mentions for relationship tests
//!
//! All batches carry timestamps inside the engines' recent-analysis
//! windows so seeded data actually participates in analysis.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use reverie_core::experience::ExperienceInput;
use reverie_core::storage::ExperienceStore;

/// Factory for realistic experience batches
pub struct ExperienceFactory;

impl ExperienceFactory {
    fn context(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    /// A week of escalating work stress with explicit help requests
    pub fn stress_week(user_id: &str) -> Vec<ExperienceInput> {
        let now = Utc::now();
        let messages: [(&str, &[(&str, f64)]); 8] = [
            ("this project deadline is really stressing me out", &[("stress", 0.6)]),
            ("feeling overwhelmed by everything at work", &[("stress", 0.7)]),
            ("so much pressure from my boss this week", &[("stress", 0.7), ("anxiety", 0.5)]),
            ("I need help prioritizing these tasks", &[("stress", 0.6), ("seeking_help", 0.6)]),
            ("completely stressed, can you help me plan", &[("stress", 0.8), ("seeking_help", 0.7)]),
            ("another deadline moved up, overwhelmed again", &[("stress", 0.8)]),
            ("help me figure out what to drop from my plate", &[("stress", 0.7), ("seeking_help", 0.8)]),
            ("work stress is affecting my sleep now", &[("stress", 0.9), ("anxiety", 0.6)]),
        ];

        messages
            .iter()
            .enumerate()
            .map(|(i, (message, context))| {
                ExperienceInput::user_message(user_id, message)
                    .with_emotional_context(Self::context(context))
                    .with_timestamp(now - Duration::hours(6 * (i as i64 + 1)))
            })
            .collect()
    }

    /// Repeated help requests without the stress load
    pub fn help_seeking(user_id: &str, count: usize) -> Vec<ExperienceInput> {
        let now = Utc::now();
        let messages = [
            "can you help me set up the spreadsheet",
            "I'm stuck on this configuration, please assist",
            "need support understanding this report",
            "help me draft a reply to this email",
        ];

        (0..count)
            .map(|i| {
                ExperienceInput::user_message(user_id, messages[i % messages.len()])
                    .with_emotional_context(Self::context(&[("seeking_help", 0.6)]))
                    .with_timestamp(now - Duration::hours(4 * (i as i64 + 1)))
            })
            .collect()
    }

    /// Mixed topics and moods over a calm week
    pub fn balanced_week(user_id: &str) -> Vec<ExperienceInput> {
        let now = Utc::now();
        let messages: [(&str, &[(&str, f64)]); 6] = [
            ("had a great workout at the gym this morning", &[("positive", 0.7)]),
            ("finished the quarterly report early", &[("positive", 0.6)]),
            ("planning the garden for spring", &[]),
            ("reading a new book about astronomy", &[("curiosity", 0.5)]),
            ("dinner with friends went really well", &[("positive", 0.8)]),
            ("quiet day, caught up on chores", &[]),
        ];

        messages
            .iter()
            .enumerate()
            .map(|(i, (message, context))| {
                ExperienceInput::user_message(user_id, message)
                    .with_emotional_context(Self::context(context))
                    .with_timestamp(now - Duration::hours(12 * (i as i64 + 1)))
            })
            .collect()
    }

    /// Messages that repeatedly mention people, places, and concepts
    pub fn relationship_mentions(user_id: &str) -> Vec<ExperienceInput> {
        let now = Utc::now();
        let messages: [(&str, &[(&str, f64)]); 6] = [
            ("my boss is piling more onto the project", &[("stress", 0.8)]),
            ("my boss approved the new plan today", &[("positive", 0.6)]),
            ("long day at the office working on the deadline", &[("stress", 0.5)]),
            ("my friend recommended a great book", &[("happy", 0.7)]),
            ("back at the gym after a week off", &[("positive", 0.6)]),
            ("my boss and I reviewed the budget together", &[("positive", 0.5)]),
        ];

        messages
            .iter()
            .enumerate()
            .map(|(i, (message, context))| {
                ExperienceInput::user_message(user_id, message)
                    .with_emotional_context(Self::context(context))
                    .with_timestamp(now - Duration::hours(8 * (i as i64 + 1)))
            })
            .collect()
    }

    /// Store a batch, panicking on the first failure
    pub fn seed(store: &dyn ExperienceStore, inputs: Vec<ExperienceInput>) {
        for input in inputs {
            store.store(input).expect("seed experience");
        }
    }
}

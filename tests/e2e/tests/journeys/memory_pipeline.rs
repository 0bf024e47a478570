//! Memory pipeline journey
//!
//! Full store-side lifecycle against the durable store: ingest with
//! enrichment, ordered retrieval, similarity lookup, retention cleanup,
//! and pattern analysis over what was stored.

use reverie_core::experience::ExperienceInput;
use reverie_core::patterns::{AnalysisStatus, NeedKind, PatternEngine};
use reverie_e2e_tests::harness::TestStoreManager;
use reverie_e2e_tests::mocks::ExperienceFactory;

#[test]
fn stored_experiences_are_enriched_and_ordered() {
    let manager = TestStoreManager::new_temp();
    let store = manager.store();

    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::stress_week("alex"));

    let records = store.retrieve("alex", 50).unwrap();
    assert_eq!(records.len(), 8);

    // Newest first
    for pair in records.windows(2) {
        assert!(pair[0].timestamp.unwrap() >= pair[1].timestamp.unwrap());
    }

    // Ingest enrichment ran: intensity in payload, topic tags, boosted importance
    let first = &records[0];
    assert!(first.payload.contains_key("emotionalIntensity"));
    assert!(first.tags.iter().any(|t| t.starts_with("topic:")));
    assert!(first.importance > 0.5);
}

#[test]
fn similarity_lookup_finds_topic_matches() {
    let manager = TestStoreManager::new_temp();
    let store = manager.store();

    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::stress_week("alex"));
    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::balanced_week("alex"));

    let hits = store.find_similar("alex", "deadline", 10).unwrap();
    assert!(!hits.is_empty());
    assert!(hits
        .iter()
        .all(|r| r.message().unwrap().contains("deadline")));
}

#[test]
fn cleanup_keeps_the_important_records() {
    let manager = TestStoreManager::new_temp();
    let store = manager.store();

    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::stress_week("alex"));
    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::balanced_week("alex"));
    assert_eq!(store.stats("alex").unwrap().total_experiences, 14);

    let archived = store.cleanup("alex", 10).unwrap();
    assert_eq!(archived, 4);
    assert_eq!(store.retrieve("alex", 50).unwrap().len(), 10);
    assert_eq!(store.stats("alex").unwrap().total_experiences, 10);
}

#[test]
fn stats_are_scoped_per_user() {
    let manager = TestStoreManager::new_temp();
    let store = manager.store();

    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::balanced_week("alex"));
    store
        .store(ExperienceInput::user_message("sam", "unrelated message"))
        .unwrap();

    assert_eq!(store.stats("alex").unwrap().total_experiences, 6);
    assert_eq!(store.stats("sam").unwrap().total_experiences, 1);
}

#[test]
fn pattern_analysis_sees_the_stress_week() {
    let manager = TestStoreManager::new_temp();
    let store = manager.store();
    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::stress_week("alex"));

    let engine = PatternEngine::new(manager.store());
    let analysis = engine.analyze("alex").unwrap();

    assert_eq!(analysis.status, AnalysisStatus::Success);
    assert_eq!(analysis.total_experiences, 8);
    assert!(analysis.emotional.stress_frequency > 0.5);
    assert!(analysis.confidence > 0.0);
    assert!(!analysis.actionable_insights.is_empty());
}

#[test]
fn stress_week_predicts_stress_support() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = PatternEngine::new(manager.store());
    let forecast = engine.predict_needs("alex").unwrap();

    let needs: Vec<NeedKind> = forecast
        .predictions
        .iter()
        .map(|p| p.predicted_need)
        .collect();
    assert!(needs.contains(&NeedKind::StressManagementSupport));
    assert!(forecast.prediction_confidence > 0.5);
}

#[test]
fn calm_week_predicts_no_stress_support() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::balanced_week("alex"),
    );

    let engine = PatternEngine::new(manager.store());
    let forecast = engine.predict_needs("alex").unwrap();

    assert!(forecast
        .predictions
        .iter()
        .all(|p| p.predicted_need != NeedKind::StressManagementSupport));
}

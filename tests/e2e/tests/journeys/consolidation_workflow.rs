//! Consolidation journey
//!
//! Theme discovery over a seeded history, knowledge persistence, and
//! compounding across repeated passes.

use std::sync::Arc;

use reverie_core::classify::KeywordClassifier;
use reverie_core::consolidation::{ConsolidationEngine, ConsolidationStatus, ThemeKind};
use reverie_e2e_tests::harness::TestStoreManager;
use reverie_e2e_tests::mocks::ExperienceFactory;

#[test]
fn stress_week_consolidates_into_themes() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = ConsolidationEngine::new(manager.store());
    let report = engine.consolidate("alex").unwrap();

    assert_eq!(report.status, ConsolidationStatus::Success);
    assert_eq!(report.experiences_processed, 8);

    let stress = report
        .themes
        .iter()
        .find(|t| t.theme == ThemeKind::StressRelatedInteractions)
        .expect("stress theme retained");
    assert_eq!(stress.total_experiences, 8);
    assert!((stress.pattern_strength - 0.8).abs() < 1e-9);
    assert!(stress.consolidated_knowledge.contains("pattern strength"));
    assert!(!stress.behavioral_insights.is_empty());

    // Help requests form their own theme
    assert!(report
        .themes
        .iter()
        .any(|t| t.theme == ThemeKind::HelpSeekingPattern));
}

#[test]
fn structured_classifier_changes_the_catalog() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = ConsolidationEngine::new(manager.store())
        .with_classifier(Arc::new(KeywordClassifier::new()));
    let report = engine.consolidate("alex").unwrap();

    assert_eq!(report.status, ConsolidationStatus::Success);
    assert!(!report.degraded);
    // Structured catalog only
    assert!(report.themes.iter().all(|t| !matches!(
        t.theme,
        ThemeKind::HelpSeekingPattern
            | ThemeKind::StressRelatedInteractions
            | ThemeKind::WorkRelatedDiscussions
    )));
    assert!(report
        .themes
        .iter()
        .any(|t| t.theme.is_stress_related()));
}

#[test]
fn consolidated_knowledge_is_persisted_and_read_back() {
    let manager = TestStoreManager::new_temp();
    let store = manager.store();
    ExperienceFactory::seed(store.as_ref(), ExperienceFactory::stress_week("alex"));

    let engine = ConsolidationEngine::new(manager.store());
    let report = engine.consolidate("alex").unwrap();

    let records = store.retrieve("alex", 50).unwrap();
    let consolidated: Vec<_> = records
        .iter()
        .filter(|r| r.is_consolidated_memory())
        .collect();
    assert_eq!(consolidated.len(), report.themes.len());
    assert!(consolidated.iter().all(|r| r.importance >= 0.9));
    assert!(consolidated
        .iter()
        .all(|r| r.emotional_context.get("consolidation") == Some(&1.0)));

    let stored = engine.consolidated_insights("alex").unwrap();
    assert_eq!(stored.len(), report.themes.len());
    for pair in stored.windows(2) {
        assert!(pair[0].pattern_strength >= pair[1].pattern_strength);
    }
}

#[test]
fn repeated_passes_compound_without_weakening() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = ConsolidationEngine::new(manager.store());
    let first = engine.consolidate("alex").unwrap();
    let second = engine.consolidate("alex").unwrap();

    for theme in &first.themes {
        let again = second
            .themes
            .iter()
            .find(|t| t.theme == theme.theme)
            .expect("theme survives reconsolidation");
        assert!(again.pattern_strength >= theme.pattern_strength);
    }

    // Both passes' records are on file
    let stored = engine.consolidated_insights("alex").unwrap();
    assert_eq!(stored.len(), first.themes.len() + second.themes.len());
}

#[test]
fn sparse_history_reports_insufficient_data() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::help_seeking("alex", 2),
    );

    let engine = ConsolidationEngine::new(manager.store());
    let report = engine.consolidate("alex").unwrap();
    assert_eq!(report.status, ConsolidationStatus::InsufficientData);
    assert!(report.themes.is_empty());
}

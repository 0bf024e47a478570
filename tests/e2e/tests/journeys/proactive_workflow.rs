//! Proactive workflow journey
//!
//! The full loop: seed a stressful history, plan interventions from the
//! resulting forecast, execute them through an executor, and verify the
//! cooldown and status accounting along the way.

use chrono::{Duration, Utc};
use reverie_core::patterns::NeedKind;
use reverie_core::proactive::{
    ExecutionGate, ProactiveEngine, TaskPriority, TaskStatus, TemplateResponder,
};
use reverie_e2e_tests::harness::TestStoreManager;
use reverie_e2e_tests::mocks::ExperienceFactory;

#[test]
fn stress_week_plans_elevated_interventions() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = ProactiveEngine::new(manager.store());
    let report = engine.plan_next_actions("alex").unwrap();

    assert!(report.candidates_planned >= 2);
    assert_eq!(report.merge.added, report.candidates_planned);
    assert!(report.elevated_queued >= 1);
    assert!(report.planning_confidence > 0.5);

    let status = engine.status("alex").unwrap();
    assert_eq!(status.queued_tasks, report.total_queued);
    assert!((status.last_plan_confidence - report.planning_confidence).abs() < 1e-9);
}

#[test]
fn replanning_deduplicates_by_category() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = ProactiveEngine::new(manager.store());
    let first = engine.plan_next_actions("alex").unwrap();
    let second = engine.plan_next_actions("alex").unwrap();

    assert_eq!(second.merge.added, 0);
    assert_eq!(second.merge.duplicates_dropped, first.merge.added);
    assert_eq!(second.total_queued, first.total_queued);
}

#[test]
fn execution_completes_in_window_tasks() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = ProactiveEngine::new(manager.store());
    let now = Utc::now();
    engine.plan_next_actions_at("alex", now).unwrap();

    // Stress interventions open after their ten minute lead
    let later = now + Duration::seconds(900);
    let report = engine
        .execute_tasks_at("alex", &TemplateResponder, later)
        .unwrap();

    assert_eq!(report.gate, ExecutionGate::Open);
    assert!(!report.executed.is_empty());
    let task = &report.executed[0];
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.category, NeedKind::StressManagementSupport);
    assert_eq!(task.priority, TaskPriority::Urgent);
    assert_eq!(
        task.outcome.as_ref().unwrap().summary,
        "Stress management resources prepared and delivered"
    );

    let status = engine.status_at("alex", later).unwrap();
    assert_eq!(status.history_count, report.executed.len());
    assert!((status.success_rate - 1.0).abs() < 1e-9);
}

#[test]
fn cooldown_holds_new_tasks_scheduled() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::stress_week("alex"),
    );

    let engine = ProactiveEngine::new(manager.store());
    let now = Utc::now();
    engine.plan_next_actions_at("alex", now).unwrap();

    let first = engine
        .execute_tasks_at("alex", &TemplateResponder, now + Duration::seconds(900))
        .unwrap();
    assert_eq!(first.gate, ExecutionGate::Open);
    assert!(!first.executed.is_empty());

    // Replan right away; the fresh stress task must wait out the cooldown
    engine
        .plan_next_actions_at("alex", now + Duration::seconds(905))
        .unwrap();
    let gated = engine
        .execute_tasks_at("alex", &TemplateResponder, now + Duration::seconds(930))
        .unwrap();
    assert_eq!(gated.gate, ExecutionGate::CooldownActive);
    assert!(gated.executed.is_empty());
    assert!(gated.remaining_queued >= 1);

    let status = engine
        .status_at("alex", now + Duration::seconds(930))
        .unwrap();
    assert!(status.cooldown_remaining_secs > 0);
    assert!(status.cooldown_remaining_secs <= 300);
}

#[test]
fn calm_user_plans_little_or_nothing_urgent() {
    let manager = TestStoreManager::new_temp();
    ExperienceFactory::seed(
        manager.store().as_ref(),
        ExperienceFactory::balanced_week("alex"),
    );

    let engine = ProactiveEngine::new(manager.store());
    let report = engine.plan_next_actions("alex").unwrap();

    // No stress prediction fires; whatever is planned is not urgent
    assert_eq!(report.elevated_queued, 0);
}

//! Proactive task model
//!
//! Tasks are derived from predicted needs, carry an execution window,
//! and move through a small state machine: scheduled -> executing ->
//! completed or failed. Terminal tasks leave the queue and enter
//! history; there is no retry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::patterns::{NeedKind, PredictedNeed};

// ============================================================================
// PRIORITY AND STATUS
// ============================================================================

/// Task priority ladder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Needs that escalate straight to urgent regardless of confidence
const URGENT_NEEDS: [NeedKind; 3] = [
    NeedKind::StressManagementSupport,
    NeedKind::ImmediateStressRelief,
    NeedKind::UrgentAssistance,
];

impl TaskPriority {
    /// Priority from prediction confidence and need identity
    pub fn for_need(confidence: f64, need: NeedKind) -> Self {
        if confidence > 0.9 || URGENT_NEEDS.contains(&need) {
            TaskPriority::Urgent
        } else if confidence > 0.8 {
            TaskPriority::High
        } else if confidence > 0.7 {
            TaskPriority::Medium
        } else {
            TaskPriority::Low
        }
    }

    /// Numeric weight for sorting
    pub fn score(&self) -> u8 {
        match self {
            TaskPriority::Urgent => 4,
            TaskPriority::High => 3,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Urgent => "urgent",
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, TaskPriority::Urgent | TaskPriority::High)
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Scheduled,
    Executing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Terminal statuses never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::Executing => "executing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// EXECUTION WINDOW
// ============================================================================

const IMMEDIATE_NEEDS: [NeedKind; 2] =
    [NeedKind::ImmediateStressRelief, NeedKind::UrgentAssistance];

const HIGH_IMPACT_NEEDS: [NeedKind; 2] = [
    NeedKind::StressManagementSupport,
    NeedKind::ProductivityOptimization,
];

/// Time window within which a task may execute
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExecutionWindow {
    /// Window ladder by need class: immediate needs run right away,
    /// high-impact needs after a short lead, everything else later.
    pub fn for_need(need: NeedKind, now: DateTime<Utc>) -> Self {
        if IMMEDIATE_NEEDS.contains(&need) {
            Self {
                start: now,
                end: now + Duration::seconds(300),
            }
        } else if HIGH_IMPACT_NEEDS.contains(&need) {
            Self {
                start: now + Duration::seconds(600),
                end: now + Duration::seconds(1800),
            }
        } else {
            Self {
                start: now + Duration::seconds(1800),
                end: now + Duration::seconds(3600),
            }
        }
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> bool {
        self.end <= now
    }
}

// ============================================================================
// TASK
// ============================================================================

/// Result reported by a task executor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    /// What the executor did
    pub summary: String,
    /// Realized impact estimate in [0,1]
    pub impact_score: f64,
}

/// One planned proactive intervention
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveTask {
    /// Unique identifier (UUID v4)
    pub id: String,
    pub category: NeedKind,
    /// Prediction confidence that produced the task
    pub confidence: f64,
    pub priority: TaskPriority,
    pub description: String,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,
    /// Expected positive impact in [0,1]
    pub estimated_impact: f64,
    pub window: ExecutionWindow,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TaskOutcome>,
}

impl ProactiveTask {
    /// Build a task from a predicted need
    pub fn from_prediction(prediction: &PredictedNeed, now: DateTime<Utc>) -> Self {
        let need = prediction.predicted_need;
        let confidence = prediction.confidence;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category: need,
            confidence,
            priority: TaskPriority::for_need(confidence, need),
            description: task_description(need, confidence),
            reasoning: prediction.reasoning.clone(),
            suggested_actions: prediction.suggested_actions.clone(),
            estimated_impact: estimate_impact(need, confidence),
            window: ExecutionWindow::for_need(need, now),
            status: TaskStatus::Scheduled,
            created_at: now,
            executed_at: None,
            outcome: None,
        }
    }

    /// Fallback task synthesized from pattern analysis alone
    pub fn general_support(confidence: f64, reasoning: &str, now: DateTime<Utc>) -> Self {
        let need = NeedKind::GeneralSupport;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category: need,
            confidence,
            priority: TaskPriority::Medium,
            description: "Provide general assistance based on detected patterns".to_string(),
            reasoning: reasoning.to_string(),
            suggested_actions: Vec::new(),
            estimated_impact: estimate_impact(need, confidence),
            window: ExecutionWindow::for_need(need, now),
            status: TaskStatus::Scheduled,
            created_at: now,
            executed_at: None,
            outcome: None,
        }
    }

    /// Whether the task can start now: scheduled and inside its window
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Scheduled && self.window.contains(now)
    }
}

/// Human-readable task description per need
fn task_description(need: NeedKind, confidence: f64) -> String {
    let percent = confidence * 100.0;
    match need {
        NeedKind::StressManagementSupport => {
            format!("Provide stress management assistance (confidence: {percent:.1}%)")
        }
        NeedKind::AssistanceWithWork => {
            format!("Offer work-related productivity support (confidence: {percent:.1}%)")
        }
        NeedKind::LearningSupport => {
            format!("Provide learning optimization guidance (confidence: {percent:.1}%)")
        }
        NeedKind::ProductivityOptimization => {
            format!("Suggest productivity improvements (confidence: {percent:.1}%)")
        }
        NeedKind::EmotionalSupport => {
            format!("Offer emotional wellness support (confidence: {percent:.1}%)")
        }
        other => format!(
            "Provide proactive assistance with {} (confidence: {percent:.1}%)",
            other.label()
        ),
    }
}

/// Expected impact per need, scaled by confidence
fn estimate_impact(need: NeedKind, confidence: f64) -> f64 {
    let base = match need {
        NeedKind::ImmediateStressRelief => 0.95,
        NeedKind::StressManagementSupport => 0.9,
        NeedKind::AssistanceWithWork => 0.85,
        NeedKind::ProductivityOptimization => 0.8,
        NeedKind::LearningSupport => 0.7,
        _ => 0.6,
    };
    (base * confidence).min(1.0)
}

// ============================================================================
// TASK QUEUE
// ============================================================================

/// What happened during a merge of planned candidates into the queue
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Candidates that entered the queue
    pub added: usize,
    /// Candidates dropped because their category was already queued
    pub duplicates_dropped: usize,
    /// Queued tasks dropped because their window had elapsed
    pub expired_dropped: usize,
}

/// Per-user queue of scheduled and executing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: Vec<ProactiveTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge planned candidates into the queue
    ///
    /// Expired tasks are dropped first, then candidates are appended with
    /// per-category dedup where the first-seen task wins. Tasks already
    /// queued therefore beat equivalent new candidates.
    pub fn merge(&mut self, candidates: Vec<ProactiveTask>, now: DateTime<Utc>) -> MergeReport {
        let mut report = MergeReport::default();

        let before = self.tasks.len();
        self.tasks
            .retain(|t| t.status == TaskStatus::Executing || !t.window.elapsed(now));
        report.expired_dropped = before - self.tasks.len();

        for candidate in candidates {
            if candidate.window.elapsed(now) {
                report.expired_dropped += 1;
                continue;
            }
            if self.tasks.iter().any(|t| t.category == candidate.category) {
                report.duplicates_dropped += 1;
                continue;
            }
            self.tasks.push(candidate);
            report.added += 1;
        }
        report
    }

    /// Ids of scheduled tasks whose window contains `now`
    pub fn ready_ids(&self, now: DateTime<Utc>) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.is_ready(now))
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ProactiveTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Remove a task by id, returning it
    pub fn remove(&mut self, id: &str) -> Option<ProactiveTask> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn executing_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Executing)
            .count()
    }

    pub fn elevated_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.priority.is_elevated())
            .count()
    }

    pub fn tasks(&self) -> &[ProactiveTask] {
        &self.tasks
    }
}

// ============================================================================
// EXECUTOR SEAM
// ============================================================================

/// Executor failure reported back to the engine
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    /// The executor could not complete the task
    #[error("Task execution failed: {0}")]
    Failed(String),
}

/// External task executor capability
///
/// One method for every executor variant; the engine marks the task
/// completed or failed from the returned result.
pub trait Respondable: Send + Sync {
    fn respond(&self, task: &ProactiveTask) -> std::result::Result<TaskOutcome, ResponderError>;
}

/// Default executor that renders a canned response per need category
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResponder;

impl Respondable for TemplateResponder {
    fn respond(&self, task: &ProactiveTask) -> std::result::Result<TaskOutcome, ResponderError> {
        let summary = match task.category {
            NeedKind::StressManagementSupport => {
                "Stress management resources prepared and delivered".to_string()
            }
            NeedKind::ProductivityOptimization => {
                "Productivity suggestions generated and queued".to_string()
            }
            NeedKind::LearningSupport => "Learning optimization tips prepared".to_string(),
            NeedKind::ImmediateStressRelief => {
                "Quick stress relief technique provided".to_string()
            }
            other => format!("Proactive assistance for {} prepared", other.label()),
        };
        Ok(TaskOutcome {
            summary,
            impact_score: task.estimated_impact,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(need: NeedKind, confidence: f64) -> PredictedNeed {
        PredictedNeed {
            predicted_need: need,
            confidence,
            reasoning: "test".to_string(),
            suggested_actions: vec!["act".to_string()],
        }
    }

    #[test]
    fn test_priority_ladder() {
        assert_eq!(
            TaskPriority::for_need(0.95, NeedKind::LearningSupport),
            TaskPriority::Urgent
        );
        assert_eq!(
            TaskPriority::for_need(0.6, NeedKind::StressManagementSupport),
            TaskPriority::Urgent
        );
        assert_eq!(
            TaskPriority::for_need(0.85, NeedKind::LearningSupport),
            TaskPriority::High
        );
        assert_eq!(
            TaskPriority::for_need(0.75, NeedKind::LearningSupport),
            TaskPriority::Medium
        );
        assert_eq!(
            TaskPriority::for_need(0.6, NeedKind::LearningSupport),
            TaskPriority::Low
        );
        assert!(TaskPriority::Urgent > TaskPriority::High);
    }

    #[test]
    fn test_window_ladder() {
        let now = Utc::now();

        let immediate = ExecutionWindow::for_need(NeedKind::ImmediateStressRelief, now);
        assert_eq!(immediate.start, now);
        assert_eq!(immediate.end, now + Duration::seconds(300));
        assert!(immediate.contains(now));

        let high_impact = ExecutionWindow::for_need(NeedKind::StressManagementSupport, now);
        assert_eq!(high_impact.start, now + Duration::seconds(600));
        assert_eq!(high_impact.end, now + Duration::seconds(1800));
        assert!(!high_impact.contains(now));
        assert!(high_impact.contains(now + Duration::seconds(900)));

        let general = ExecutionWindow::for_need(NeedKind::GeneralSupport, now);
        assert_eq!(general.start, now + Duration::seconds(1800));
        assert_eq!(general.end, now + Duration::seconds(3600));
    }

    #[test]
    fn test_task_from_prediction() {
        let now = Utc::now();
        let task =
            ProactiveTask::from_prediction(&prediction(NeedKind::StressManagementSupport, 0.85), now);
        assert_eq!(task.priority, TaskPriority::Urgent);
        assert_eq!(task.status, TaskStatus::Scheduled);
        assert!(task.description.contains("confidence: 85.0%"));
        assert!((task.estimated_impact - 0.9 * 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_merge_dedups_by_category() {
        let now = Utc::now();
        let mut queue = TaskQueue::new();

        let first = ProactiveTask::from_prediction(&prediction(NeedKind::LearningSupport, 0.7), now);
        let first_id = first.id.clone();
        let report = queue.merge(vec![first], now);
        assert_eq!(report.added, 1);

        let duplicate =
            ProactiveTask::from_prediction(&prediction(NeedKind::LearningSupport, 0.9), now);
        let report = queue.merge(vec![duplicate], now);
        assert_eq!(report.added, 0);
        assert_eq!(report.duplicates_dropped, 1);
        // first-seen task survives
        assert_eq!(queue.tasks()[0].id, first_id);
    }

    #[test]
    fn test_merge_drops_expired() {
        let now = Utc::now();
        let mut queue = TaskQueue::new();

        let stale =
            ProactiveTask::from_prediction(&prediction(NeedKind::GeneralSupport, 0.6), now);
        queue.merge(vec![stale], now);
        assert_eq!(queue.len(), 1);

        // Two hours later the general window has elapsed
        let later = now + Duration::hours(2);
        let report = queue.merge(Vec::new(), later);
        assert_eq!(report.expired_dropped, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ready_excludes_out_of_window() {
        let now = Utc::now();
        let mut queue = TaskQueue::new();
        queue.merge(
            vec![
                ProactiveTask::from_prediction(&prediction(NeedKind::UrgentAssistance, 0.9), now),
                ProactiveTask::from_prediction(&prediction(NeedKind::GeneralSupport, 0.6), now),
            ],
            now,
        );

        let ready = queue.ready_ids(now);
        assert_eq!(ready.len(), 1);
        assert_eq!(queue.get_mut(&ready[0]).unwrap().category, NeedKind::UrgentAssistance);
    }

    #[test]
    fn test_template_responder() {
        let now = Utc::now();
        let task =
            ProactiveTask::from_prediction(&prediction(NeedKind::ImmediateStressRelief, 0.9), now);
        let outcome = TemplateResponder.respond(&task).unwrap();
        assert_eq!(outcome.summary, "Quick stress relief technique provided");
        assert!((outcome.impact_score - task.estimated_impact).abs() < 1e-9);
    }

    #[test]
    fn test_status_terminality() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Scheduled.is_terminal());
        assert!(!TaskStatus::Executing.is_terminal());
    }
}

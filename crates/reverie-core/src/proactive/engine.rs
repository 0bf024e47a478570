//! # Proactive Intelligence Engine
//!
//! Turns predicted needs into queued interventions and drives their
//! execution through an external [`Respondable`] executor. Planning is a
//! pure step over forecast data; a separate merge step folds candidates
//! into the per-user queue. Execution is gated by a cooldown measured
//! from the last completed intervention and by an in-flight cap.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use super::task::{
    MergeReport, ProactiveTask, Respondable, TaskOutcome, TaskQueue, TaskStatus,
};
use crate::classify::Classifier;
use crate::consolidation::{ConsolidationEngine, ConsolidationError};
use crate::patterns::{NeedForecast, PatternEngine, PatternError};
use crate::storage::ExperienceStore;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Proactive engine error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ProactiveError {
    /// Pattern analysis failure
    #[error("Pattern analysis error: {0}")]
    Pattern(#[from] PatternError),
    /// Consolidation failure
    #[error("Consolidation error: {0}")]
    Consolidation(#[from] ConsolidationError),
    /// Lock poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Proactive engine result type
pub type Result<T> = std::result::Result<T, ProactiveError>;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tunables for planning and intervention gating
#[derive(Debug, Clone)]
pub struct ProactiveConfig {
    /// Minimum prediction confidence for task creation
    pub task_threshold: f64,
    /// Analysis confidence above which a fallback task is synthesized
    pub pattern_fallback_threshold: f64,
    /// Tasks executed per call
    pub execute_limit: usize,
    /// Seconds between intervention completions
    pub intervention_cooldown_secs: i64,
    /// Maximum simultaneously executing interventions
    pub max_concurrent_interventions: usize,
    /// Terminal tasks kept per user
    pub history_capacity: usize,
}

impl Default for ProactiveConfig {
    fn default() -> Self {
        Self {
            task_threshold: 0.5,
            pattern_fallback_threshold: 0.5,
            execute_limit: 5,
            intervention_cooldown_secs: 300,
            max_concurrent_interventions: 3,
            history_capacity: 100,
        }
    }
}

impl ProactiveConfig {
    pub fn with_task_threshold(mut self, threshold: f64) -> Self {
        self.task_threshold = threshold;
        self
    }

    pub fn with_cooldown_secs(mut self, secs: i64) -> Self {
        self.intervention_cooldown_secs = secs;
        self
    }

    pub fn with_execute_limit(mut self, limit: usize) -> Self {
        self.execute_limit = limit;
        self
    }
}

// ============================================================================
// REPORT TYPES
// ============================================================================

/// Result of one planning pass
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    /// Candidate tasks produced this pass
    pub candidates_planned: usize,
    /// What the queue merge did with them
    pub merge: MergeReport,
    pub total_queued: usize,
    /// Queued tasks at urgent or high priority
    pub elevated_queued: usize,
    /// Mean task confidence with a high-confidence boost, in [0,1]
    pub planning_confidence: f64,
    /// Stored consolidations observed during planning
    pub consolidated_patterns: usize,
    pub generated_at: DateTime<Utc>,
}

/// Why an execute call ran no tasks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionGate {
    /// Tasks were eligible and execution proceeded
    Open,
    /// Cooldown since the last completion has not elapsed
    CooldownActive,
    /// The executing set is at capacity
    AtCapacity,
}

/// Result of one execute call
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteReport {
    pub gate: ExecutionGate,
    /// Terminal tasks produced by this call
    pub executed: Vec<ProactiveTask>,
    pub remaining_queued: usize,
}

/// Point-in-time snapshot of one user's proactive state
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveStatus {
    pub queued_tasks: usize,
    pub executing_tasks: usize,
    pub ready_for_execution: usize,
    pub elevated_tasks: usize,
    pub history_count: usize,
    /// Completed over terminal; 1.0 with no history
    pub success_rate: f64,
    /// Seconds until the cooldown gate opens, zero when open
    pub cooldown_remaining_secs: i64,
    pub last_plan_confidence: f64,
}

// ============================================================================
// PLANNING (PURE)
// ============================================================================

/// Convert forecast predictions into candidate tasks
///
/// Predictions below the threshold are dropped. When nothing clears it
/// but the overall analysis confidence is strong, one general-support
/// fallback task is synthesized so strong patterns still get attention.
pub fn plan_candidates(
    forecast: &NeedForecast,
    analysis_confidence: f64,
    config: &ProactiveConfig,
    now: DateTime<Utc>,
) -> Vec<ProactiveTask> {
    let mut tasks: Vec<ProactiveTask> = forecast
        .predictions
        .iter()
        .filter(|p| p.confidence >= config.task_threshold)
        .map(|p| ProactiveTask::from_prediction(p, now))
        .collect();

    if tasks.is_empty() && analysis_confidence > config.pattern_fallback_threshold {
        tasks.push(ProactiveTask::general_support(
            analysis_confidence,
            "Strong patterns detected, offering general support",
            now,
        ));
    }
    tasks
}

/// Overall plan confidence: mean task confidence boosted by the share of
/// high-confidence tasks, clamped to [0,1]
pub fn plan_confidence(tasks: &[ProactiveTask]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let mean = tasks.iter().map(|t| t.confidence).sum::<f64>() / tasks.len() as f64;
    let high_share =
        tasks.iter().filter(|t| t.confidence > 0.8).count() as f64 / tasks.len() as f64;
    (mean + f64::min(0.2, high_share * 0.2)).min(1.0)
}

// ============================================================================
// PROACTIVE ENGINE
// ============================================================================

#[derive(Default)]
struct UserState {
    queue: TaskQueue,
    history: VecDeque<ProactiveTask>,
    last_completion: Option<DateTime<Utc>>,
    last_plan_confidence: f64,
}

/// Planning and execution of proactive interventions
pub struct ProactiveEngine {
    patterns: PatternEngine,
    consolidation: ConsolidationEngine,
    config: ProactiveConfig,
    state: Arc<RwLock<HashMap<String, UserState>>>,
}

impl ProactiveEngine {
    pub fn new(store: Arc<dyn ExperienceStore>) -> Self {
        Self {
            patterns: PatternEngine::new(Arc::clone(&store)),
            consolidation: ConsolidationEngine::new(store),
            config: ProactiveConfig::default(),
            state: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_config(mut self, config: ProactiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a classifier to both upstream engines
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.patterns = self.patterns.with_classifier(Arc::clone(&classifier));
        self.consolidation = self.consolidation.with_classifier(classifier);
        self
    }

    /// Replace the upstream engines wholesale
    pub fn with_engines(mut self, patterns: PatternEngine, consolidation: ConsolidationEngine) -> Self {
        self.patterns = patterns;
        self.consolidation = consolidation;
        self
    }

    /// Analyze, predict, and fold new candidate tasks into the queue
    pub fn plan_next_actions(&self, user_id: &str) -> Result<PlanReport> {
        self.plan_next_actions_at(user_id, Utc::now())
    }

    /// Planning with an explicit clock
    pub fn plan_next_actions_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<PlanReport> {
        let analysis = self.patterns.analyze(user_id)?;
        let consolidated = self.consolidation.consolidated_insights(user_id)?;
        let forecast = self.patterns.predict_needs(user_id)?;

        let candidates = plan_candidates(&forecast, analysis.confidence, &self.config, now);
        let confidence = plan_confidence(&candidates);

        let mut state = self.lock_write()?;
        let user = state.entry(user_id.to_string()).or_default();
        let merge = user.queue.merge(candidates.clone(), now);
        user.last_plan_confidence = confidence;

        let report = PlanReport {
            candidates_planned: candidates.len(),
            merge,
            total_queued: user.queue.len(),
            elevated_queued: user.queue.elevated_count(),
            planning_confidence: confidence,
            consolidated_patterns: consolidated.len(),
            generated_at: now,
        };

        tracing::info!(
            user_id = %user_id,
            planned = report.candidates_planned,
            queued = report.total_queued,
            confidence = confidence,
            "Proactive plan complete"
        );
        Ok(report)
    }

    /// Execute ready tasks through the given executor
    pub fn execute_tasks(
        &self,
        user_id: &str,
        responder: &dyn Respondable,
    ) -> Result<ExecuteReport> {
        self.execute_tasks_at(user_id, responder, Utc::now())
    }

    /// Execution with an explicit clock
    ///
    /// When the cooldown gate is closed or the executing set is full,
    /// nothing runs and queued tasks stay scheduled. Otherwise up to the
    /// configured limit of in-window tasks run to a terminal state.
    pub fn execute_tasks_at(
        &self,
        user_id: &str,
        responder: &dyn Respondable,
        now: DateTime<Utc>,
    ) -> Result<ExecuteReport> {
        let mut state = self.lock_write()?;
        let user = state.entry(user_id.to_string()).or_default();

        if let Some(last) = user.last_completion {
            let cooldown = Duration::seconds(self.config.intervention_cooldown_secs);
            if now - last < cooldown {
                tracing::debug!(user_id = %user_id, "Intervention cooldown active");
                return Ok(ExecuteReport {
                    gate: ExecutionGate::CooldownActive,
                    executed: Vec::new(),
                    remaining_queued: user.queue.len(),
                });
            }
        }

        let capacity = self
            .config
            .max_concurrent_interventions
            .saturating_sub(user.queue.executing_count());
        if capacity == 0 {
            tracing::debug!(user_id = %user_id, "Executing set at capacity");
            return Ok(ExecuteReport {
                gate: ExecutionGate::AtCapacity,
                executed: Vec::new(),
                remaining_queued: user.queue.len(),
            });
        }

        let batch = self.config.execute_limit.min(capacity);
        let ready: Vec<String> = user.queue.ready_ids(now).into_iter().take(batch).collect();

        let mut executed = Vec::with_capacity(ready.len());
        for id in ready {
            let Some(task) = user.queue.get_mut(&id) else {
                continue;
            };
            task.status = TaskStatus::Executing;

            let (status, outcome) = match responder.respond(task) {
                Ok(outcome) => (TaskStatus::Completed, Some(outcome)),
                Err(error) => {
                    tracing::warn!(task_id = %id, error = %error, "Intervention failed");
                    (
                        TaskStatus::Failed,
                        Some(TaskOutcome {
                            summary: error.to_string(),
                            impact_score: 0.0,
                        }),
                    )
                }
            };

            let mut task = match user.queue.remove(&id) {
                Some(task) => task,
                None => continue,
            };
            task.status = status;
            task.executed_at = Some(now);
            task.outcome = outcome;
            user.last_completion = Some(now);

            if user.history.len() >= self.config.history_capacity {
                user.history.pop_front();
            }
            user.history.push_back(task.clone());
            executed.push(task);
        }

        tracing::info!(
            user_id = %user_id,
            executed = executed.len(),
            remaining = user.queue.len(),
            "Intervention batch complete"
        );
        Ok(ExecuteReport {
            gate: ExecutionGate::Open,
            executed,
            remaining_queued: user.queue.len(),
        })
    }

    /// Snapshot of queue, history, and gating state for one user
    pub fn status(&self, user_id: &str) -> Result<ProactiveStatus> {
        self.status_at(user_id, Utc::now())
    }

    /// Status with an explicit clock
    pub fn status_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<ProactiveStatus> {
        let state = self
            .state
            .read()
            .map_err(|_| ProactiveError::LockPoisoned("proactive state".to_string()))?;

        let Some(user) = state.get(user_id) else {
            return Ok(ProactiveStatus {
                queued_tasks: 0,
                executing_tasks: 0,
                ready_for_execution: 0,
                elevated_tasks: 0,
                history_count: 0,
                success_rate: 1.0,
                cooldown_remaining_secs: 0,
                last_plan_confidence: 0.0,
            });
        };

        let terminal = user.history.len();
        let completed = user
            .history
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let success_rate = if terminal == 0 {
            1.0
        } else {
            completed as f64 / terminal as f64
        };

        let cooldown_remaining_secs = user
            .last_completion
            .map(|last| {
                let open = last + Duration::seconds(self.config.intervention_cooldown_secs);
                (open - now).num_seconds().max(0)
            })
            .unwrap_or(0);

        Ok(ProactiveStatus {
            queued_tasks: user.queue.len(),
            executing_tasks: user.queue.executing_count(),
            ready_for_execution: user.queue.ready_ids(now).len(),
            elevated_tasks: user.queue.elevated_count(),
            history_count: terminal,
            success_rate,
            cooldown_remaining_secs,
            last_plan_confidence: user.last_plan_confidence,
        })
    }

    fn lock_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, UserState>>> {
        self.state
            .write()
            .map_err(|_| ProactiveError::LockPoisoned("proactive state".to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! # Proactive Intelligence
//!
//! Anticipatory task planning and execution. [`task`] carries the task
//! model, queue, and executor seam; [`engine`] plans from forecasts and
//! drives interventions under cooldown and concurrency gates.

mod engine;
mod task;

pub use engine::{
    plan_candidates, plan_confidence, ExecuteReport, ExecutionGate, PlanReport, ProactiveConfig,
    ProactiveEngine, ProactiveError, ProactiveStatus, Result,
};
pub use task::{
    ExecutionWindow, MergeReport, ProactiveTask, Respondable, ResponderError, TaskOutcome,
    TaskPriority, TaskQueue, TaskStatus, TemplateResponder,
};

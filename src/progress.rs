//! Progress Reporting
//!
//! Best-effort progress notifications at orchestration phase transitions.
//! Sinks receive structured JSON payloads; a sink that fails must swallow
//! its own errors, and the orchestrator never awaits delivery guarantees.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Orchestration stages reported to progress sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planning,
    Executing,
    Aggregating,
    Completed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Planning => write!(f, "planning"),
            Stage::Executing => write!(f, "executing"),
            Stage::Aggregating => write!(f, "aggregating"),
            Stage::Completed => write!(f, "completed"),
        }
    }
}

/// Receiver for orchestration progress updates.
///
/// Implementations must absorb their own delivery failures; `update` has no
/// error channel on purpose.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Deliver one progress update for the given task.
    async fn update(&self, task_id: &str, stage: Stage, payload: Value);
}

/// Sink that discards every update. The default when no sink is attached.
pub struct NullProgressSink;

#[async_trait]
impl ProgressSink for NullProgressSink {
    async fn update(&self, _task_id: &str, _stage: Stage, _payload: Value) {}
}

/// Sink that emits each update as a structured log event.
pub struct LoggingProgressSink;

#[async_trait]
impl ProgressSink for LoggingProgressSink {
    async fn update(&self, task_id: &str, stage: Stage, payload: Value) {
        info!(task_id, stage = %stage, %payload, "progress");
    }
}

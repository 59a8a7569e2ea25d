//! Review Orchestrator - Analysis Coordination Library
//!
//! Orchestration core for AI-assisted code review. Given a project snapshot
//! and a registry of analysis capabilities, it:
//! - plans which capabilities to run, scored against project characteristics
//!   and past performance
//! - resolves prerequisite ordering and executes under a sequential,
//!   parallel, or priority-based strategy
//! - aggregates results (dedup, correlation, prioritization)
//! - records each run to bias future planning

pub mod aggregator;
pub mod config;
pub mod executor;
pub mod learning;
pub mod plan;
pub mod planner;
pub mod progress;
pub mod resolver;

mod orchestrator;

pub use aggregator::ResultAggregator;
pub use config::OrchestratorConfig;
pub use executor::CoordinatedExecutor;
pub use learning::{
    ExecutionHistoryRecord, LearningStore, OrchestrationInsights, ResultSummary,
};
pub use orchestrator::Orchestrator;
pub use plan::{
    ExecutionPlan, ExecutionStrategy, Priority, ResourceRequirements, SelectedCapability,
};
pub use planner::{ExecutionPlanner, UserPreferences};
pub use progress::{LoggingProgressSink, NullProgressSink, ProgressSink, Stage};

// Re-export the foundation crates so downstream users need only one import.
pub use review_catalog::{
    CapabilityCatalog, CapabilityDescriptor, Category, LanguageSupport, ResourceLevel,
};
pub use review_core::{
    AnalysisContext, AnalysisResult, AnalysisStatus, Capability, CapabilityDefinition,
    CapabilityInvoke, CapabilityKind, CapabilityRegistry, Finding, OrchestrationMetrics,
    ProjectCharacteristics, ProjectInfo, ReviewError, ReviewResult, Severity,
};

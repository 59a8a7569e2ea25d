//! Orchestration Facade
//!
//! Ties the planner, executor, aggregator, and learning store together into
//! one entry point per analysis run:
//!
//! 1. derive project characteristics and create a plan (errors propagate)
//! 2. validate the plan against the runtime registry
//! 3. execute under the plan's strategy (capability failures absorbed)
//! 4. aggregate and compute run metrics
//! 5. record the run in the learning store
//!
//! Progress sinks are notified at each phase transition, best effort.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use serde_json::json;
use tracing::info;

use review_catalog::CapabilityCatalog;
use review_core::{
    AnalysisContext, AnalysisResult, CapabilityRegistry, OrchestrationMetrics,
    ProjectCharacteristics, ReviewError, ReviewResult,
};

use crate::aggregator::ResultAggregator;
use crate::config::OrchestratorConfig;
use crate::executor::CoordinatedExecutor;
use crate::learning::{ExecutionHistoryRecord, LearningStore, OrchestrationInsights};
use crate::plan::ExecutionStrategy;
use crate::planner::{ExecutionPlanner, UserPreferences};
use crate::progress::{NullProgressSink, ProgressSink, Stage};

/// Coordinates one analysis run end to end.
pub struct Orchestrator {
    registry: Arc<CapabilityRegistry>,
    planner: ExecutionPlanner,
    executor: CoordinatedExecutor,
    aggregator: ResultAggregator,
    catalog: Arc<CapabilityCatalog>,
    learning: Arc<Mutex<LearningStore>>,
    progress: Arc<dyn ProgressSink>,
}

impl Orchestrator {
    /// Create an orchestrator over the built-in catalog with default
    /// configuration.
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self::with_catalog(registry, Arc::new(CapabilityCatalog::builtin()))
    }

    /// Create an orchestrator over a custom catalog.
    pub fn with_catalog(
        registry: Arc<CapabilityRegistry>,
        catalog: Arc<CapabilityCatalog>,
    ) -> Self {
        let config = OrchestratorConfig::default();
        let learning = Arc::new(Mutex::new(LearningStore::new(
            config.history_capacity,
            config.performance_window,
        )));
        Self {
            registry,
            planner: ExecutionPlanner::new(catalog.clone()).with_config(config.clone()),
            executor: CoordinatedExecutor::new(catalog.clone()).with_learning(learning.clone()),
            aggregator: ResultAggregator::new(catalog.clone()),
            learning,
            progress: Arc::new(NullProgressSink),
            catalog,
        }
    }

    /// Replace the configuration. Fails on invalid tunables.
    pub fn with_config(mut self, config: OrchestratorConfig) -> ReviewResult<Self> {
        let config = config.validated()?;
        self.planner = ExecutionPlanner::new(self.catalog.clone()).with_config(config.clone());
        self.learning = Arc::new(Mutex::new(LearningStore::new(
            config.history_capacity,
            config.performance_window,
        )));
        self.executor = CoordinatedExecutor::new(self.catalog.clone())
            .with_learning(self.learning.clone())
            .with_progress_sink(self.progress.clone());
        Ok(self)
    }

    /// Attach a progress sink, shared with the executor for per-level
    /// updates.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.executor = CoordinatedExecutor::new(self.catalog.clone())
            .with_learning(self.learning.clone())
            .with_progress_sink(sink.clone());
        self.progress = sink;
        self
    }

    /// Run one orchestrated analysis.
    ///
    /// Capability failures are absorbed during execution; only planning,
    /// validation, and internal errors escape as `Err`.
    pub async fn orchestrate(
        &self,
        ctx: &AnalysisContext,
        strategy: ExecutionStrategy,
        preferences: Option<&UserPreferences>,
    ) -> ReviewResult<(Vec<AnalysisResult>, OrchestrationMetrics)> {
        let started = Instant::now();
        let characteristics = ProjectCharacteristics::from_project_info(&ctx.project_info);

        let plan = {
            let learning = self.lock_learning()?;
            self.planner
                .create_plan(&characteristics, strategy, preferences, &learning)?
        };
        self.planner.validate_against_registry(&plan, &self.registry)?;

        self.progress
            .update(
                &ctx.task_id,
                Stage::Planning,
                json!({
                    "capabilities": plan.total_capabilities(),
                    "strategy": plan.execution_strategy.to_string(),
                    "estimated_duration_secs": plan.estimated_duration_secs,
                }),
            )
            .await;

        self.progress
            .update(&ctx.task_id, Stage::Executing, json!({}))
            .await;
        // The executor appends per-invocation performance samples to the
        // shared learning store as it goes.
        let results = self.executor.execute(&plan, &self.registry, ctx).await;

        let planned = plan.total_capabilities();
        let completed = results.iter().filter(|r| r.status.is_success()).count();

        self.progress
            .update(
                &ctx.task_id,
                Stage::Aggregating,
                json!({ "raw_results": results.len() }),
            )
            .await;
        let aggregated = self.aggregator.aggregate(results);

        let metrics = self.compute_metrics(started, planned, completed, &aggregated);

        {
            let mut learning = self.lock_learning()?;
            learning.record_run(ExecutionHistoryRecord::from_run(
                &ctx.task_id,
                &characteristics,
                &plan,
                &aggregated,
                &metrics,
            ));
        }

        self.progress
            .update(
                &ctx.task_id,
                Stage::Completed,
                json!({
                    "results": aggregated.len(),
                    "execution_time": metrics.execution_time,
                }),
            )
            .await;

        info!(
            task_id = %ctx.task_id,
            results = aggregated.len(),
            success_rate = metrics.tool_success_rate,
            coverage = metrics.coverage_score,
            "orchestration finished"
        );

        Ok((aggregated, metrics))
    }

    /// Aggregate insights over the recorded history.
    pub fn insights(&self) -> ReviewResult<OrchestrationInsights> {
        Ok(self.lock_learning()?.insights())
    }

    fn compute_metrics(
        &self,
        started: Instant,
        planned: usize,
        completed: usize,
        aggregated: &[AnalysisResult],
    ) -> OrchestrationMetrics {
        let tool_success_rate = if planned == 0 {
            0.0
        } else {
            completed as f64 / planned as f64
        };

        let finding_quality_score = if aggregated.is_empty() {
            0.0
        } else {
            aggregated.iter().map(|r| r.confidence_score).sum::<f64>() / aggregated.len() as f64
        };

        let categories: std::collections::HashSet<_> = aggregated
            .iter()
            .filter_map(|r| self.catalog.category_of(&r.capability))
            .collect();
        let coverage_score = if self.catalog.category_count() == 0 {
            0.0
        } else {
            categories.len() as f64 / self.catalog.category_count() as f64
        };

        OrchestrationMetrics {
            execution_time: started.elapsed().as_secs_f64(),
            tool_success_rate,
            finding_quality_score,
            coverage_score,
        }
    }

    fn lock_learning(&self) -> ReviewResult<MutexGuard<'_, LearningStore>> {
        self.learning
            .lock()
            .map_err(|_| ReviewError::internal("learning store lock poisoned"))
    }
}

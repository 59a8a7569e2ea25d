//! Coordinated Executor
//!
//! Runs a plan's capabilities against the registry under the plan's
//! execution strategy:
//!
//! - sequential: one at a time, in dependency order
//! - parallel: dependency levels, one `join_all` per level
//! - priority-based: high-priority capabilities first, one at a time, then
//!   the remainder concurrently
//!
//! A capability returning `Err` is logged and excluded from the result set;
//! one bad capability never aborts the run. Successful invocations append a
//! performance sample (confidence when completed, zero otherwise) to the
//! attached learning store, and an attached progress sink is notified per
//! phase and per dependency level, best effort.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_util::future::join_all;
use serde_json::json;
use tracing::{debug, error, info};

use review_catalog::CapabilityCatalog;
use review_core::{AnalysisContext, AnalysisResult, CapabilityRegistry};

use crate::learning::LearningStore;
use crate::plan::{ExecutionPlan, ExecutionStrategy, SelectedCapability};
use crate::progress::{NullProgressSink, ProgressSink, Stage};
use crate::resolver::{resolve_into_levels, topological_sort};

/// Executes planned capabilities under the plan's strategy.
pub struct CoordinatedExecutor {
    catalog: Arc<CapabilityCatalog>,
    learning: Option<Arc<Mutex<LearningStore>>>,
    progress: Arc<dyn ProgressSink>,
}

impl CoordinatedExecutor {
    /// Create an executor over the given catalog (used for dependency
    /// resolution at run time).
    pub fn new(catalog: Arc<CapabilityCatalog>) -> Self {
        Self {
            catalog,
            learning: None,
            progress: Arc::new(NullProgressSink),
        }
    }

    /// Attach a learning store; each successful invocation appends a
    /// performance sample to it.
    pub fn with_learning(mut self, learning: Arc<Mutex<LearningStore>>) -> Self {
        self.learning = Some(learning);
        self
    }

    /// Attach a progress sink for per-phase/per-level updates.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Execute every capability in the plan and return the results that
    /// materialized, in execution order. Invocation errors are absorbed:
    /// logged, excluded, never propagated.
    pub async fn execute(
        &self,
        plan: &ExecutionPlan,
        registry: &CapabilityRegistry,
        ctx: &AnalysisContext,
    ) -> Vec<AnalysisResult> {
        let all: Vec<SelectedCapability> = plan
            .all_capabilities()
            .into_iter()
            .cloned()
            .collect();
        if all.is_empty() {
            return Vec::new();
        }

        info!(
            strategy = %plan.execution_strategy,
            capabilities = all.len(),
            task_id = %ctx.task_id,
            "executing plan"
        );

        match plan.execution_strategy {
            ExecutionStrategy::Parallel => self.execute_parallel(&all, registry, ctx).await,
            ExecutionStrategy::PriorityBased => {
                self.execute_priority_based(plan, registry, ctx).await
            }
            // Adaptive is resolved to a concrete strategy at planning time;
            // a plan still carrying it runs sequentially.
            ExecutionStrategy::Sequential | ExecutionStrategy::Adaptive => {
                self.execute_sequential(&all, registry, ctx).await
            }
        }
    }

    async fn execute_sequential(
        &self,
        capabilities: &[SelectedCapability],
        registry: &CapabilityRegistry,
        ctx: &AnalysisContext,
    ) -> Vec<AnalysisResult> {
        let ordered = topological_sort(capabilities, &self.catalog);
        let total = ordered.len();
        let mut results = Vec::with_capacity(total);
        for (index, capability) in ordered.iter().enumerate() {
            self.progress
                .update(
                    &ctx.task_id,
                    Stage::Executing,
                    json!({
                        "phase": "sequential",
                        "capability": capability.name,
                        "position": index + 1,
                        "total": total,
                    }),
                )
                .await;
            if let Some(result) = self.invoke_one(registry, ctx, capability).await {
                results.push(result);
            }
        }
        results
    }

    async fn execute_parallel(
        &self,
        capabilities: &[SelectedCapability],
        registry: &CapabilityRegistry,
        ctx: &AnalysisContext,
    ) -> Vec<AnalysisResult> {
        let levels = resolve_into_levels(capabilities, &self.catalog);
        let mut results = Vec::with_capacity(capabilities.len());
        for (index, level) in levels.iter().enumerate() {
            debug!(level_size = level.len(), "executing dependency level");
            self.progress
                .update(
                    &ctx.task_id,
                    Stage::Executing,
                    json!({
                        "phase": "parallel_level",
                        "level": index + 1,
                        "capabilities_in_level": level.len(),
                    }),
                )
                .await;
            let invocations = level
                .iter()
                .map(|capability| self.invoke_one(registry, ctx, capability));
            results.extend(join_all(invocations).await.into_iter().flatten());
        }
        results
    }

    /// High-priority capabilities run one at a time so their results land
    /// first; everything else runs concurrently afterwards.
    async fn execute_priority_based(
        &self,
        plan: &ExecutionPlan,
        registry: &CapabilityRegistry,
        ctx: &AnalysisContext,
    ) -> Vec<AnalysisResult> {
        let mut results = Vec::with_capacity(plan.total_capabilities());

        let ordered_primary = topological_sort(&plan.primary, &self.catalog);
        for capability in &ordered_primary {
            self.progress
                .update(
                    &ctx.task_id,
                    Stage::Executing,
                    json!({ "phase": "primary", "capability": capability.name }),
                )
                .await;
            if let Some(result) = self.invoke_one(registry, ctx, capability).await {
                results.push(result);
            }
        }

        let remainder: Vec<&SelectedCapability> =
            plan.secondary.iter().chain(plan.playbooks.iter()).collect();
        self.progress
            .update(
                &ctx.task_id,
                Stage::Executing,
                json!({ "phase": "concurrent", "capabilities": remainder.len() }),
            )
            .await;
        let invocations = remainder
            .iter()
            .map(|capability| self.invoke_one(registry, ctx, capability));
        results.extend(join_all(invocations).await.into_iter().flatten());

        results
    }

    /// Invoke one capability, stamping wall-clock time and appending a
    /// performance sample on success. Errors are logged and swallowed.
    async fn invoke_one(
        &self,
        registry: &CapabilityRegistry,
        ctx: &AnalysisContext,
        capability: &SelectedCapability,
    ) -> Option<AnalysisResult> {
        let started = Instant::now();
        match registry.invoke(&capability.name, ctx, &capability.config).await {
            Ok(mut result) => {
                result.execution_time = started.elapsed().as_secs_f64();
                debug!(
                    capability = %capability.name,
                    status = %result.status,
                    elapsed = result.execution_time,
                    "capability finished"
                );
                if let Some(learning) = &self.learning {
                    // Poisoned lock means a panicked test thread; skip the
                    // sample rather than fail the invocation.
                    if let Ok(mut learning) = learning.lock() {
                        let score = if result.status.is_success() {
                            result.confidence_score
                        } else {
                            0.0
                        };
                        learning.record_performance(&capability.name, score);
                    }
                }
                Some(result)
            }
            Err(err) => {
                error!(capability = %capability.name, %err, "capability invocation failed");
                None
            }
        }
    }
}

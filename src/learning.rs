//! Learning Store
//!
//! Rolling history of past orchestrated runs, used to bias future capability
//! selection toward historically effective capabilities for similar projects.
//!
//! Both stores here are bounded:
//! - execution history is a fixed-capacity ring buffer (oldest dropped first)
//! - per-capability performance samples keep only the most recent window
//!
//! State is append/trim only; existing entries are never edited in place.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use review_core::{AnalysisResult, AnalysisStatus, OrchestrationMetrics, ProjectCharacteristics, Severity};

use crate::plan::{ExecutionPlan, ExecutionStrategy};

/// Compact summary of one capability result inside a history record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub capability: String,
    pub status: AnalysisStatus,
    pub severity: Severity,
    pub confidence_score: f64,
    pub finding_count: usize,
}

impl From<&AnalysisResult> for ResultSummary {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            capability: result.capability.clone(),
            status: result.status,
            severity: result.severity,
            confidence_score: result.confidence_score,
            finding_count: result.findings.len(),
        }
    }
}

/// Append-only log entry for one orchestrated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionHistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub task_id: String,
    pub characteristics: ProjectCharacteristics,
    /// Names of the selected primary + secondary capabilities
    pub capabilities: Vec<String>,
    /// Names of the attached playbooks
    pub playbooks: Vec<String>,
    pub strategy: ExecutionStrategy,
    pub results: Vec<ResultSummary>,
    pub metrics: OrchestrationMetrics,
}

impl ExecutionHistoryRecord {
    /// Build a record from the run's plan, results, and metrics.
    pub fn from_run(
        task_id: impl Into<String>,
        characteristics: &ProjectCharacteristics,
        plan: &ExecutionPlan,
        results: &[AnalysisResult],
        metrics: &OrchestrationMetrics,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            task_id: task_id.into(),
            characteristics: characteristics.clone(),
            capabilities: plan
                .primary
                .iter()
                .chain(plan.secondary.iter())
                .map(|c| c.name.clone())
                .collect(),
            playbooks: plan.playbooks.iter().map(|p| p.name.clone()).collect(),
            strategy: plan.execution_strategy,
            results: results.iter().map(ResultSummary::from).collect(),
            metrics: metrics.clone(),
        }
    }
}

/// Read-only aggregate insights over the execution history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationInsights {
    pub total_executions: usize,
    /// Per-capability average effectiveness, best first
    pub capability_effectiveness: Vec<(String, f64)>,
    /// Capability combinations seen at least three times, best first (top 5)
    pub best_combinations: Vec<(Vec<String>, f64)>,
    pub avg_execution_time: f64,
    pub avg_success_rate: f64,
    pub avg_coverage: f64,
}

/// Bounded in-memory store of execution history and rolling per-capability
/// performance samples.
pub struct LearningStore {
    history: VecDeque<ExecutionHistoryRecord>,
    history_capacity: usize,
    performance: HashMap<String, VecDeque<f64>>,
    performance_window: usize,
}

impl LearningStore {
    /// Create a store with the given history capacity and per-capability
    /// performance window.
    pub fn new(history_capacity: usize, performance_window: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            performance: HashMap::new(),
            performance_window,
        }
    }

    /// Number of retained history records.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append a run record, discarding the oldest on overflow.
    pub fn record_run(&mut self, record: ExecutionHistoryRecord) {
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Append a performance sample for a capability, keeping only the most
    /// recent window.
    pub fn record_performance(&mut self, capability: &str, score: f64) {
        let samples = self
            .performance
            .entry(capability.to_string())
            .or_insert_with(VecDeque::new);
        if samples.len() == self.performance_window {
            samples.pop_front();
        }
        samples.push_back(score.clamp(0.0, 1.0));
    }

    /// Mean of the recent performance samples, when any exist.
    pub fn average_performance(&self, capability: &str) -> Option<f64> {
        let samples = self.performance.get(capability)?;
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    /// Historical capability recommendations for a project, normalized to
    /// [0, 1].
    ///
    /// Scans records whose characteristics similarity exceeds the threshold
    /// and accumulates `confidence * similarity` for each capability that
    /// completed successfully in that record.
    pub fn recommendations(
        &self,
        characteristics: &ProjectCharacteristics,
        similarity_threshold: f64,
    ) -> HashMap<String, f64> {
        let mut scores: HashMap<String, f64> = HashMap::new();

        for record in &self.history {
            let similarity = characteristics.similarity(&record.characteristics);
            if similarity <= similarity_threshold {
                continue;
            }
            for summary in &record.results {
                if summary.status == AnalysisStatus::Completed {
                    *scores.entry(summary.capability.clone()).or_insert(0.0) +=
                        summary.confidence_score * similarity;
                }
            }
        }

        let max = scores.values().cloned().fold(0.0_f64, f64::max);
        if max > 0.0 {
            for score in scores.values_mut() {
                *score /= max;
            }
        }
        scores
    }

    /// Aggregate insights for introspection and reporting. Not consumed by
    /// the planner beyond the similarity-based recommendations above.
    pub fn insights(&self) -> OrchestrationInsights {
        let total = self.history.len();
        if total == 0 {
            return OrchestrationInsights {
                total_executions: 0,
                capability_effectiveness: Vec::new(),
                best_combinations: Vec::new(),
                avg_execution_time: 0.0,
                avg_success_rate: 0.0,
                avg_coverage: 0.0,
            };
        }

        let mut effectiveness: HashMap<String, Vec<f64>> = HashMap::new();
        let mut combinations: HashMap<Vec<String>, Vec<f64>> = HashMap::new();

        for record in &self.history {
            for summary in &record.results {
                let score = if summary.status == AnalysisStatus::Completed {
                    summary.confidence_score
                } else {
                    0.0
                };
                effectiveness
                    .entry(summary.capability.clone())
                    .or_default()
                    .push(score);
            }

            let mut combo: Vec<String> =
                record.results.iter().map(|r| r.capability.clone()).collect();
            combo.sort();
            if combo.len() > 1 {
                combinations
                    .entry(combo)
                    .or_default()
                    .push(record.metrics.finding_quality_score);
            }
        }

        let mut capability_effectiveness: Vec<(String, f64)> = effectiveness
            .into_iter()
            .map(|(name, scores)| {
                let avg = scores.iter().sum::<f64>() / scores.len() as f64;
                (name, avg)
            })
            .collect();
        capability_effectiveness
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut best_combinations: Vec<(Vec<String>, f64)> = combinations
            .into_iter()
            .filter(|(_, scores)| scores.len() >= 3)
            .map(|(combo, scores)| {
                let avg = scores.iter().sum::<f64>() / scores.len() as f64;
                (combo, avg)
            })
            .collect();
        best_combinations
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        best_combinations.truncate(5);

        let avg = |f: fn(&OrchestrationMetrics) -> f64| {
            self.history.iter().map(|r| f(&r.metrics)).sum::<f64>() / total as f64
        };

        OrchestrationInsights {
            total_executions: total,
            capability_effectiveness,
            best_combinations,
            avg_execution_time: avg(|m| m.execution_time),
            avg_success_rate: avg(|m| m.tool_success_rate),
            avg_coverage: avg(|m| m.coverage_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::ProjectInfo;

    fn characteristics(languages: &[&str], files: usize, size: u64) -> ProjectCharacteristics {
        let info = ProjectInfo::new(languages.iter().map(|s| s.to_string()).collect())
            .with_file_count(files)
            .with_total_size(size);
        ProjectCharacteristics::from_project_info(&info)
    }

    fn record_with(
        chars: &ProjectCharacteristics,
        results: Vec<(&str, AnalysisStatus, f64)>,
        quality: f64,
    ) -> ExecutionHistoryRecord {
        ExecutionHistoryRecord {
            timestamp: Utc::now(),
            task_id: "t".to_string(),
            characteristics: chars.clone(),
            capabilities: results.iter().map(|(n, _, _)| n.to_string()).collect(),
            playbooks: Vec::new(),
            strategy: ExecutionStrategy::Sequential,
            results: results
                .into_iter()
                .map(|(name, status, confidence)| ResultSummary {
                    capability: name.to_string(),
                    status,
                    severity: Severity::Medium,
                    confidence_score: confidence,
                    finding_count: 1,
                })
                .collect(),
            metrics: OrchestrationMetrics {
                execution_time: 10.0,
                tool_success_rate: 1.0,
                finding_quality_score: quality,
                coverage_score: 0.5,
            },
        }
    }

    #[test]
    fn test_history_ring_buffer_drops_oldest() {
        let mut store = LearningStore::new(3, 10);
        let chars = characteristics(&["python"], 10, 100);
        for i in 0..5 {
            let mut record = record_with(&chars, vec![("a", AnalysisStatus::Completed, 0.8)], 0.8);
            record.task_id = format!("task-{}", i);
            store.record_run(record);
        }
        assert_eq!(store.history_len(), 3);
        assert_eq!(store.history.front().unwrap().task_id, "task-2");
        assert_eq!(store.history.back().unwrap().task_id, "task-4");
    }

    #[test]
    fn test_performance_window_truncation() {
        let mut store = LearningStore::new(10, 3);
        for i in 0..6 {
            store.record_performance("scanner", i as f64 / 10.0);
        }
        // Only the last three samples remain: 0.3, 0.4, 0.5
        let avg = store.average_performance("scanner").unwrap();
        assert!((avg - 0.4).abs() < 1e-9);
        assert!(store.average_performance("unknown").is_none());
    }

    #[test]
    fn test_performance_samples_clamped() {
        let mut store = LearningStore::new(10, 5);
        store.record_performance("scanner", 2.0);
        assert_eq!(store.average_performance("scanner"), Some(1.0));
    }

    #[test]
    fn test_recommendations_require_similarity() {
        let mut store = LearningStore::new(10, 10);
        let similar = characteristics(&["python"], 10, 1000);
        let dissimilar = characteristics(&["haskell", "erlang"], 500, 50_000_000);

        store.record_run(record_with(
            &similar,
            vec![("security_scanner", AnalysisStatus::Completed, 0.9)],
            0.9,
        ));

        let recs = store.recommendations(&similar, 0.6);
        assert!(recs.contains_key("security_scanner"));

        let recs = store.recommendations(&dissimilar, 0.6);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_recommendations_skip_failed_results() {
        let mut store = LearningStore::new(10, 10);
        let chars = characteristics(&["python"], 10, 1000);
        store.record_run(record_with(
            &chars,
            vec![
                ("good_tool", AnalysisStatus::Completed, 0.9),
                ("bad_tool", AnalysisStatus::Failed, 0.9),
            ],
            0.9,
        ));

        let recs = store.recommendations(&chars, 0.6);
        assert!(recs.contains_key("good_tool"));
        assert!(!recs.contains_key("bad_tool"));
    }

    #[test]
    fn test_recommendations_normalized_to_unit_interval() {
        let mut store = LearningStore::new(10, 10);
        let chars = characteristics(&["python"], 10, 1000);
        for _ in 0..4 {
            store.record_run(record_with(
                &chars,
                vec![
                    ("frequent", AnalysisStatus::Completed, 0.9),
                    ("rare", AnalysisStatus::Completed, 0.3),
                ],
                0.9,
            ));
        }

        let recs = store.recommendations(&chars, 0.6);
        assert!((recs["frequent"] - 1.0).abs() < 1e-9);
        assert!(recs["rare"] > 0.0 && recs["rare"] < 1.0);
    }

    #[test]
    fn test_insights_empty_history() {
        let store = LearningStore::new(10, 10);
        let insights = store.insights();
        assert_eq!(insights.total_executions, 0);
        assert!(insights.capability_effectiveness.is_empty());
    }

    #[test]
    fn test_insights_effectiveness_ranking() {
        let mut store = LearningStore::new(10, 10);
        let chars = characteristics(&["python"], 10, 1000);
        store.record_run(record_with(
            &chars,
            vec![
                ("strong", AnalysisStatus::Completed, 0.95),
                ("weak", AnalysisStatus::Failed, 0.9),
            ],
            0.8,
        ));

        let insights = store.insights();
        assert_eq!(insights.total_executions, 1);
        assert_eq!(insights.capability_effectiveness[0].0, "strong");
        assert_eq!(insights.capability_effectiveness[1].1, 0.0);
        assert!((insights.avg_execution_time - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_insights_combinations_need_three_runs() {
        let mut store = LearningStore::new(10, 10);
        let chars = characteristics(&["python"], 10, 1000);
        let results = vec![
            ("a", AnalysisStatus::Completed, 0.8),
            ("b", AnalysisStatus::Completed, 0.8),
        ];
        store.record_run(record_with(&chars, results.clone(), 0.8));
        store.record_run(record_with(&chars, results.clone(), 0.8));
        assert!(store.insights().best_combinations.is_empty());

        store.record_run(record_with(&chars, results, 0.8));
        let insights = store.insights();
        assert_eq!(insights.best_combinations.len(), 1);
        assert_eq!(
            insights.best_combinations[0].0,
            vec!["a".to_string(), "b".to_string()]
        );
    }
}

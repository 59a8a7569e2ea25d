//! Result Aggregator
//!
//! Post-processes the executor's result list in three passes:
//!
//! 1. global finding dedup, first occurrence wins
//! 2. pairwise cross-result correlation, annotated into metadata
//! 3. priority scoring and descending stable sort, with rank stamps
//!
//! Aggregation mutates only the `metadata` maps; findings and scores are
//! never rewritten.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use review_catalog::CapabilityCatalog;
use review_core::AnalysisResult;

/// Correlations at or below this floor carry no signal and are discarded.
const CORRELATION_FLOOR: f64 = 0.3;
/// How many individual correlations to keep per result.
const CORRELATIONS_KEPT: usize = 3;

const DEFAULT_CONFIDENCE_BASELINE: f64 = 0.8;
const SIGNATURE_MESSAGE_CHARS: usize = 50;

/// Deduplicates, correlates, and prioritizes analysis results.
pub struct ResultAggregator {
    catalog: Arc<CapabilityCatalog>,
}

impl ResultAggregator {
    /// Create an aggregator over the given catalog (used for category and
    /// baseline-confidence lookups).
    pub fn new(catalog: Arc<CapabilityCatalog>) -> Self {
        Self { catalog }
    }

    /// Aggregate a result list. An empty input aggregates to an empty list.
    pub fn aggregate(&self, results: Vec<AnalysisResult>) -> Vec<AnalysisResult> {
        if results.is_empty() {
            return Vec::new();
        }

        let mut results = deduplicate_findings(results);
        self.correlate(&mut results);
        self.prioritize(&mut results);

        debug!(results = results.len(), "aggregation finished");
        results
    }

    /// Annotate each result with its summed correlation score and the
    /// strongest individual correlations against the other results.
    fn correlate(&self, results: &mut [AnalysisResult]) {
        let snapshots: Vec<ResultSnapshot> = results.iter().map(ResultSnapshot::from).collect();

        for (i, result) in results.iter_mut().enumerate() {
            // The summed score covers every correlated peer; only the first
            // few individual correlations are kept for display.
            let mut total = 0.0;
            let mut kept: Vec<(String, f64)> = Vec::new();
            for (j, other) in snapshots.iter().enumerate() {
                if i == j {
                    continue;
                }
                let score = snapshots[i].correlation(other, &self.catalog);
                if score > CORRELATION_FLOOR {
                    total += score;
                    if kept.len() < CORRELATIONS_KEPT {
                        kept.push((other.capability.clone(), score));
                    }
                }
            }

            result
                .metadata
                .insert("correlation_score".to_string(), json!(total));
            if !kept.is_empty() {
                let entries: Vec<Value> = kept
                    .iter()
                    .map(|(capability, score)| json!({ "capability": capability, "score": score }))
                    .collect();
                result
                    .metadata
                    .insert("correlated_with".to_string(), Value::Array(entries));
            }
        }
    }

    /// Stable descending sort by priority score, stamping 1-based rank,
    /// total count, and the aggregation timestamp into metadata.
    fn prioritize(&self, results: &mut Vec<AnalysisResult>) {
        let scored: HashMap<String, f64> = results
            .iter()
            .map(|result| (result.capability.clone(), self.priority_score(result)))
            .collect();

        results.sort_by(|a, b| {
            let score_a = scored.get(&a.capability).copied().unwrap_or(0.0);
            let score_b = scored.get(&b.capability).copied().unwrap_or(0.0);
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total = results.len();
        let timestamp = Utc::now().to_rfc3339();
        for (index, result) in results.iter_mut().enumerate() {
            result
                .metadata
                .insert("aggregation_rank".to_string(), json!(index + 1));
            result
                .metadata
                .insert("total_results".to_string(), json!(total));
            result.metadata.insert(
                "aggregation_timestamp".to_string(),
                Value::String(timestamp.clone()),
            );
        }
    }

    fn priority_score(&self, result: &AnalysisResult) -> f64 {
        let baseline = self
            .catalog
            .get(&result.capability)
            .map(|d| d.confidence_baseline)
            .unwrap_or(DEFAULT_CONFIDENCE_BASELINE);
        let correlation = result
            .metadata
            .get("correlation_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        result.severity.weight() * 0.4
            + result.confidence_score * 0.3
            + baseline * 0.2
            + (correlation * 0.1).min(0.2)
            + (result.findings.len() as f64 * 0.05).min(0.2)
    }
}

/// Drop findings whose signature was already seen in an earlier result,
/// then drop results left with nothing to report.
fn deduplicate_findings(results: Vec<AnalysisResult>) -> Vec<AnalysisResult> {
    let mut seen: HashSet<(String, u32, String, String)> = HashSet::new();

    results
        .into_iter()
        .filter_map(|mut result| {
            result.findings.retain(|finding| {
                let signature = (
                    finding.file.clone(),
                    finding.line,
                    finding.finding_type.clone(),
                    finding
                        .message
                        .chars()
                        .take(SIGNATURE_MESSAGE_CHARS)
                        .collect::<String>(),
                );
                seen.insert(signature)
            });

            // A result left with no unique findings is dropped entirely.
            if result.findings.is_empty() {
                None
            } else {
                Some(result)
            }
        })
        .collect()
}

/// Immutable view of one result used during pairwise correlation.
struct ResultSnapshot {
    capability: String,
    severity: review_core::Severity,
    files: HashSet<String>,
}

impl ResultSnapshot {
    fn correlation(&self, other: &ResultSnapshot, catalog: &CapabilityCatalog) -> f64 {
        // No finding files on either side means nothing to correlate.
        if self.files.is_empty() || other.files.is_empty() {
            return 0.0;
        }
        let mut score = 0.5 * jaccard(&self.files, &other.files);
        if self.severity == other.severity {
            score += 0.5;
        }
        let category_a = catalog.category_of(&self.capability);
        let category_b = catalog.category_of(&other.capability);
        if category_a.is_some() && category_a == category_b {
            score += 0.3;
        }
        score
    }
}

impl From<&AnalysisResult> for ResultSnapshot {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            capability: result.capability.clone(),
            severity: result.severity,
            files: result
                .findings
                .iter()
                .map(|finding| finding.file.clone())
                .collect(),
        }
    }
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

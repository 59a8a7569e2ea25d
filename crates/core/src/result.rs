//! Analysis Result Models
//!
//! Data structures produced by capability invocations and consumed by the
//! aggregation stages:
//!
//! - `AnalysisStatus` / `Severity` - closed status and severity sets
//! - `Finding` - one concrete reported issue (file/line/message)
//! - `AnalysisResult` - the normalized output of one capability invocation
//! - `OrchestrationMetrics` - summary metrics for one orchestrated run

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a capability invocation. Closed set; no other values are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// Check if this status indicates a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisStatus::Completed)
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Pending => write!(f, "pending"),
            AnalysisStatus::InProgress => write!(f, "in_progress"),
            AnalysisStatus::Completed => write!(f, "completed"),
            AnalysisStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Issue severity. Closed set; no other values are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric weight used by result prioritization.
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Critical => 1.0,
            Severity::High => 0.8,
            Severity::Medium => 0.6,
            Severity::Low => 0.4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One concrete reported issue inside an `AnalysisResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Kind of issue (e.g. "secret", "god_class", "circular_import")
    #[serde(rename = "type")]
    pub finding_type: String,
    /// The pattern or rule that matched
    #[serde(default)]
    pub pattern: String,
    /// Severity of this individual finding
    pub severity: Severity,
    /// File path the finding refers to
    pub file: String,
    /// 1-based line number (0 when not line-scoped)
    #[serde(default)]
    pub line: u32,
    /// Human-readable message
    pub message: String,
    /// Short excerpt of the offending content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
    /// Capability-specific extra fields
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Finding {
    /// Create a finding with the required fields.
    pub fn new(
        finding_type: impl Into<String>,
        severity: Severity,
        file: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            finding_type: finding_type.into(),
            pattern: String::new(),
            severity,
            file: file.into(),
            line,
            message: message.into(),
            content_preview: None,
            metadata: HashMap::new(),
        }
    }

    /// Attach the matched pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Attach a content preview.
    pub fn with_content_preview(mut self, preview: impl Into<String>) -> Self {
        self.content_preview = Some(preview.into());
        self
    }
}

/// Normalized output of one capability invocation.
///
/// Created by the capability executor; the aggregation stages mutate the
/// `metadata` map only (correlation scores, ranks) and never touch the
/// findings or scores in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Name of the capability that produced this result
    pub capability: String,
    /// Playbook name, when the capability ran as part of a playbook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playbook: Option<String>,
    /// Invocation status
    pub status: AnalysisStatus,
    /// Overall severity of this result
    pub severity: Severity,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Ordered list of findings
    pub findings: Vec<Finding>,
    /// Recommendation strings
    pub recommendations: Vec<String>,
    /// Confidence in [0, 1]
    pub confidence_score: f64,
    /// Wall-clock execution time in seconds, set by the executor
    pub execution_time: f64,
    /// Open metadata map; aggregation appends correlation_score,
    /// aggregation_rank, and friends here
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl AnalysisResult {
    /// Create a completed result.
    pub fn completed(
        capability: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            capability: capability.into(),
            playbook: None,
            status: AnalysisStatus::Completed,
            severity,
            title: title.into(),
            description: description.into(),
            findings: Vec::new(),
            recommendations: Vec::new(),
            confidence_score: 0.8,
            execution_time: 0.0,
            metadata: HashMap::new(),
        }
    }

    /// Create a failed-status, zero-confidence result from an invocation
    /// error, with the error message embedded in metadata. This is the
    /// data representation of an absorbed capability failure.
    pub fn failed_from_error(capability: impl Into<String>, error: impl std::fmt::Display) -> Self {
        let capability = capability.into();
        let mut metadata = HashMap::new();
        metadata.insert("error".to_string(), Value::String(error.to_string()));
        Self {
            capability: capability.clone(),
            playbook: None,
            status: AnalysisStatus::Failed,
            severity: Severity::Low,
            title: format!("{} failed", capability),
            description: "Capability invocation failed".to_string(),
            findings: Vec::new(),
            recommendations: Vec::new(),
            confidence_score: 0.0,
            execution_time: 0.0,
            metadata,
        }
    }

    /// Set the findings.
    pub fn with_findings(mut self, findings: Vec<Finding>) -> Self {
        self.findings = findings;
        self
    }

    /// Set the recommendation strings.
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Set the confidence score, clamped to [0, 1].
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence_score = confidence.clamp(0.0, 1.0);
        self
    }

    /// Mark this result as produced by a playbook.
    pub fn with_playbook(mut self, playbook: impl Into<String>) -> Self {
        self.playbook = Some(playbook.into());
        self
    }
}

/// Summary metrics for one orchestrated run. Computed once after
/// aggregation; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationMetrics {
    /// Total wall-clock execution time in seconds
    pub execution_time: f64,
    /// Fraction of planned capabilities that completed successfully
    pub tool_success_rate: f64,
    /// Average confidence across results
    pub finding_quality_score: f64,
    /// Fraction of known categories represented in the results
    pub coverage_score: f64,
}

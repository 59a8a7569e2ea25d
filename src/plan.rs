//! Execution Plan Models
//!
//! The selected work for one analysis run: primary/secondary capabilities,
//! complementary playbooks, the resolved execution strategy, duration and
//! resource estimates, and the in-plan prerequisite edges. Created once per
//! run by the planner; consumed read-only by the executor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use review_core::CapabilityKind;

/// Capability execution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// One capability at a time, in dependency order
    Sequential,
    /// Dependency levels, capabilities within a level run concurrently
    Parallel,
    /// Let the planner pick based on project characteristics
    Adaptive,
    /// High-priority capabilities sequentially, the rest concurrently
    PriorityBased,
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStrategy::Sequential => write!(f, "sequential"),
            ExecutionStrategy::Parallel => write!(f, "parallel"),
            ExecutionStrategy::Adaptive => write!(f, "adaptive"),
            ExecutionStrategy::PriorityBased => write!(f, "priority_based"),
        }
    }
}

/// Selection priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One capability chosen by the planner, with its selection context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedCapability {
    /// Capability name (must exist in the catalog)
    pub name: String,
    /// Tool or playbook
    pub kind: CapabilityKind,
    /// Assigned priority tier
    pub priority: Priority,
    /// Selection score that earned this capability its slot
    pub score: f64,
    /// Capability-specific configuration overrides
    #[serde(default)]
    pub config: HashMap<String, Value>,
    /// Name of the capability whose prerequisite pulled this one in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

impl SelectedCapability {
    /// Create a selected capability with empty config.
    pub fn new(
        name: impl Into<String>,
        kind: CapabilityKind,
        priority: Priority,
        score: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            priority,
            score,
            config: HashMap::new(),
            triggered_by: None,
        }
    }

    /// Record which capability's prerequisite pulled this one into the plan.
    pub fn triggered_by(mut self, capability: impl Into<String>) -> Self {
        self.triggered_by = Some(capability.into());
        self
    }
}

/// Memory/CPU estimate summary for a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequirements {
    /// Rough memory estimate in MiB
    pub memory_estimate_mb: u64,
    /// Rough CPU core estimate
    pub cpu_estimate: f64,
    /// More than two high-resource capabilities selected
    pub io_intensive: bool,
    /// False when more than two high-resource capabilities are selected
    pub parallel_safe: bool,
}

/// The selected work for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// High-priority capabilities
    pub primary: Vec<SelectedCapability>,
    /// Medium/low-priority capabilities
    pub secondary: Vec<SelectedCapability>,
    /// Complementary playbooks
    pub playbooks: Vec<SelectedCapability>,
    /// Resolved (concrete) execution strategy
    pub execution_strategy: ExecutionStrategy,
    /// Estimated total duration in seconds
    pub estimated_duration_secs: f64,
    /// Resource requirement summary
    pub resource_requirements: ResourceRequirements,
    /// Prerequisite edges, restricted to capabilities present in this plan
    #[serde(default)]
    pub dependencies: HashMap<String, Vec<String>>,
}

impl ExecutionPlan {
    /// All plan members in primary, secondary, playbook order.
    pub fn all_capabilities(&self) -> Vec<&SelectedCapability> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .chain(self.playbooks.iter())
            .collect()
    }

    /// Total number of planned capabilities.
    pub fn total_capabilities(&self) -> usize {
        self.primary.len() + self.secondary.len() + self.playbooks.len()
    }

    /// Whether the planner selected nothing (a valid, empty plan).
    pub fn is_empty(&self) -> bool {
        self.total_capabilities() == 0
    }

    /// Whether a capability name is part of this plan.
    pub fn contains(&self, name: &str) -> bool {
        self.all_capabilities().iter().any(|c| c.name == name)
    }
}

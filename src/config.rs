//! Orchestrator Configuration
//!
//! Tunables for capability selection and learning, validated at
//! construction time so configuration errors surface before a run starts.

use serde::{Deserialize, Serialize};

use review_core::{ReviewError, ReviewResult};

/// Tunables for the orchestration core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Minimum selection score a capability must clear (default 0.4)
    pub selection_threshold: f64,
    /// Maximum number of capabilities selected per plan (default 8)
    pub max_capabilities: usize,
    /// Maximum number of complementary playbooks added per plan (default 4)
    pub max_playbooks: usize,
    /// Minimum project similarity for a history record to influence
    /// recommendations (default 0.6)
    pub similarity_threshold: f64,
    /// Rolling per-capability performance window length (default 10)
    pub performance_window: usize,
    /// Execution history ring-buffer capacity (default 100)
    pub history_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            selection_threshold: 0.4,
            max_capabilities: 8,
            max_playbooks: 4,
            similarity_threshold: 0.6,
            performance_window: 10,
            history_capacity: 100,
        }
    }
}

impl OrchestratorConfig {
    /// Validate the configuration, returning it on success.
    pub fn validated(self) -> ReviewResult<Self> {
        if !(0.0..=1.0).contains(&self.selection_threshold) {
            return Err(ReviewError::config(format!(
                "selection_threshold must be in [0, 1], got {}",
                self.selection_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ReviewError::config(format!(
                "similarity_threshold must be in [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.max_capabilities == 0 {
            return Err(ReviewError::config("max_capabilities must be at least 1"));
        }
        if self.performance_window == 0 {
            return Err(ReviewError::config("performance_window must be at least 1"));
        }
        if self.history_capacity == 0 {
            return Err(ReviewError::config("history_capacity must be at least 1"));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OrchestratorConfig::default().validated().unwrap();
        assert_eq!(config.selection_threshold, 0.4);
        assert_eq!(config.max_capabilities, 8);
        assert_eq!(config.max_playbooks, 4);
        assert_eq!(config.history_capacity, 100);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let config = OrchestratorConfig {
            selection_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = OrchestratorConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(config.validated().is_err());
    }
}

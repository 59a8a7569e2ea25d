//! Capability Descriptors
//!
//! Static metadata for one analysis capability: category, language
//! applicability, estimated duration, resource cost, prerequisites, and
//! baseline confidence. Immutable after catalog initialization.

use serde::{Deserialize, Serialize};

use review_core::CapabilityKind;

/// Analysis category. Closed set; coverage scoring is computed against
/// `Category::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Quality,
    Security,
    Performance,
    Architecture,
    Dependencies,
    Complexity,
}

impl Category {
    /// Every known category.
    pub const ALL: [Category; 6] = [
        Category::Quality,
        Category::Security,
        Category::Performance,
        Category::Architecture,
        Category::Dependencies,
        Category::Complexity,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Quality => write!(f, "quality"),
            Category::Security => write!(f, "security"),
            Category::Performance => write!(f, "performance"),
            Category::Architecture => write!(f, "architecture"),
            Category::Dependencies => write!(f, "dependencies"),
            Category::Complexity => write!(f, "complexity"),
        }
    }
}

/// Resource cost level of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceLevel {
    Low,
    Medium,
    High,
}

/// Languages a capability applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageSupport {
    /// Applies to every language
    All,
    /// Applies only to the listed (lowercase) languages
    Listed(Vec<String>),
}

impl LanguageSupport {
    /// Convenience constructor for a listed language set.
    pub fn listed(languages: &[&str]) -> Self {
        LanguageSupport::Listed(languages.iter().map(|l| l.to_lowercase()).collect())
    }
}

/// Static metadata for one analysis capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Unique capability name
    pub name: String,
    /// Tool or playbook
    pub kind: CapabilityKind,
    /// Analysis category
    pub category: Category,
    /// Estimated duration in seconds
    pub estimated_duration_secs: f64,
    /// Resource cost level
    pub resource_level: ResourceLevel,
    /// Applicable languages
    pub languages: LanguageSupport,
    /// Names of prerequisite capabilities (possibly empty)
    pub prerequisites: Vec<String>,
    /// Declared output categories (e.g. "vulnerabilities")
    pub outputs: Vec<String>,
    /// Baseline confidence in [0, 1]
    pub confidence_baseline: f64,
}

impl CapabilityDescriptor {
    /// Create a descriptor with the required fields; languages default to
    /// `All`, prerequisites and outputs to empty, baseline confidence to 0.8.
    pub fn new(
        name: impl Into<String>,
        kind: CapabilityKind,
        category: Category,
        estimated_duration_secs: f64,
        resource_level: ResourceLevel,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            category,
            estimated_duration_secs,
            resource_level,
            languages: LanguageSupport::All,
            prerequisites: Vec::new(),
            outputs: Vec::new(),
            confidence_baseline: 0.8,
        }
    }

    /// Restrict the descriptor to the listed languages.
    pub fn with_languages(mut self, languages: &[&str]) -> Self {
        self.languages = LanguageSupport::listed(languages);
        self
    }

    /// Declare prerequisite capabilities.
    pub fn with_prerequisites(mut self, prerequisites: &[&str]) -> Self {
        self.prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Declare output categories.
    pub fn with_outputs(mut self, outputs: &[&str]) -> Self {
        self.outputs = outputs.iter().map(|o| o.to_string()).collect();
        self
    }

    /// Set the baseline confidence, clamped to [0, 1].
    pub fn with_confidence_baseline(mut self, baseline: f64) -> Self {
        self.confidence_baseline = baseline.clamp(0.0, 1.0);
        self
    }
}

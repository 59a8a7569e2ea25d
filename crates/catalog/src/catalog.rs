//! Capability Catalog
//!
//! The static descriptor table plus the pairwise synergy matrix. Constructed
//! once per process and injected into the planner/executor; pure lookup with
//! no mutation after construction. Absent entries yield "no metadata", which
//! callers treat as compatible-with-everything, default cost.

use std::collections::HashMap;

use review_core::CapabilityKind;

use crate::descriptor::{CapabilityDescriptor, Category, ResourceLevel};

/// Capability pairs that are known to complement each other well.
const HIGH_SYNERGY_PAIRS: &[(&str, &str)] = &[
    ("static_analyzer", "code_quality_checker"),
    ("dependency_analyzer", "circular_dependencies"),
    ("security_scanner", "hardcoded_secrets"),
    ("complexity_analyzer", "high_complexity"),
    ("static_analyzer", "god_classes"),
    ("security_scanner", "idor_vulnerabilities"),
];

/// Immutable catalog of capability descriptors and their synergy matrix.
pub struct CapabilityCatalog {
    entries: HashMap<String, CapabilityDescriptor>,
    /// Descriptor names in insertion order, for deterministic iteration.
    order: Vec<String>,
    /// Pairwise synergy scores, keyed by lexicographically ordered name pair.
    synergy: HashMap<(String, String), f64>,
}

impl CapabilityCatalog {
    /// Build a catalog from a list of descriptors. Later duplicates replace
    /// earlier ones.
    pub fn new(descriptors: Vec<CapabilityDescriptor>) -> Self {
        let mut entries = HashMap::new();
        let mut order = Vec::new();
        for descriptor in descriptors {
            if !entries.contains_key(&descriptor.name) {
                order.push(descriptor.name.clone());
            }
            entries.insert(descriptor.name.clone(), descriptor);
        }

        let synergy = build_synergy_matrix(&entries);
        Self {
            entries,
            order,
            synergy,
        }
    }

    /// The built-in catalog: the seven analysis tools and six playbooks of
    /// the review platform, with their standing estimates.
    pub fn builtin() -> Self {
        use CapabilityKind::{Playbook, Tool};
        use Category::*;
        use ResourceLevel::*;

        Self::new(vec![
            // Analysis tools
            CapabilityDescriptor::new("static_analyzer", Tool, Quality, 30.0, Medium)
                .with_languages(&["python", "javascript", "typescript", "java"])
                .with_outputs(&["code_quality", "maintainability"])
                .with_confidence_baseline(0.85),
            CapabilityDescriptor::new("dependency_analyzer", Tool, Dependencies, 15.0, Low)
                .with_languages(&["python", "javascript", "typescript", "java"])
                .with_outputs(&["dependencies", "imports"])
                .with_confidence_baseline(0.90),
            CapabilityDescriptor::new("security_scanner", Tool, Security, 45.0, High)
                .with_outputs(&["vulnerabilities", "security_issues"])
                .with_confidence_baseline(0.88),
            CapabilityDescriptor::new("complexity_analyzer", Tool, Complexity, 20.0, Low)
                .with_languages(&["python", "javascript", "typescript", "java", "c++"])
                .with_outputs(&["complexity_metrics"])
                .with_confidence_baseline(0.92),
            CapabilityDescriptor::new("code_quality_checker", Tool, Quality, 25.0, Medium)
                .with_languages(&["python", "javascript", "typescript"])
                .with_outputs(&["style_issues", "best_practices"])
                .with_confidence_baseline(0.87),
            CapabilityDescriptor::new("performance_analyzer", Tool, Performance, 35.0, Medium)
                .with_languages(&["python", "javascript", "typescript", "java"])
                .with_outputs(&["performance_issues"])
                .with_confidence_baseline(0.83),
            CapabilityDescriptor::new("architecture_analyzer", Tool, Architecture, 40.0, High)
                .with_outputs(&["architecture_issues", "design_patterns"])
                .with_confidence_baseline(0.80),
            // Analysis playbooks
            CapabilityDescriptor::new("god_classes", Playbook, Architecture, 20.0, Medium)
                .with_languages(&["python", "java", "c#"])
                .with_prerequisites(&["static_analyzer"])
                .with_outputs(&["class_violations"])
                .with_confidence_baseline(0.90),
            CapabilityDescriptor::new("circular_dependencies", Playbook, Dependencies, 15.0, Low)
                .with_languages(&["python", "javascript", "typescript"])
                .with_prerequisites(&["dependency_analyzer"])
                .with_outputs(&["circular_imports"])
                .with_confidence_baseline(0.95),
            CapabilityDescriptor::new("high_complexity", Playbook, Complexity, 18.0, Low)
                .with_prerequisites(&["complexity_analyzer"])
                .with_outputs(&["complex_functions"])
                .with_confidence_baseline(0.92),
            CapabilityDescriptor::new("dependency_health", Playbook, Dependencies, 25.0, Medium)
                .with_languages(&["python", "javascript", "typescript"])
                .with_outputs(&["dependency_issues"])
                .with_confidence_baseline(0.85),
            CapabilityDescriptor::new("hardcoded_secrets", Playbook, Security, 30.0, Medium)
                .with_outputs(&["exposed_secrets"])
                .with_confidence_baseline(0.95),
            CapabilityDescriptor::new("idor_vulnerabilities", Playbook, Security, 35.0, High)
                .with_languages(&["python", "javascript", "typescript", "java", "php"])
                .with_outputs(&["authorization_issues"])
                .with_confidence_baseline(0.88),
        ])
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.entries.get(name)
    }

    /// Check whether a capability is in the catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Descriptor names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Descriptors in insertion order.
    pub fn descriptors(&self) -> impl Iterator<Item = &CapabilityDescriptor> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prerequisites declared for a capability; absent entries have none.
    pub fn prerequisites_of(&self, name: &str) -> &[String] {
        self.entries
            .get(name)
            .map(|d| d.prerequisites.as_slice())
            .unwrap_or(&[])
    }

    /// Category of a capability, when it has catalog metadata.
    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.entries.get(name).map(|d| d.category)
    }

    /// Number of distinct categories present in the catalog.
    pub fn category_count(&self) -> usize {
        let mut seen: Vec<Category> = self.entries.values().map(|d| d.category).collect();
        seen.sort();
        seen.dedup();
        seen.len()
    }

    /// Pairwise synergy score in [0, 1]: 0.9 for explicit high-synergy
    /// pairs, 0.6 for same-category pairs, 0.0 otherwise (including any
    /// name without catalog metadata).
    pub fn synergy(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 0.0;
        }
        self.synergy
            .get(&ordered_pair(a, b))
            .copied()
            .unwrap_or(0.0)
    }
}

impl Default for CapabilityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn build_synergy_matrix(
    entries: &HashMap<String, CapabilityDescriptor>,
) -> HashMap<(String, String), f64> {
    let mut matrix = HashMap::new();

    for (a, b) in HIGH_SYNERGY_PAIRS {
        if entries.contains_key(*a) && entries.contains_key(*b) {
            matrix.insert(ordered_pair(a, b), 0.9);
        }
    }

    // Same-category pairs default to 0.6 without overriding explicit pairs.
    let names: Vec<&String> = entries.keys().collect();
    for (i, a) in names.iter().enumerate() {
        for b in names.iter().skip(i + 1) {
            if entries[*a].category == entries[*b].category {
                matrix.entry(ordered_pair(a, b)).or_insert(0.6);
            }
        }
    }

    matrix
}

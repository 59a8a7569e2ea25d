//! Project Characteristics
//!
//! Derived snapshot of the target codebase used for capability selection.
//! Computed once per analysis run from the inbound `ProjectInfo`; read-only
//! input to planning thereafter.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::context::ProjectInfo;

/// Framework indicator table: (framework, marker substrings).
const FRAMEWORK_INDICATORS: &[(&str, &[&str])] = &[
    ("django", &["manage.py", "settings.py", "urls.py"]),
    ("flask", &["app.py", "flask"]),
    ("react", &["package.json", "react"]),
    ("vue", &["vue.config.js", "vue"]),
    ("spring", &["pom.xml", "spring"]),
    ("express", &["package.json", "express"]),
];

/// Architecture indicator table: a pattern is reported when at least two of
/// its markers appear in the file structure.
const ARCHITECTURE_INDICATORS: &[(&str, &[&str])] = &[
    ("mvc", &["models", "views", "controllers"]),
    ("microservices", &["services", "api"]),
    ("layered", &["data", "business", "presentation"]),
    ("clean_architecture", &["domain", "infrastructure", "application"]),
];

/// Dependency manifests checked for the `has_dependencies` flag.
const DEPENDENCY_MANIFESTS: &[&str] = &["package.json", "requirements.txt", "pom.xml"];

/// Derived, normalized snapshot of the target codebase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCharacteristics {
    /// Lowercased language names present in the project
    pub languages: Vec<String>,
    /// Number of source files
    pub file_count: usize,
    /// Total size of the codebase in bytes
    pub project_size: u64,
    /// Normalized complexity score in [0, 1]
    pub complexity_score: f64,
    /// Whether any test-looking file types were detected
    pub has_tests: bool,
    /// Whether a dependency manifest was detected
    pub has_dependencies: bool,
    /// Detected framework patterns (django, react, ...)
    pub framework_patterns: Vec<String>,
    /// Detected architecture patterns (mvc, layered, ...)
    pub architecture_patterns: Vec<String>,
}

impl ProjectCharacteristics {
    /// Derive characteristics from the inbound project info.
    pub fn from_project_info(info: &ProjectInfo) -> Self {
        let structure = info.file_structure.to_lowercase();

        let languages: Vec<String> = info
            .languages
            .iter()
            .map(|lang| lang.to_lowercase())
            .collect();

        Self {
            complexity_score: complexity_score(info),
            has_tests: info
                .file_types
                .iter()
                .any(|t| t.to_lowercase().contains("test")),
            has_dependencies: DEPENDENCY_MANIFESTS
                .iter()
                .any(|manifest| structure.contains(manifest)),
            framework_patterns: detect_frameworks(&structure),
            architecture_patterns: detect_architectures(&structure),
            languages,
            file_count: info.file_count,
            project_size: info.total_size,
        }
    }

    /// Similarity to another project's characteristics, in [0, 1].
    ///
    /// Mean of language-set Jaccard similarity, size-ratio similarity, and
    /// 1-minus-absolute-complexity-difference, over whichever of the three
    /// are computable.
    pub fn similarity(&self, other: &ProjectCharacteristics) -> f64 {
        let mut parts: Vec<f64> = Vec::with_capacity(3);

        let langs1: BTreeSet<&str> = self.languages.iter().map(String::as_str).collect();
        let langs2: BTreeSet<&str> = other.languages.iter().map(String::as_str).collect();
        if !langs1.is_empty() || !langs2.is_empty() {
            let union = langs1.union(&langs2).count();
            let intersection = langs1.intersection(&langs2).count();
            parts.push(if union > 0 {
                intersection as f64 / union as f64
            } else {
                0.0
            });
        }

        if self.project_size > 0 && other.project_size > 0 {
            let max = self.project_size.max(other.project_size) as f64;
            let diff = self.project_size.abs_diff(other.project_size) as f64;
            parts.push(1.0 - diff / max);
        }

        parts.push(1.0 - (self.complexity_score - other.complexity_score).abs());

        parts.iter().sum::<f64>() / parts.len() as f64
    }
}

/// Weighted average of file-count/size/language-count ratios, each capped
/// at 1.0 (100 files, 10 MiB, 5 languages).
fn complexity_score(info: &ProjectInfo) -> f64 {
    let file_score = (info.file_count as f64 / 100.0).min(1.0);
    let size_score = (info.total_size as f64 / (10.0 * 1024.0 * 1024.0)).min(1.0);
    let lang_score = (info.languages.len() as f64 / 5.0).min(1.0);
    (file_score + size_score + lang_score) / 3.0
}

fn detect_frameworks(structure: &str) -> Vec<String> {
    FRAMEWORK_INDICATORS
        .iter()
        .filter(|(_, markers)| markers.iter().any(|m| structure.contains(m)))
        .map(|(framework, _)| framework.to_string())
        .collect()
}

fn detect_architectures(structure: &str) -> Vec<String> {
    ARCHITECTURE_INDICATORS
        .iter()
        .filter(|(_, markers)| markers.iter().filter(|m| structure.contains(*m)).count() >= 2)
        .map(|(pattern, _)| pattern.to_string())
        .collect()
}

//! Analysis Context
//!
//! The context handed to every capability invocation:
//!
//! - `ProjectInfo` - raw project facts supplied by the code-retrieval collaborator
//! - `AnalysisContext` - task identity, project info, vector-store handle, and
//!   the free-form analysis requirement tags passed through unmodified
//!
//! Capabilities receive an `&AnalysisContext` and CANNOT mutate orchestration
//! state through it.

use serde::{Deserialize, Serialize};

/// Raw project information supplied by the external retrieval/indexing
/// collaborator. This is the inbound shape; the planner derives
/// `ProjectCharacteristics` from it once per run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Languages detected in the codebase (e.g. "python", "typescript")
    pub languages: Vec<String>,
    /// Number of source files
    pub file_count: usize,
    /// Total size of the codebase in bytes
    pub total_size: u64,
    /// File type/extension labels seen during retrieval
    pub file_types: Vec<String>,
    /// Flattened textual rendering of the file tree, used for pattern detection
    pub file_structure: String,
}

impl ProjectInfo {
    /// Create a project info snapshot with the given languages.
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            languages,
            ..Default::default()
        }
    }

    /// Set the file count.
    pub fn with_file_count(mut self, count: usize) -> Self {
        self.file_count = count;
        self
    }

    /// Set the total size in bytes.
    pub fn with_total_size(mut self, size: u64) -> Self {
        self.total_size = size;
        self
    }

    /// Set the file type labels.
    pub fn with_file_types(mut self, types: Vec<String>) -> Self {
        self.file_types = types;
        self
    }

    /// Set the flattened file structure string.
    pub fn with_file_structure(mut self, structure: impl Into<String>) -> Self {
        self.file_structure = structure.into();
        self
    }
}

/// Context for a single analysis run, shared read-only by every capability
/// invocation in that run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Unique identifier for the analysis task
    pub task_id: String,
    /// Project facts from the retrieval collaborator
    pub project_info: ProjectInfo,
    /// Opaque handle to the vector-store collection for this codebase.
    /// Capabilities use it for their own searches; the orchestrator never
    /// interprets it.
    pub vector_store_collection: String,
    /// Free-form requirement tags, passed through unmodified to capabilities
    pub analysis_requirements: Vec<String>,
}

impl AnalysisContext {
    /// Create a new analysis context.
    pub fn new(
        task_id: impl Into<String>,
        project_info: ProjectInfo,
        vector_store_collection: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            project_info,
            vector_store_collection: vector_store_collection.into(),
            analysis_requirements: Vec::new(),
        }
    }

    /// Set the analysis requirement tags.
    pub fn with_requirements(mut self, requirements: Vec<String>) -> Self {
        self.analysis_requirements = requirements;
        self
    }
}

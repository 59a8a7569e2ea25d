//! Review Core
//!
//! Foundational types for the review orchestration workspace. This crate has
//! zero dependencies on orchestration-level code (planner, executor, catalog).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`ReviewError`, `ReviewResult`)
//! - `context` - Analysis context (`ProjectInfo`, `AnalysisContext`)
//! - `capability` - Uniform capability contract (`CapabilityDefinition`,
//!   `CapabilityInvoke`, `Capability`, `CapabilityRegistry`)
//! - `result` - Result models (`AnalysisResult`, `Finding`, `Severity`,
//!   `AnalysisStatus`, `OrchestrationMetrics`)
//! - `project` - Derived project characteristics and similarity
//!
//! ## Design Principles
//!
//! 1. **Minimal dependencies** - serde, serde_json, async-trait, thiserror only
//! 2. **Trait-based abstractions** - capabilities are opaque behind one contract
//! 3. **Unidirectional dependency** - this crate depends on nothing else in
//!    the workspace

pub mod capability;
pub mod context;
pub mod error;
pub mod project;
pub mod result;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{ReviewError, ReviewResult};

// ── Context ────────────────────────────────────────────────────────────
pub use context::{AnalysisContext, ProjectInfo};

// ── Capability Contract ────────────────────────────────────────────────
pub use capability::{
    Capability, CapabilityDefinition, CapabilityInvoke, CapabilityKind, CapabilityRegistry,
};

// ── Result Models ──────────────────────────────────────────────────────
pub use result::{AnalysisResult, AnalysisStatus, Finding, OrchestrationMetrics, Severity};

// ── Project Characteristics ────────────────────────────────────────────
pub use project::ProjectCharacteristics;

//! Review Catalog
//!
//! Static capability metadata for the review orchestration core:
//!
//! - `descriptor` - `CapabilityDescriptor` and its closed metadata enums
//! - `catalog` - the immutable `CapabilityCatalog` (built-in descriptor
//!   table plus the pairwise synergy matrix)
//!
//! The catalog is constructed once per process and injected into the
//! planner/executor; it is pure lookup with no mutation after construction.

pub mod catalog;
pub mod descriptor;

pub use catalog::CapabilityCatalog;
pub use descriptor::{CapabilityDescriptor, Category, LanguageSupport, ResourceLevel};

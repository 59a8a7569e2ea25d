//! Capability Invocation Contract
//!
//! Defines the uniform invocation contract every analysis capability (tool or
//! playbook) satisfies, with split definition/invocation traits:
//!
//! - `CapabilityDefinition` - Identity and kind metadata
//! - `CapabilityInvoke` - Invocation capability
//! - `Capability` - Combined trait (auto-implemented via blanket impl)
//! - `CapabilityRegistry` - O(1) lookup registry with ordered iteration
//!
//! The split design lets the planner reason about identities without pulling
//! in invocation machinery, and keeps test doubles trivial.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::AnalysisContext;
use crate::error::{ReviewError, ReviewResult};
use crate::result::AnalysisResult;

/// Kind of an analysis capability. Closed set: there is no mock fallback
/// variant; an unregistered capability name is a configuration error caught
/// at plan-construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// A broad analysis tool (e.g. a security scanner)
    Tool,
    /// A capability specialized to a narrow issue pattern; may declare
    /// other capabilities as prerequisites
    Playbook,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityKind::Tool => write!(f, "tool"),
            CapabilityKind::Playbook => write!(f, "playbook"),
        }
    }
}

/// Capability identity metadata.
///
/// Provides identity information without requiring invocation capability,
/// so definition-only consumers (planning, reporting) don't need the
/// invocation infrastructure.
pub trait CapabilityDefinition: Send + Sync {
    /// Unique name of this capability (e.g. "security_scanner").
    fn name(&self) -> &str;

    /// Whether this capability is a tool or a playbook.
    fn kind(&self) -> CapabilityKind;

    /// Human-readable description of what this capability analyzes.
    fn description(&self) -> &str;
}

/// Capability invocation trait.
///
/// `config` is an open key-value map whose keys are capability-specific
/// (e.g. overridden numeric thresholds). Implementations should return a
/// failed-status result for recoverable analysis failures and reserve `Err`
/// for genuine invocation errors.
#[async_trait]
pub trait CapabilityInvoke: Send + Sync {
    /// Run the analysis against the given context.
    async fn invoke(
        &self,
        ctx: &AnalysisContext,
        config: &HashMap<String, Value>,
    ) -> ReviewResult<AnalysisResult>;
}

/// Combined trait for capabilities that provide both definition and
/// invocation. Most capabilities implement this combined trait.
pub trait Capability: CapabilityDefinition + CapabilityInvoke {}

// Blanket implementation: anything that implements both traits is a Capability
impl<T: CapabilityDefinition + CapabilityInvoke> Capability for T {}

/// Registry for `Capability` implementations.
///
/// Provides O(1) lookup by name and ordered iteration. Constructed once at
/// startup and injected into the orchestrator; read-only thereafter.
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
    /// Insertion order for deterministic iteration.
    order: Vec<String>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a capability. Replaces any existing capability with the same name.
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        let name = capability.name().to_string();
        if !self.capabilities.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.capabilities.insert(name, capability);
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    /// Check if a capability is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Get all capability names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Invoke a capability by name.
    ///
    /// Returns `Err(ReviewError::NotFound)` if the capability is not registered.
    pub async fn invoke(
        &self,
        name: &str,
        ctx: &AnalysisContext,
        config: &HashMap<String, Value>,
    ) -> ReviewResult<AnalysisResult> {
        match self.capabilities.get(name) {
            Some(capability) => capability.invoke(ctx, config).await,
            None => Err(ReviewError::not_found(format!(
                "Capability not found: {}",
                name
            ))),
        }
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProjectInfo;
    use crate::result::Severity;

    struct StubCapability {
        cap_name: String,
        cap_kind: CapabilityKind,
    }

    impl StubCapability {
        fn new(name: &str, kind: CapabilityKind) -> Self {
            Self {
                cap_name: name.to_string(),
                cap_kind: kind,
            }
        }
    }

    impl CapabilityDefinition for StubCapability {
        fn name(&self) -> &str {
            &self.cap_name
        }

        fn kind(&self) -> CapabilityKind {
            self.cap_kind
        }

        fn description(&self) -> &str {
            "stub capability"
        }
    }

    #[async_trait]
    impl CapabilityInvoke for StubCapability {
        async fn invoke(
            &self,
            _ctx: &AnalysisContext,
            _config: &HashMap<String, Value>,
        ) -> ReviewResult<AnalysisResult> {
            Ok(AnalysisResult::completed(
                &self.cap_name,
                Severity::Low,
                "stub",
                "stub result",
            ))
        }
    }

    struct FailingCapability;

    impl CapabilityDefinition for FailingCapability {
        fn name(&self) -> &str {
            "failing"
        }

        fn kind(&self) -> CapabilityKind {
            CapabilityKind::Tool
        }

        fn description(&self) -> &str {
            "always fails"
        }
    }

    #[async_trait]
    impl CapabilityInvoke for FailingCapability {
        async fn invoke(
            &self,
            _ctx: &AnalysisContext,
            _config: &HashMap<String, Value>,
        ) -> ReviewResult<AnalysisResult> {
            Err(ReviewError::capability("boom"))
        }
    }

    fn make_context() -> AnalysisContext {
        AnalysisContext::new("task-1", ProjectInfo::default(), "col-1")
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(StubCapability::new(
            "static_analyzer",
            CapabilityKind::Tool,
        )));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("static_analyzer"));
        assert_eq!(
            registry.get("static_analyzer").unwrap().kind(),
            CapabilityKind::Tool
        );
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_registry_names_preserve_insertion_order() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(StubCapability::new("b", CapabilityKind::Tool)));
        registry.register(Arc::new(StubCapability::new("a", CapabilityKind::Playbook)));
        assert_eq!(registry.names(), vec!["b", "a"]);
    }

    #[test]
    fn test_registry_register_replaces_existing() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(StubCapability::new("x", CapabilityKind::Tool)));
        registry.register(Arc::new(StubCapability::new("x", CapabilityKind::Playbook)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("x").unwrap().kind(), CapabilityKind::Playbook);
    }

    #[tokio::test]
    async fn test_registry_invoke_known_capability() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(StubCapability::new("echo", CapabilityKind::Tool)));

        let ctx = make_context();
        let result = registry
            .invoke("echo", &ctx, &HashMap::new())
            .await
            .unwrap();
        assert_eq!(result.capability, "echo");
    }

    #[tokio::test]
    async fn test_registry_invoke_unknown_capability() {
        let registry = CapabilityRegistry::new();
        let ctx = make_context();
        let result = registry.invoke("unknown", &ctx, &HashMap::new()).await;
        assert!(matches!(result, Err(ReviewError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_registry_invoke_failing_capability() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(FailingCapability));

        let ctx = make_context();
        let result = registry.invoke("failing", &ctx, &HashMap::new()).await;
        assert!(matches!(result, Err(ReviewError::Capability(_))));
    }

    #[test]
    fn test_capability_as_trait_object() {
        let cap: Arc<dyn Capability> =
            Arc::new(StubCapability::new("trait_obj", CapabilityKind::Playbook));
        assert_eq!(cap.name(), "trait_obj");
        assert_eq!(cap.kind(), CapabilityKind::Playbook);
    }
}

//! Per-resource-type rule builders.

use std::collections::HashMap;
use std::sync::Arc;

use authz_policy_sdk::{ResourceType, RuleBuilder};

/// Maps each resource type to the builder of its local rules.
///
/// Types without a builder only inherit from their parent.
#[derive(Clone, Default)]
pub struct RuleBuilderRegistry {
    builders: HashMap<ResourceType, Arc<dyn RuleBuilder>>,
}

impl RuleBuilderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `builder` for `resource_type`, replacing any previous one.
    #[must_use]
    pub fn with(mut self, resource_type: ResourceType, builder: Arc<dyn RuleBuilder>) -> Self {
        self.register(resource_type, builder);
        self
    }

    pub fn register(&mut self, resource_type: ResourceType, builder: Arc<dyn RuleBuilder>) {
        if self.builders.insert(resource_type.clone(), builder).is_some() {
            tracing::warn!(%resource_type, "replacing rule builder");
        }
    }

    #[must_use]
    pub fn get(&self, resource_type: &ResourceType) -> Option<&Arc<dyn RuleBuilder>> {
        self.builders.get(resource_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl std::fmt::Debug for RuleBuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.builders.keys().map(ResourceType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("RuleBuilderRegistry")
            .field("types", &types)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use authz_policy_sdk::well_known::resource_types;
    use authz_policy_sdk::{AuthorizationPolicy, AuthzPolicyError, LocalRules, ResourceNode};

    struct Empty;

    #[async_trait]
    impl RuleBuilder for Empty {
        async fn build_rules(
            &self,
            _node: &ResourceNode,
            _parent: Option<&AuthorizationPolicy>,
        ) -> Result<LocalRules, AuthzPolicyError> {
            Ok(LocalRules::new())
        }
    }

    #[test]
    fn lookup_by_type() {
        let registry = RuleBuilderRegistry::new()
            .with(resource_types::SPACE, Arc::new(Empty))
            .with(resource_types::CALLOUT, Arc::new(Empty));

        assert_eq!(registry.len(), 2);
        assert!(registry.get(&resource_types::SPACE).is_some());
        assert!(registry.get(&resource_types::LICENSE).is_none());
        assert_eq!(
            format!("{registry:?}"),
            "RuleBuilderRegistry { types: [\"callout\", \"space\"] }"
        );
    }
}

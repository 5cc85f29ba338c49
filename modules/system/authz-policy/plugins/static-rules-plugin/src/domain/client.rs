//! `ResourceGraph` and `RuleBuilder` implementations for the static rules plugin.

use async_trait::async_trait;
use authz_policy_sdk::{
    AuthorizationPolicy, AuthzPolicyError, LocalRules, ResourceGraph, ResourceNode, RuleBuilder,
};

use super::service::Service;

#[async_trait]
impl ResourceGraph for Service {
    async fn children_of(&self, node: &ResourceNode) -> Result<Vec<ResourceNode>, AuthzPolicyError> {
        self.children(node)
    }
}

#[async_trait]
impl RuleBuilder for Service {
    async fn build_rules(
        &self,
        node: &ResourceNode,
        _parent: Option<&AuthorizationPolicy>,
    ) -> Result<LocalRules, AuthzPolicyError> {
        self.local_rules(node)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::StaticRulesPluginConfig;

    const YAML: &str = r"
resources:
  - id: 00000000-0000-0000-0000-000000000001
    type: space
  - id: 00000000-0000-0000-0000-000000000002
    type: collaboration
    parent: 00000000-0000-0000-0000-000000000001
rules:
  space:
    anonymous_read_access: true
";

    #[tokio::test]
    async fn plugin_traits_serve_tree_and_rules() {
        let cfg: StaticRulesPluginConfig = serde_saphyr::from_str(YAML).unwrap();
        let service = Service::from_config(cfg).unwrap();
        let space = service.roots()[0].clone();

        let graph: &dyn ResourceGraph = &service;
        let children = graph.children_of(&space).await.unwrap();
        assert_eq!(children.len(), 1);

        let builder: &dyn RuleBuilder = &service;
        let local = builder.build_rules(&space, None).await.unwrap();
        assert_eq!(local.anonymous_read_access, Some(true));
        assert!(builder.build_rules(&children[0], None).await.unwrap().credential_rules.is_empty());
    }
}

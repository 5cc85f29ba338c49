//! Service implementation for the static rules plugin.

use std::collections::{HashMap, HashSet};

use authz_policy_sdk::{
    AuthzPolicyError, CredentialGrant, CredentialRule, LocalRules, PrivilegeRule, ResourceNode,
    ResourceType, Scope,
};
use tracing::info;
use uuid::Uuid;

use crate::config::{CredentialRuleTemplate, RuleTemplate, ScopeTemplate, StaticRulesPluginConfig};

/// Resource tree and rule templates loaded from config.
pub struct Service {
    nodes: HashMap<Uuid, ResourceNode>,
    parents: HashMap<Uuid, Uuid>,
    children: HashMap<Uuid, Vec<ResourceNode>>,
    roots: Vec<ResourceNode>,
    rules: HashMap<ResourceType, RuleTemplate>,
}

impl Service {
    /// Build the tree from config.
    ///
    /// # Errors
    ///
    /// Fails on duplicate resource ids, or a parent that is not listed before
    /// its child.
    pub fn from_config(cfg: StaticRulesPluginConfig) -> anyhow::Result<Self> {
        let mut nodes = HashMap::with_capacity(cfg.resources.len());
        let mut parents = HashMap::new();
        let mut children: HashMap<Uuid, Vec<ResourceNode>> = HashMap::new();
        let mut roots = Vec::new();

        for resource in cfg.resources {
            let node = ResourceNode::new(resource.resource_type, resource.id);
            if nodes.contains_key(&node.id) {
                anyhow::bail!("duplicate resource id {}", node.id);
            }
            match resource.parent {
                Some(parent) => {
                    if !nodes.contains_key(&parent) {
                        anyhow::bail!(
                            "parent {parent} of {node} must be listed before it"
                        );
                    }
                    parents.insert(node.id, parent);
                    children.entry(parent).or_default().push(node.clone());
                }
                None => roots.push(node.clone()),
            }
            nodes.insert(node.id, node);
        }

        let rules: HashMap<ResourceType, RuleTemplate> = cfg.rules.into_iter().collect();
        info!(
            resources = nodes.len(),
            roots = roots.len(),
            rule_templates = rules.len(),
            "Loaded static resource tree"
        );

        Ok(Self {
            nodes,
            parents,
            children,
            roots,
            rules,
        })
    }

    #[must_use]
    pub fn node(&self, id: Uuid) -> Option<&ResourceNode> {
        self.nodes.get(&id)
    }

    /// Resources without a parent, in config order.
    #[must_use]
    pub fn roots(&self) -> &[ResourceNode] {
        &self.roots
    }

    #[must_use]
    pub fn parent_of(&self, id: Uuid) -> Option<&ResourceNode> {
        self.parents.get(&id).and_then(|parent| self.nodes.get(parent))
    }

    /// Resource types with a rule template, sorted.
    #[must_use]
    pub fn rule_types(&self) -> Vec<ResourceType> {
        let mut types: Vec<ResourceType> = self.rules.keys().cloned().collect();
        types.sort();
        types
    }

    /// Direct children of `node` in config order.
    ///
    /// # Errors
    ///
    /// `RelationshipNotLoaded` if `node` is not part of the tree.
    pub fn children(&self, node: &ResourceNode) -> Result<Vec<ResourceNode>, AuthzPolicyError> {
        if !self.nodes.contains_key(&node.id) {
            return Err(AuthzPolicyError::relationship_not_loaded(
                node.id,
                "children",
                "resource not registered",
            ));
        }
        Ok(self.children.get(&node.id).cloned().unwrap_or_default())
    }

    /// Instantiate the template of `node`'s type for `node`.
    ///
    /// # Errors
    ///
    /// `RelationshipNotLoaded` if a `parent` scope is used on a node without one.
    pub fn local_rules(&self, node: &ResourceNode) -> Result<LocalRules, AuthzPolicyError> {
        let Some(template) = self.rules.get(&node.resource_type) else {
            return Ok(LocalRules::new());
        };

        let mut local = LocalRules::new();
        for rule in &template.credential_rules {
            local = local.credential_rule(self.credential_rule(node, rule)?);
        }
        for rule in &template.privilege_rules {
            local = local.privilege_rule(PrivilegeRule::new(
                rule.name.clone(),
                rule.source.clone(),
                rule.granted.iter().cloned(),
            ));
        }
        if let Some(anonymous_read_access) = template.anonymous_read_access {
            local = local.anonymous_read_access(anonymous_read_access);
        }
        for (child_type, rules) in &template.child_rules {
            for rule in rules {
                local = local.child_rule(child_type.clone(), self.credential_rule(node, rule)?);
            }
        }
        Ok(local)
    }

    fn credential_rule(
        &self,
        node: &ResourceNode,
        template: &CredentialRuleTemplate,
    ) -> Result<CredentialRule, AuthzPolicyError> {
        let mut seen = HashSet::new();
        let mut criteria = Vec::with_capacity(template.criteria.len());
        for criterion in &template.criteria {
            let grant =
                CredentialGrant::new(criterion.credential_type.clone(), self.scope(node, criterion.scope)?);
            if seen.insert(grant.clone()) {
                criteria.push(grant);
            }
        }
        Ok(CredentialRule::new(
            template.name.clone(),
            template.privileges.iter().cloned(),
            criteria,
        )
        .with_cascade(template.cascade))
    }

    fn scope(&self, node: &ResourceNode, template: ScopeTemplate) -> Result<Scope, AuthzPolicyError> {
        Ok(match template {
            ScopeTemplate::Platform => Scope::Platform,
            ScopeTemplate::Node => Scope::Resource(node.id),
            ScopeTemplate::Parent => {
                let parent = self.parents.get(&node.id).ok_or_else(|| {
                    AuthzPolicyError::relationship_not_loaded(node.id, "parent", "resource has no parent")
                })?;
                Scope::Resource(*parent)
            }
            ScopeTemplate::Resource(id) => Scope::Resource(id),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{CriterionTemplate, ResourceConfig};
    use authz_policy_sdk::well_known::{credentials, privileges, resource_types};

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn resource(n: u128, resource_type: ResourceType, parent: Option<u128>) -> ResourceConfig {
        ResourceConfig {
            id: id(n),
            resource_type,
            parent: parent.map(id),
        }
    }

    fn member_rule(name: &str, scope: ScopeTemplate) -> CredentialRuleTemplate {
        CredentialRuleTemplate {
            name: name.to_owned(),
            privileges: vec![privileges::READ],
            criteria: vec![CriterionTemplate {
                credential_type: credentials::SPACE_MEMBER,
                scope,
            }],
            cascade: true,
        }
    }

    fn tree() -> StaticRulesPluginConfig {
        let mut cfg = StaticRulesPluginConfig {
            resources: vec![
                resource(1, resource_types::SPACE, None),
                resource(2, resource_types::COLLABORATION, Some(1)),
                resource(3, resource_types::CALLOUT, Some(2)),
                resource(4, resource_types::TIMELINE, Some(2)),
            ],
            ..StaticRulesPluginConfig::default()
        };
        cfg.rules.insert(
            resource_types::CALLOUT,
            RuleTemplate {
                credential_rules: vec![
                    member_rule("self", ScopeTemplate::Node),
                    member_rule("parent", ScopeTemplate::Parent),
                ],
                ..RuleTemplate::default()
            },
        );
        cfg.rules.insert(
            resource_types::SPACE,
            RuleTemplate {
                credential_rules: vec![member_rule("parent", ScopeTemplate::Parent)],
                ..RuleTemplate::default()
            },
        );
        cfg
    }

    #[test]
    fn builds_tree_in_config_order() {
        let svc = Service::from_config(tree()).unwrap();

        assert_eq!(svc.roots().len(), 1);
        assert_eq!(svc.parent_of(id(3)).map(|n| n.id), Some(id(2)));
        let collaboration = svc.node(id(2)).unwrap().clone();
        let children: Vec<Uuid> = svc.children(&collaboration).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(children, vec![id(3), id(4)]);
        assert_eq!(svc.rule_types(), vec![resource_types::CALLOUT, resource_types::SPACE]);
    }

    #[test]
    fn rejects_bad_trees() {
        let mut cfg = tree();
        cfg.resources.push(resource(2, resource_types::CALLOUT, Some(1)));
        assert!(Service::from_config(cfg).is_err());

        let cfg = StaticRulesPluginConfig {
            resources: vec![
                resource(2, resource_types::COLLABORATION, Some(1)),
                resource(1, resource_types::SPACE, None),
            ],
            ..StaticRulesPluginConfig::default()
        };
        assert!(Service::from_config(cfg).is_err());
    }

    #[test]
    fn unknown_node_children_are_not_loaded() {
        let svc = Service::from_config(tree()).unwrap();
        let stranger = ResourceNode::new(resource_types::CALLOUT, id(99));
        let err = svc.children(&stranger).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn scopes_resolve_per_node() {
        let svc = Service::from_config(tree()).unwrap();
        let callout = svc.node(id(3)).unwrap().clone();

        let local = svc.local_rules(&callout).unwrap();
        assert_eq!(local.credential_rules[0].criteria[0].scope, Scope::Resource(id(3)));
        assert_eq!(local.credential_rules[1].criteria[0].scope, Scope::Resource(id(2)));

        let timeline = svc.node(id(4)).unwrap().clone();
        assert_eq!(svc.local_rules(&timeline).unwrap(), LocalRules::new());
    }

    #[test]
    fn parent_scope_on_root_fails() {
        let svc = Service::from_config(tree()).unwrap();
        let space = svc.node(id(1)).unwrap().clone();
        assert!(matches!(
            svc.local_rules(&space),
            Err(AuthzPolicyError::RelationshipNotLoaded { .. })
        ));
    }
}

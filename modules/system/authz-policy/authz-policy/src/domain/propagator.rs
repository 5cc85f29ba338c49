//! Reset, inherit, extend and persist policies down the resource tree.

use std::collections::HashMap;
use std::sync::Arc;

use authz_policy_sdk::{
    AuthorizationPolicy, AuthzPolicyError, ChildRules, PolicyStore, PrivilegeEvaluator,
    ResourceGraph, ResourceNode, ResourceType,
};
use tracing::debug;

use super::error::DomainError;
use super::registry::RuleBuilderRegistry;

/// Result of one propagation walk.
#[derive(Debug, Clone)]
pub struct PropagationOutcome {
    /// The resolved policy of the start node.
    pub policy: AuthorizationPolicy,
    /// Number of records persisted by the walk.
    pub updated: usize,
}

/// A node waiting to be resolved, with the policy it inherits from.
struct Pending {
    node: ResourceNode,
    parent: Arc<AuthorizationPolicy>,
}

/// Walks a subtree depth-first, resolving and persisting each node's policy
/// before its children are visited.
pub struct PolicyPropagator {
    store: Arc<dyn PolicyStore>,
    graph: Arc<dyn ResourceGraph>,
    builders: RuleBuilderRegistry,
    evaluator: PrivilegeEvaluator,
}

impl PolicyPropagator {
    #[must_use]
    pub fn new(
        store: Arc<dyn PolicyStore>,
        graph: Arc<dyn ResourceGraph>,
        builders: RuleBuilderRegistry,
        evaluator: PrivilegeEvaluator,
    ) -> Self {
        Self {
            store,
            graph,
            builders,
            evaluator,
        }
    }

    /// Propagate from `root`. `parent` is the already-resolved policy of the
    /// root's parent; `None` for a tree root.
    ///
    /// Stops at the first failure. Nodes persisted before it stay persisted;
    /// the failing node and everything after it are left untouched.
    ///
    /// # Errors
    ///
    /// [`DomainError::Propagation`] naming the node that failed.
    pub async fn apply_policy(
        &self,
        root: &ResourceNode,
        parent: Option<&AuthorizationPolicy>,
    ) -> Result<PropagationOutcome, DomainError> {
        let mut stack = Vec::new();

        let root_policy = self.visit(root, parent, &mut stack).await?;
        let mut updated = 1;

        while let Some(Pending { node, parent }) = stack.pop() {
            self.visit(&node, Some(&*parent), &mut stack).await?;
            updated += 1;
        }

        Ok(PropagationOutcome {
            policy: Arc::unwrap_or_clone(root_policy),
            updated,
        })
    }

    /// Resolve and persist one node, then push its children.
    async fn visit(
        &self,
        node: &ResourceNode,
        parent: Option<&AuthorizationPolicy>,
        stack: &mut Vec<Pending>,
    ) -> Result<Arc<AuthorizationPolicy>, DomainError> {
        let fail = |source| DomainError::propagation(node, source);

        let (policy, child_rules) = self.resolve(node, parent).await.map_err(fail)?;
        self.store.save(&policy).await.map_err(fail)?;

        debug!(
            resource_id = %node.id,
            resource_type = %node.resource_type,
            credential_rules = policy.credential_rules.len(),
            privilege_rules = policy.privilege_rules.len(),
            anonymous_read_access = policy.anonymous_read_access,
            "policy resolved"
        );

        let policy = Arc::new(policy);
        let variants = child_variants(&policy, child_rules).map_err(fail)?;

        let mut children = self.graph.children_of(node).await.map_err(fail)?;
        children.sort_by(|a, b| a.resource_type.cmp(&b.resource_type));

        // Reversed so the first child is popped first.
        for child in children.into_iter().rev() {
            let parent = variants
                .get(&child.resource_type)
                .map_or_else(|| Arc::clone(&policy), Arc::clone);
            stack.push(Pending {
                node: child,
                parent,
            });
        }

        Ok(policy)
    }

    async fn resolve(
        &self,
        node: &ResourceNode,
        parent: Option<&AuthorizationPolicy>,
    ) -> Result<(AuthorizationPolicy, Vec<ChildRules>), AuthzPolicyError> {
        let mut policy = self
            .store
            .load(node.id)
            .await?
            .unwrap_or_else(|| AuthorizationPolicy::new(node));
        policy.resource_type = node.resource_type.clone();

        policy.reset();
        if let Some(parent) = parent {
            policy.inherit_from(parent);
        }

        let child_rules = match self.builders.get(&node.resource_type) {
            Some(builder) => {
                let local = builder.build_rules(node, parent).await?;
                policy.append_credential_rules(local.credential_rules)?;
                policy.append_privilege_rules(local.privilege_rules);
                if let Some(anonymous_read_access) = local.anonymous_read_access {
                    policy.anonymous_read_access = anonymous_read_access;
                }
                local.child_rules
            }
            None => {
                debug!(resource_type = %node.resource_type, "no rule builder, inheriting only");
                Vec::new()
            }
        };

        self.evaluator
            .validate_privilege_rules(&policy.privilege_rules)?;

        Ok((policy, child_rules))
    }
}

/// Non-persisted parent inputs for children of specific types: the resolved
/// policy plus the extra rules the builder attached for that child type.
fn child_variants(
    policy: &Arc<AuthorizationPolicy>,
    child_rules: Vec<ChildRules>,
) -> Result<HashMap<ResourceType, Arc<AuthorizationPolicy>>, AuthzPolicyError> {
    let mut variants = HashMap::with_capacity(child_rules.len());
    for ChildRules {
        child_type,
        credential_rules,
    } in child_rules
    {
        let mut variant = AuthorizationPolicy::clone(policy);
        variant.append_credential_rules(credential_rules)?;
        variants.insert(child_type, Arc::new(variant));
    }
    Ok(variants)
}

//! Traits the engine consumes from its environment.
//!
//! Storage, the resource tree and the business rules per resource type live
//! outside the engine; plugins implement these traits to supply them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthzPolicyError;
use crate::models::{AuthorizationPolicy, LocalRules, ResourceNode};

/// Persistence of policy records.
///
/// `save` must replace the whole record atomically: concurrent readers see
/// either the previous or the new record, never a mix.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Load the record owned by `resource_id`, `None` if there is none.
    async fn load(&self, resource_id: Uuid) -> Result<Option<AuthorizationPolicy>, AuthzPolicyError>;

    async fn save(&self, policy: &AuthorizationPolicy) -> Result<(), AuthzPolicyError>;

    /// Delete the record owned by `resource_id`; `true` if one existed.
    async fn delete(&self, resource_id: Uuid) -> Result<bool, AuthzPolicyError>;
}

/// The resource tree.
#[async_trait]
pub trait ResourceGraph: Send + Sync {
    /// Direct children of `node` in a stable order.
    ///
    /// Fails with `RelationshipNotLoaded` when the children cannot be resolved.
    async fn children_of(&self, node: &ResourceNode) -> Result<Vec<ResourceNode>, AuthzPolicyError>;
}

/// Business rules of one resource type.
///
/// Must not mutate policies; it may read external business context (role
/// sets, settings, licensing) and the already-resolved parent policy.
#[async_trait]
pub trait RuleBuilder: Send + Sync {
    async fn build_rules(
        &self,
        node: &ResourceNode,
        parent: Option<&AuthorizationPolicy>,
    ) -> Result<LocalRules, AuthzPolicyError>;
}

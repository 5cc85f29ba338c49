//! Public API trait for the `authz_policy` module.

use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthzPolicyError;
use crate::models::{AuthorizationPolicy, CredentialGrant, Privilege, ResourceNode};

/// Propagation and access-decision entry points.
///
/// Consumed by request handlers (decisions) and by resource-lifecycle code
/// (propagation after creation, role or settings changes):
///
/// ```ignore
/// let authz: Arc<dyn AuthzPolicyClient> = module.client()?;
///
/// authz.apply_policy(&space).await?;
/// authz
///     .grant_or_fail(callout_id, &credentials, &privileges::UPDATE, "update callout")
///     .await?;
/// ```
#[async_trait]
pub trait AuthzPolicyClient: Send + Sync {
    /// Re-propagate policies from a root resource down its whole subtree.
    ///
    /// # Errors
    ///
    /// - `RelationshipNotLoaded` if a child could not be loaded (retryable)
    /// - `RuleAuthoring` if a rule builder produced an invalid rule set
    /// - `Storage` if a record could not be loaded or saved (retryable)
    async fn apply_policy(&self, root: &ResourceNode)
    -> Result<AuthorizationPolicy, AuthzPolicyError>;

    /// Re-propagate from an inner resource, inheriting from `parent`'s resolved policy.
    ///
    /// # Errors
    ///
    /// Same as [`AuthzPolicyClient::apply_policy`].
    async fn apply_policy_with_parent(
        &self,
        node: &ResourceNode,
        parent: &AuthorizationPolicy,
    ) -> Result<AuthorizationPolicy, AuthzPolicyError>;

    /// Whether `credentials` hold `privilege` on the resource.
    ///
    /// # Errors
    ///
    /// - `PolicyNotInitialized` if the resource has no policy record
    /// - `RuleAuthoring` on a broken privilege rule catalog
    async fn is_granted(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
        privilege: &Privilege,
    ) -> Result<bool, AuthzPolicyError>;

    /// Fail with `AccessDenied` unless `credentials` hold `privilege` on the resource.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` if the privilege is not held
    /// - `PolicyNotInitialized` if the resource has no (or an unpropagated) policy
    /// - `RuleAuthoring` on a broken privilege rule catalog
    async fn grant_or_fail(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
        privilege: &Privilege,
        context: &str,
    ) -> Result<(), AuthzPolicyError>;

    /// Every privilege `credentials` hold on the resource.
    ///
    /// # Errors
    ///
    /// Same as [`AuthzPolicyClient::is_granted`].
    async fn granted_privileges(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
    ) -> Result<BTreeSet<Privilege>, AuthzPolicyError>;

    /// Drop the policy record of a destroyed resource. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// `Storage` if the store fails.
    async fn remove_policy(&self, resource_id: Uuid) -> Result<bool, AuthzPolicyError>;
}

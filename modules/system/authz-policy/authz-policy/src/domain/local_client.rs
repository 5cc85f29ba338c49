//! Local (in-process) client for the `authz_policy` module.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use authz_policy_sdk::{
    AuthorizationPolicy, AuthzPolicyClient, AuthzPolicyError, CredentialGrant, Privilege,
    ResourceNode,
};
use uuid::Uuid;

use super::{DomainError, Service};

/// Local client wrapping the policy service.
pub struct AuthzPolicyLocalClient {
    svc: Arc<Service>,
}

impl AuthzPolicyLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AuthzPolicyError {
    match e.kind() {
        AuthzPolicyError::AccessDenied { .. } | AuthzPolicyError::PolicyNotInitialized { .. } => {}
        kind => {
            tracing::error!(
                operation = op,
                retryable = kind.is_retryable(),
                error = %e,
                "authz_policy call failed"
            );
        }
    }
    e.into()
}

#[async_trait]
impl AuthzPolicyClient for AuthzPolicyLocalClient {
    async fn apply_policy(
        &self,
        root: &ResourceNode,
    ) -> Result<AuthorizationPolicy, AuthzPolicyError> {
        self.svc
            .apply_policy(root, None)
            .await
            .map_err(|e| log_and_convert("apply_policy", e))
    }

    async fn apply_policy_with_parent(
        &self,
        node: &ResourceNode,
        parent: &AuthorizationPolicy,
    ) -> Result<AuthorizationPolicy, AuthzPolicyError> {
        self.svc
            .apply_policy(node, Some(parent))
            .await
            .map_err(|e| log_and_convert("apply_policy_with_parent", e))
    }

    async fn is_granted(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
        privilege: &Privilege,
    ) -> Result<bool, AuthzPolicyError> {
        self.svc
            .is_granted(resource_id, credentials, privilege)
            .await
            .map_err(|e| log_and_convert("is_granted", e))
    }

    async fn grant_or_fail(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
        privilege: &Privilege,
        context: &str,
    ) -> Result<(), AuthzPolicyError> {
        self.svc
            .grant_or_fail(resource_id, credentials, privilege, context)
            .await
            .map_err(|e| log_and_convert("grant_or_fail", e))
    }

    async fn granted_privileges(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
    ) -> Result<BTreeSet<Privilege>, AuthzPolicyError> {
        self.svc
            .granted_privileges(resource_id, credentials)
            .await
            .map_err(|e| log_and_convert("granted_privileges", e))
    }

    async fn remove_policy(&self, resource_id: Uuid) -> Result<bool, AuthzPolicyError> {
        self.svc
            .remove_policy(resource_id)
            .await
            .map_err(|e| log_and_convert("remove_policy", e))
    }
}

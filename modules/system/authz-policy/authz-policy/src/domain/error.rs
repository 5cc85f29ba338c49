//! Domain errors for the authz_policy engine.

use authz_policy_sdk::{AuthzPolicyError, ResourceNode, ResourceType};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Propagation stopped at a specific node.
    #[error("policy propagation failed at {resource_type} {resource_id}: {source}")]
    Propagation {
        resource_id: Uuid,
        resource_type: ResourceType,
        #[source]
        source: AuthzPolicyError,
    },

    #[error(transparent)]
    Policy(#[from] AuthzPolicyError),
}

impl DomainError {
    pub(crate) fn propagation(node: &ResourceNode, source: AuthzPolicyError) -> Self {
        Self::Propagation {
            resource_id: node.id,
            resource_type: node.resource_type.clone(),
            source,
        }
    }

    /// The SDK error this failure surfaces as.
    #[must_use]
    pub fn kind(&self) -> &AuthzPolicyError {
        match self {
            Self::Propagation { source, .. } => source,
            Self::Policy(e) => e,
        }
    }
}

impl From<authz_policy_sdk::RuleAuthoringError> for DomainError {
    fn from(e: authz_policy_sdk::RuleAuthoringError) -> Self {
        Self::Policy(e.into())
    }
}

impl From<DomainError> for AuthzPolicyError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Propagation { source, .. } => source,
            DomainError::Policy(e) => e,
        }
    }
}

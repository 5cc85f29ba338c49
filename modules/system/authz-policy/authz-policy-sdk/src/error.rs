//! Error types for the `authz_policy` module.

use uuid::Uuid;

use crate::models::Privilege;

/// A rule catalog that cannot be evaluated safely.
///
/// Always a bug in the rule-construction code; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleAuthoringError {
    /// The privilege closure was still growing when the pass cap was hit.
    #[error("privilege expansion on policy {policy_id} did not converge after {passes} passes")]
    ExpansionLimitExceeded { policy_id: Uuid, passes: usize },

    /// Privilege rules imply each other in a loop.
    #[error("privilege rules form a cycle through '{privilege}' (rules: {})", .rules.join(", "))]
    CyclicExpansion {
        privilege: Privilege,
        rules: Vec<String>,
    },

    /// Two credential rules with the same name on one policy.
    #[error("credential rule '{name}' already present on policy of resource {resource_id}")]
    DuplicateRuleName { name: String, resource_id: Uuid },
}

/// Errors surfaced by the `authz_policy` API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthzPolicyError {
    /// No policy record exists, or it was never propagated.
    #[error("authorization policy not initialized for resource {resource_id}")]
    PolicyNotInitialized { resource_id: Uuid },

    /// A related resource needed during propagation could not be loaded.
    #[error("unable to load {relation} of resource {resource_id}: {reason}")]
    RelationshipNotLoaded {
        resource_id: Uuid,
        relation: String,
        reason: String,
    },

    /// The principal lacks the required privilege.
    #[error("unable to grant '{privilege}' privilege: {context}")]
    AccessDenied { privilege: Privilege, context: String },

    #[error(transparent)]
    RuleAuthoring(#[from] RuleAuthoringError),

    /// The policy store failed to load or save a record.
    #[error("policy storage failure: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthzPolicyError {
    /// Build a [`AuthzPolicyError::RelationshipNotLoaded`].
    pub fn relationship_not_loaded(
        resource_id: Uuid,
        relation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RelationshipNotLoaded {
            resource_id,
            relation: relation.into(),
            reason: reason.into(),
        }
    }

    /// Whether re-running the same operation may succeed once the external fault is fixed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RelationshipNotLoaded { .. } | Self::Storage(_))
    }

    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::well_known::privileges;

    #[test]
    fn access_denied_message_names_privilege_and_context() {
        let err = AuthzPolicyError::AccessDenied {
            privilege: privileges::UPDATE,
            context: "update callout".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "unable to grant 'update' privilege: update callout"
        );
        assert!(err.is_access_denied());
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_kinds() {
        let err = AuthzPolicyError::relationship_not_loaded(Uuid::nil(), "children", "gone");
        assert!(err.is_retryable());
        assert!(AuthzPolicyError::Storage("down".to_owned()).is_retryable());
        assert!(!AuthzPolicyError::PolicyNotInitialized {
            resource_id: Uuid::nil()
        }
        .is_retryable());

        let authoring: AuthzPolicyError = RuleAuthoringError::CyclicExpansion {
            privilege: privileges::CREATE,
            rules: vec!["a".to_owned(), "b".to_owned()],
        }
        .into();
        assert!(!authoring.is_retryable());
        assert_eq!(
            authoring.to_string(),
            "privilege rules form a cycle through 'create' (rules: a, b)"
        );
    }
}

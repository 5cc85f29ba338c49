//! Propagation and access-decision service.

use std::collections::BTreeSet;
use std::sync::Arc;

use authz_policy_sdk::{
    AuthorizationPolicy, AuthzPolicyError, CredentialGrant, PolicyStore, Privilege,
    PrivilegeEvaluator, ResourceGraph, ResourceNode,
};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::error::DomainError;
use super::propagator::PolicyPropagator;
use super::registry::RuleBuilderRegistry;
use crate::config::AuthzPolicyConfig;

/// Runs propagations and answers access decisions against the policy store.
///
/// Propagations starting at the same node are serialized; decisions never wait
/// on a propagation.
pub struct Service {
    store: Arc<dyn PolicyStore>,
    propagator: PolicyPropagator,
    evaluator: PrivilegeEvaluator,
    config: AuthzPolicyConfig,
    in_flight: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl Service {
    #[must_use]
    pub fn new(
        config: AuthzPolicyConfig,
        store: Arc<dyn PolicyStore>,
        graph: Arc<dyn ResourceGraph>,
        builders: RuleBuilderRegistry,
    ) -> Self {
        let evaluator = PrivilegeEvaluator::new(config.max_expansion_passes);
        Self {
            propagator: PolicyPropagator::new(Arc::clone(&store), graph, builders, evaluator),
            store,
            evaluator,
            config,
            in_flight: DashMap::new(),
        }
    }

    /// Propagate from `node`, inheriting from `parent` when given.
    ///
    /// # Errors
    ///
    /// [`DomainError::Propagation`] naming the node where the walk stopped.
    #[instrument(
        skip_all,
        fields(resource_id = %node.id, resource_type = %node.resource_type)
    )]
    pub async fn apply_policy(
        &self,
        node: &ResourceNode,
        parent: Option<&AuthorizationPolicy>,
    ) -> Result<AuthorizationPolicy, DomainError> {
        let lock = Arc::clone(self.in_flight.entry(node.id).or_default().value());
        let result = {
            let _guard = lock.lock().await;
            self.propagator.apply_policy(node, parent).await
        };
        drop(lock);
        self.in_flight
            .remove_if(&node.id, |_, lock| Arc::strong_count(lock) == 1);

        let outcome = result?;
        if outcome.updated > self.config.large_propagation_threshold {
            warn!(
                updated = outcome.updated,
                threshold = self.config.large_propagation_threshold,
                "large policy propagation"
            );
        }
        info!(updated = outcome.updated, "policy propagated");

        Ok(outcome.policy)
    }

    /// # Errors
    ///
    /// `PolicyNotInitialized` if the resource has no record, `RuleAuthoring`
    /// on a broken rule catalog.
    #[instrument(skip(self, credentials), fields(resource_id = %resource_id, privilege = %privilege))]
    pub async fn is_granted(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
        privilege: &Privilege,
    ) -> Result<bool, DomainError> {
        if !self.config.enabled {
            return Ok(true);
        }
        let policy = self.load_policy(resource_id).await?;
        Ok(self
            .evaluator
            .is_granted(&policy, credentials, resource_id, privilege)?)
    }

    /// # Errors
    ///
    /// `AccessDenied` if the privilege is not held, otherwise as [`Self::is_granted`].
    #[instrument(skip(self, credentials, context), fields(resource_id = %resource_id, privilege = %privilege))]
    pub async fn grant_or_fail(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
        privilege: &Privilege,
        context: &str,
    ) -> Result<(), DomainError> {
        if !self.config.enabled {
            return Ok(());
        }
        let policy = self.load_policy(resource_id).await?;
        self.evaluator
            .grant_or_fail(&policy, credentials, resource_id, privilege, context)?;
        Ok(())
    }

    /// Every privilege `credentials` hold on the resource.
    ///
    /// With decisions disabled this still reports what the stored policy grants.
    ///
    /// # Errors
    ///
    /// Same as [`Self::is_granted`].
    #[instrument(skip(self, credentials), fields(resource_id = %resource_id))]
    pub async fn granted_privileges(
        &self,
        resource_id: Uuid,
        credentials: &[CredentialGrant],
    ) -> Result<BTreeSet<Privilege>, DomainError> {
        let policy = self.load_policy(resource_id).await?;
        Ok(self
            .evaluator
            .granted_privileges(&policy, credentials, resource_id)?)
    }

    /// # Errors
    ///
    /// `Storage` if the store fails.
    #[instrument(skip(self), fields(resource_id = %resource_id))]
    pub async fn remove_policy(&self, resource_id: Uuid) -> Result<bool, DomainError> {
        let removed = self.store.delete(resource_id).await?;
        if removed {
            info!("policy removed");
        }
        Ok(removed)
    }

    async fn load_policy(&self, resource_id: Uuid) -> Result<AuthorizationPolicy, DomainError> {
        self.store
            .load(resource_id)
            .await?
            .ok_or(DomainError::Policy(AuthzPolicyError::PolicyNotInitialized {
                resource_id,
            }))
    }
}

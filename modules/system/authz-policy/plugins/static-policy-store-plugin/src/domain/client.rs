//! `PolicyStore` implementation for the in-memory store.

use async_trait::async_trait;
use authz_policy_sdk::{AuthorizationPolicy, AuthzPolicyError, PolicyStore};
use uuid::Uuid;

use super::service::Service;

#[async_trait]
impl PolicyStore for Service {
    async fn load(&self, resource_id: Uuid) -> Result<Option<AuthorizationPolicy>, AuthzPolicyError> {
        Ok(self.get(resource_id))
    }

    async fn save(&self, policy: &AuthorizationPolicy) -> Result<(), AuthzPolicyError> {
        tracing::trace!(resource_id = %policy.resource_id, "saving policy");
        self.put(policy.clone());
        Ok(())
    }

    async fn delete(&self, resource_id: Uuid) -> Result<bool, AuthzPolicyError> {
        Ok(self.take(resource_id).is_some())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use authz_policy_sdk::ResourceNode;
    use authz_policy_sdk::well_known::resource_types;

    #[tokio::test]
    async fn store_trait_round_trips_records() {
        let service = Service::new();
        let store: &dyn PolicyStore = &service;
        let node = ResourceNode::new(resource_types::SPACE, Uuid::from_u128(42));

        assert!(store.load(node.id).await.unwrap().is_none());

        let policy = AuthorizationPolicy::new(&node);
        store.save(&policy).await.unwrap();
        assert_eq!(store.load(node.id).await.unwrap(), Some(policy));

        assert!(store.delete(node.id).await.unwrap());
        assert!(!store.delete(node.id).await.unwrap());
        assert!(store.load(node.id).await.unwrap().is_none());
    }
}

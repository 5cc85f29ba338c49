//! Service implementation for the in-memory policy store.

use std::collections::{BTreeMap, HashMap};

use authz_policy_sdk::AuthorizationPolicy;
use parking_lot::RwLock;
use uuid::Uuid;

/// In-memory policy records keyed by owning resource id.
#[derive(Default)]
pub struct Service {
    records: RwLock<HashMap<Uuid, AuthorizationPolicy>>,
}

impl Service {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record owned by `resource_id`.
    #[must_use]
    pub fn get(&self, resource_id: Uuid) -> Option<AuthorizationPolicy> {
        self.records.read().get(&resource_id).cloned()
    }

    /// Replace the record of `policy.resource_id`. Returns the previous one.
    pub fn put(&self, policy: AuthorizationPolicy) -> Option<AuthorizationPolicy> {
        self.records.write().insert(policy.resource_id, policy)
    }

    pub fn take(&self, resource_id: Uuid) -> Option<AuthorizationPolicy> {
        self.records.write().remove(&resource_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Copy of every record, ordered by resource id.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<Uuid, AuthorizationPolicy> {
        self.records
            .read()
            .iter()
            .map(|(id, policy)| (*id, policy.clone()))
            .collect()
    }
}

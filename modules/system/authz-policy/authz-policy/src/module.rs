//! `authz_policy` module wiring.

use std::sync::{Arc, OnceLock};

use authz_policy_sdk::{AuthzPolicyClient, PolicyStore, ResourceGraph};
use tracing::info;

use crate::config::AuthzPolicyConfig;
use crate::domain::{AuthzPolicyLocalClient, RuleBuilderRegistry, Service};

/// Collaborators the module is initialized with.
pub struct ModuleDeps {
    pub store: Arc<dyn PolicyStore>,
    pub graph: Arc<dyn ResourceGraph>,
    pub builders: RuleBuilderRegistry,
}

/// Authorization policy module.
///
/// This module:
/// 1. Reads its config block (defaults when absent)
/// 2. Builds the propagation and decision service over the given store,
///    resource graph and rule builders
/// 3. Hands out the local client consumers call through `Arc<dyn AuthzPolicyClient>`
#[derive(Default)]
pub struct AuthzPolicyModule {
    service: OnceLock<Arc<Service>>,
}

impl AuthzPolicyModule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the module and return its client.
    ///
    /// Plays the part of a host `Module::init`: `raw_config` stands in for
    /// the block `ModuleCtx::config()` would hand over, and the returned
    /// client is what would be registered with the client hub. The service
    /// is stored once so [`Self::client`] hands out clients over it later.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config block or when called twice.
    #[tracing::instrument(skip_all, fields(enabled))]
    pub fn init(
        &self,
        raw_config: Option<&serde_json::Value>,
        deps: ModuleDeps,
    ) -> anyhow::Result<Arc<dyn AuthzPolicyClient>> {
        let cfg = AuthzPolicyConfig::from_raw(raw_config)?;
        tracing::Span::current().record("enabled", cfg.enabled);
        info!(
            enabled = cfg.enabled,
            max_expansion_passes = cfg.max_expansion_passes,
            rule_builders = deps.builders.len(),
            "Initializing authz_policy"
        );
        if !cfg.enabled {
            info!("authz_policy decisions disabled, every access check is granted");
        }

        let svc = Arc::new(Service::new(cfg, deps.store, deps.graph, deps.builders));
        self.service
            .set(Arc::clone(&svc))
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        Ok(Arc::new(AuthzPolicyLocalClient::new(svc)))
    }

    /// Client over the initialized service.
    ///
    /// # Errors
    ///
    /// Fails if [`Self::init`] has not run.
    pub fn client(&self) -> anyhow::Result<Arc<dyn AuthzPolicyClient>> {
        let svc = self
            .service
            .get()
            .ok_or_else(|| anyhow::anyhow!("authz_policy module not initialized"))?;
        Ok(Arc::new(AuthzPolicyLocalClient::new(Arc::clone(svc))))
    }
}

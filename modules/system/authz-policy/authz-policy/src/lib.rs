//! Authorization policy engine.
//!
//! Propagates access policies down a resource tree and answers access
//! decisions against the stored records. Storage, the tree itself and the
//! per-type business rules are supplied through the SDK plugin traits.

pub mod config;
pub mod domain;
pub mod module;

pub use config::AuthzPolicyConfig;
pub use domain::{
    AuthzPolicyLocalClient, DomainError, PolicyPropagator, PropagationOutcome,
    RuleBuilderRegistry, Service,
};
pub use module::{AuthzPolicyModule, ModuleDeps};

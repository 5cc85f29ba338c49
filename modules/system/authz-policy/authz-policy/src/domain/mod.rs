//! Domain layer for the authz_policy engine.

pub mod error;
pub mod local_client;
pub mod propagator;
pub mod registry;
pub mod service;

pub use error::DomainError;
pub use local_client::AuthzPolicyLocalClient;
pub use propagator::{PolicyPropagator, PropagationOutcome};
pub use registry::RuleBuilderRegistry;
pub use service::Service;

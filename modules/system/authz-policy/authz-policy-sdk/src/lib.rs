//! AuthZ Policy SDK
//!
//! This crate provides the public API for the `authz_policy` module:
//!
//! - [`AuthzPolicyClient`] - Propagation and access-decision API for consumers
//! - [`PolicyStore`], [`ResourceGraph`], [`RuleBuilder`] - Traits the engine consumes
//! - [`AuthorizationPolicy`], [`CredentialRule`], [`PrivilegeRule`] - Policy model
//! - [`PrivilegeEvaluator`] - Pure rule evaluation (privilege closure)
//! - [`AuthzPolicyError`], [`RuleAuthoringError`] - Error types
//! - [`rules`] - Rule constructors for rule builders
//! - [`well_known`] - Privilege, credential and resource-type catalog values
//!
//! ## Usage
//!
//! ```ignore
//! use authz_policy_sdk::{AuthzPolicyClient, well_known::privileges};
//!
//! // After a membership change, re-propagate from the space
//! authz.apply_policy(&space).await?;
//!
//! // In a request handler
//! authz
//!     .grant_or_fail(callout_id, &agent.credentials, &privileges::UPDATE, "update callout")
//!     .await?;
//! ```

pub mod api;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod plugin_api;
pub mod rules;
pub mod well_known;

// Re-export main types at crate root
pub use api::AuthzPolicyClient;
pub use error::{AuthzPolicyError, RuleAuthoringError};
pub use evaluator::{DEFAULT_MAX_EXPANSION_PASSES, PrivilegeEvaluator};
pub use models::{
    AuthorizationPolicy, ChildRules, CredentialGrant, CredentialRule, CredentialType, LocalRules,
    Privilege, PrivilegeRule, ResourceNode, ResourceType, Scope,
};
pub use plugin_api::{PolicyStore, ResourceGraph, RuleBuilder};

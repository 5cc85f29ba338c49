//! Static rules plugin.
//!
//! Serves a resource tree and per-type rule templates from config. Criteria
//! scopes in a template are resolved against the node being propagated:
//! `platform`, `self`, `parent`, or a fixed resource id.

pub mod config;
pub mod domain;

pub use config::StaticRulesPluginConfig;
pub use domain::Service;

//! Domain layer for the static rules plugin.

pub mod client;
pub mod service;

pub use service::Service;

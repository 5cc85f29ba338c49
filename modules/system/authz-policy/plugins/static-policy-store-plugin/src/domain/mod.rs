//! Domain layer for the in-memory policy store.

pub mod client;
pub mod service;

pub use service::Service;

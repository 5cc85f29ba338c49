//! In-memory policy store plugin.
//!
//! Keeps one record per resource behind a lock; each save replaces the whole
//! record. Records are lost on restart.

pub mod domain;

pub use domain::Service;

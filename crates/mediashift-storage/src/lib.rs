//! Mediashift Storage Library
//!
//! This crate provides the object-store abstraction the migration engine
//! transfers through, and its S3 implementation.
//!
//! # Key format
//!
//! Object keys are `normalize(prefix) + basename(local_path)`, derived by
//! `mediashift_core::LocationRules`. Backends never invent keys of their own.

pub mod content_type;
pub mod factory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_object_store;
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStore;
pub use traits::{ObjectStore, StorageError, StorageResult};

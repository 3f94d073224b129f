//! Mediashift catalog access
//!
//! The migration engine talks to the media catalog through two narrow
//! collaborator traits: `CatalogScanner` (read-only discovery and counts) and
//! `CatalogMutator` (re-pointing stored locations). `PostgresCatalog`
//! implements both on top of sqlx.

pub mod catalog;
pub mod pool;

pub use catalog::postgres::PostgresCatalog;
pub use catalog::{effective_limit, CatalogMutator, CatalogScanner, DerivedLocations};
pub use pool::connect;

//! Core data model definitions shared across Aerocam crates.
//!
//! Everything in here is a plain value: records are snapshots built per
//! listing request and never mutated afterwards.
#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod facts;
pub mod listing;
pub mod photo;
pub mod query;
pub mod title_key;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{CatalogEntry, TitleCatalog};
pub use error::{ModelError, Result as ModelResult};
pub use facts::FileFact;
pub use listing::GalleryListing;
pub use photo::{CaptureSource, PhotoRecord};
pub use query::{GalleryQuery, SortBy, SortOrder};
pub use title_key::TitleKey;

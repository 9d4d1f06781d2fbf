//! Configuration for the Aerocam gallery.
//!
//! Values are composed from environment variables (after an optional `.env`
//! file), an `aerocam.toml` file, and built-in defaults, in that order of
//! precedence. Guard rails run on the composed result and either refuse the
//! configuration or attach warnings for the operator.
#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    Config, ConfigMetadata, CorsConfig, GalleryConfig, ServerConfig, UploadConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};

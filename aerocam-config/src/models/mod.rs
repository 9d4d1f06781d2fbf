pub mod sources;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aerocam_core::naming::Convention;
use aerocam_core::{GalleryOptions, NamingOptions, UploadPolicy};
use chrono_tz::Tz;

use crate::constants::DEFAULT_UPLOAD_TOKEN;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub gallery: GalleryConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn photo_dir(&self) -> &Path {
        &self.gallery.photo_dir
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub photo_dir: PathBuf,
    /// Always ends in `/`.
    pub url_prefix: String,
    pub timezone: Tz,
    pub separator: char,
    pub unknown_label: String,
    pub conventions: Vec<Convention>,
    pub numeric_labels: BTreeMap<u8, String>,
}

impl GalleryConfig {
    pub fn naming_options(&self) -> NamingOptions {
        NamingOptions {
            separator: self.separator,
            timezone: self.timezone,
            unknown_label: self.unknown_label.clone(),
            conventions: self.conventions.clone(),
            numeric_labels: self.numeric_labels.clone(),
        }
    }

    pub fn gallery_options(&self) -> GalleryOptions {
        GalleryOptions {
            url_prefix: self.url_prefix.clone(),
        }
    }

    /// Route path the photo folder is served under, e.g. `/foto`.
    pub fn serve_path(&self) -> String {
        format!("/{}", self.url_prefix.trim_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub token: String,
    pub max_bytes: u64,
    pub allowed_mime: Vec<String>,
}

impl UploadConfig {
    pub fn is_default_token(&self) -> bool {
        self.token == DEFAULT_UPLOAD_TOKEN
    }

    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.token.clone())
            .with_max_bytes(self.max_bytes)
            .with_allowed_mime(self.allowed_mime.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.is_wildcard_included()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

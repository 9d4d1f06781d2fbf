use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::constants::CONFIG_PATH_ENV;
use crate::util::{non_empty, parse_csv};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub gallery: FileGalleryConfig,
    #[serde(default)]
    pub upload: FileUploadConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileGalleryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conventions: Option<Vec<String>>,
    /// `"1" = "Leyangan"`; keys are single digits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_labels: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileUploadConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mime: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
///
/// Numeric and boolean values are kept raw so malformed input can be
/// reported instead of silently ignored.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub photo_dir: Option<PathBuf>,
    pub url_prefix: Option<String>,
    pub timezone: Option<String>,
    pub separator: Option<String>,
    pub unknown_label: Option<String>,
    pub conventions: Option<Vec<String>>,
    pub upload_token: Option<String>,
    pub upload_max_bytes: Option<String>,
    pub upload_allowed_mime: Option<Vec<String>>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub dev_mode: Option<String>,
}

impl EnvConfig {
    /// Read the process environment.
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).and_then(non_empty);
        // The separator may legitimately be a space, so it is not trimmed.
        let separator = lookup("TITLE_SEPARATOR").filter(|raw| !raw.is_empty());

        Self {
            config_path: var(CONFIG_PATH_ENV).map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: var("SERVER_PORT"),
            photo_dir: var("PHOTO_DIR").map(PathBuf::from),
            url_prefix: var("PHOTO_URL_PREFIX"),
            timezone: var("GALLERY_TIMEZONE"),
            separator,
            unknown_label: var("UNKNOWN_TITLE_LABEL"),
            conventions: var("NAMING_CONVENTIONS").map(|raw| parse_csv(&raw)),
            upload_token: var("UPLOAD_TOKEN"),
            upload_max_bytes: var("UPLOAD_MAX_BYTES"),
            upload_allowed_mime: var("UPLOAD_ALLOWED_MIME").map(|raw| parse_csv(&raw)),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS").map(|raw| parse_csv(&raw)),
            dev_mode: var("DEV_MODE"),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_lookup(|name| vars.get(name).cloned())
    }
}

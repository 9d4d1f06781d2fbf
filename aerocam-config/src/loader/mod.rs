pub mod error;

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use aerocam_core::gallery::DEFAULT_URL_PREFIX;
use aerocam_core::naming::{
    Convention, DEFAULT_SEPARATOR, DEFAULT_TIMEZONE, DEFAULT_UNKNOWN_LABEL,
    default_numeric_labels,
};
use aerocam_core::upload::{DEFAULT_ALLOWED_MIME, DEFAULT_MAX_UPLOAD_BYTES};
use chrono_tz::Tz;
use tracing::debug;

use self::error::ConfigLoadError;
use crate::constants::{DEFAULT_HOST, DEFAULT_PHOTO_DIR, DEFAULT_PORT, DEFAULT_UPLOAD_TOKEN};
use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    Config, ConfigMetadata, CorsConfig, GalleryConfig, ServerConfig, UploadConfig,
};
use crate::util::parse_bool;
use crate::validation::{self, ConfigWarnings};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("aerocam.toml"),
        PathBuf::from("config/aerocam.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Use these values instead of the process environment. No `.env` file
    /// is read when set.
    pub env: Option<EnvConfig>,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.options.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (env_config, env_file_loaded) = match &self.options.env {
            Some(env) => (env.clone(), false),
            None => {
                let loaded = self.load_env_file()?;
                (EnvConfig::gather(), loaded)
            }
        };

        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) =
            compose_config(file_config, env_config, config_path, env_file_loaded)?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let result = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match result {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env_config.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(found) => found.clone(),
                None => return Ok((None, None)),
            },
        };

        debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
            path: path.clone(),
            source: err,
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

/// Merge environment, file and defaults, then run the guard rails.
pub fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if file_config.is_none() {
        warnings.push_with_hint(
            "No aerocam.toml detected; using environment variables and defaults",
            "Create aerocam.toml or pass --config to pin the gallery settings",
        );
    }

    let FileConfig {
        server: file_server,
        gallery: file_gallery,
        upload: file_upload,
        cors: file_cors,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let port = match env.server_port.as_deref() {
        Some(raw) => Some(parse_number::<u16>("SERVER_PORT", raw)?),
        None => file_server.port,
    };
    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: port.unwrap_or(DEFAULT_PORT),
    };

    let gallery = GalleryConfig {
        photo_dir: env
            .photo_dir
            .or(file_gallery.photo_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PHOTO_DIR)),
        url_prefix: match env.url_prefix.or(file_gallery.url_prefix) {
            Some(raw) => normalize_url_prefix(&raw)?,
            None => DEFAULT_URL_PREFIX.to_string(),
        },
        timezone: match env.timezone.or(file_gallery.timezone) {
            Some(raw) => parse_timezone(&raw)?,
            None => DEFAULT_TIMEZONE,
        },
        separator: match env.separator.or(file_gallery.separator) {
            Some(raw) => parse_separator(&raw)?,
            None => DEFAULT_SEPARATOR,
        },
        unknown_label: env
            .unknown_label
            .or(file_gallery.unknown_label)
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| DEFAULT_UNKNOWN_LABEL.to_string()),
        conventions: match env.conventions.or(file_gallery.conventions) {
            Some(raw) => parse_conventions(&raw)?,
            None => vec![Convention::FreeFormTitle],
        },
        numeric_labels: match file_gallery.numeric_labels {
            Some(raw) => parse_numeric_labels(raw)?,
            None => default_numeric_labels(),
        },
    };

    let max_bytes = match env.upload_max_bytes.as_deref() {
        Some(raw) => Some(parse_number::<u64>("UPLOAD_MAX_BYTES", raw)?),
        None => file_upload.max_bytes,
    };
    let upload = UploadConfig {
        token: env
            .upload_token
            .or(file_upload.token)
            .unwrap_or_else(|| DEFAULT_UPLOAD_TOKEN.to_string()),
        max_bytes: max_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        allowed_mime: env
            .upload_allowed_mime
            .or(file_upload.allowed_mime)
            .unwrap_or_else(|| DEFAULT_ALLOWED_MIME.iter().map(|m| m.to_string()).collect()),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
    };

    let dev_mode = match env.dev_mode.as_deref() {
        Some(raw) => Some(parse_bool(raw).ok_or_else(|| {
            ConfigLoadError::invalid("DEV_MODE", format!("'{raw}' is not a boolean"))
        })?),
        None => file_dev_mode,
    }
    .unwrap_or(false);

    let config = Config {
        server,
        gallery,
        upload,
        cors,
        dev_mode,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    let guard_warnings = validation::apply_guard_rails(&config)?;
    warnings.extend(guard_warnings);

    Ok((config, warnings))
}

fn parse_number<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigLoadError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigLoadError::invalid(field, format!("'{raw}' is not a valid number")))
}

fn parse_timezone(raw: &str) -> Result<Tz, ConfigLoadError> {
    raw.trim().parse::<Tz>().map_err(|_| {
        ConfigLoadError::invalid("gallery.timezone", format!("'{raw}' is not an IANA timezone"))
    })
}

fn parse_separator(raw: &str) -> Result<char, ConfigLoadError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(ConfigLoadError::invalid(
            "gallery.separator",
            format!("'{raw}' must be exactly one character"),
        )),
    }
}

fn parse_conventions(raw: &[String]) -> Result<Vec<Convention>, ConfigLoadError> {
    let mut conventions = Vec::with_capacity(raw.len());
    for name in raw {
        let convention = Convention::from_str(name)
            .map_err(|err| ConfigLoadError::invalid("gallery.conventions", err.to_string()))?;
        if !conventions.contains(&convention) {
            conventions.push(convention);
        }
    }
    if conventions.is_empty() {
        return Err(ConfigLoadError::invalid(
            "gallery.conventions",
            "at least one naming convention is required",
        ));
    }
    Ok(conventions)
}

fn parse_numeric_labels(
    raw: BTreeMap<String, String>,
) -> Result<BTreeMap<u8, String>, ConfigLoadError> {
    let mut labels = BTreeMap::new();
    for (key, label) in raw {
        let id = key
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|id| *id <= 9)
            .ok_or_else(|| {
                ConfigLoadError::invalid(
                    "gallery.numeric_labels",
                    format!("key '{key}' must be a single digit"),
                )
            })?;
        let label = label.trim();
        if label.is_empty() {
            return Err(ConfigLoadError::invalid(
                "gallery.numeric_labels",
                format!("label for '{key}' is empty"),
            ));
        }
        labels.insert(id, label.to_string());
    }
    Ok(labels)
}

/// Path segments the server routes itself.
const RESERVED_ROUTE_SEGMENTS: &[&str] = &["api", "ping", "upload", "upload.php"];

fn normalize_url_prefix(raw: &str) -> Result<String, ConfigLoadError> {
    let trimmed = raw.trim();
    let segment = trimmed.trim_matches('/');
    if segment.is_empty() || trimmed.contains("://") || segment.contains(char::is_whitespace) {
        return Err(ConfigLoadError::invalid(
            "gallery.url_prefix",
            format!("'{raw}' must be a path such as 'foto/'"),
        ));
    }
    let first = segment.split('/').next().unwrap_or_default();
    if RESERVED_ROUTE_SEGMENTS.contains(&first) {
        return Err(ConfigLoadError::invalid(
            "gallery.url_prefix",
            format!("'{raw}' collides with the '/{first}' route"),
        ));
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/"))
    }
}

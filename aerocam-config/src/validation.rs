use thiserror::Error;

use super::models::{Config, CorsConfig, UploadConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("upload secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("invalid upload configuration: {reason}")]
    InvalidUploadConfig { reason: String },
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    enforce_upload(&config.upload, config.dev_mode, &mut warnings)?;
    validate_cors(&config.cors)?;

    if config.cors.allows_any_origin() && !config.dev_mode {
        warnings.push_with_hint(
            "CORS accepts requests from any origin",
            "Set CORS_ALLOWED_ORIGINS to the sites that embed the gallery",
        );
    }

    if !config.gallery.photo_dir.is_dir() {
        warnings.push_with_hint(
            format!(
                "Photo folder {} does not exist; listings fail until an upload creates it",
                config.gallery.photo_dir.display()
            ),
            "Create the folder or set PHOTO_DIR",
        );
    }

    Ok(warnings)
}

fn enforce_upload(
    upload: &UploadConfig,
    dev_mode: bool,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    const MIN_TOKEN_LENGTH: usize = 8;

    if upload.token.trim().is_empty() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "UPLOAD_TOKEN",
            reason: "must not be empty".into(),
        });
    }

    if upload.is_default_token() {
        if !dev_mode {
            return Err(ConfigGuardRailError::WeakSecret {
                field: "UPLOAD_TOKEN",
                reason: "uses the default placeholder value".into(),
            });
        }
        warnings.push_with_hint(
            "UPLOAD_TOKEN uses the default placeholder value",
            "Set UPLOAD_TOKEN to a private value shared with the capture clients",
        );
    } else if upload.token.len() < MIN_TOKEN_LENGTH {
        warnings.push(format!(
            "UPLOAD_TOKEN is shorter than {MIN_TOKEN_LENGTH} characters"
        ));
    }

    if upload.max_bytes == 0 {
        return Err(ConfigGuardRailError::InvalidUploadConfig {
            reason: "max_bytes must be greater than zero".into(),
        });
    }

    if upload.allowed_mime.is_empty() {
        return Err(ConfigGuardRailError::InvalidUploadConfig {
            reason: "allowed_mime must list at least one type".into(),
        });
    }

    if let Some(bad) = upload.allowed_mime.iter().find(|mime| !mime.contains('/')) {
        return Err(ConfigGuardRailError::InvalidUploadConfig {
            reason: format!("'{bad}' is not a MIME type"),
        });
    }

    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for origin in &cors.allowed_origins {
        let origin = origin.trim();
        if origin == "*" {
            continue;
        }
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin '{origin}' must start with http:// or https://"),
            });
        }
        if origin.ends_with('/') {
            return Err(ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin '{origin}' must not end with '/'"),
            });
        }
    }
    Ok(())
}

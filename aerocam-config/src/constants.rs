/// Shipped upload token. Refused outside dev mode.
pub const DEFAULT_UPLOAD_TOKEN: &str = "change-me-upload-token";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PHOTO_DIR: &str = "./foto";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "AEROCAM_CONFIG";

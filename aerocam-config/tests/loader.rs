use std::fs;

use aerocam_config::{ConfigGuardRailError, ConfigLoadError, ConfigLoader, EnvConfig};
use aerocam_core::naming::Convention;
use tempfile::TempDir;

const TOKEN: &str = "orchard-upload-secret";

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("aerocam.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_apply_when_only_the_token_is_set() {
    let temp_dir = TempDir::new().unwrap();
    let photo_dir = temp_dir.path().join("foto");
    fs::create_dir(&photo_dir).unwrap();

    let load = ConfigLoader::new()
        .with_env(EnvConfig::from_pairs([
            ("UPLOAD_TOKEN", TOKEN),
            ("PHOTO_DIR", photo_dir.to_str().unwrap()),
        ]))
        .load()
        .unwrap();
    let config = load.config;

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.gallery.url_prefix, "foto/");
    assert_eq!(config.gallery.serve_path(), "/foto");
    assert_eq!(config.gallery.timezone, chrono_tz::Asia::Jakarta);
    assert_eq!(config.gallery.separator, '_');
    assert_eq!(config.gallery.unknown_label, "Unknown");
    assert_eq!(config.gallery.conventions, vec![Convention::FreeFormTitle]);
    assert_eq!(config.gallery.numeric_labels.len(), 2);
    assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
    assert_eq!(config.upload.allowed_mime, vec!["image/jpeg", "image/png"]);
    assert!(!config.dev_mode);
    assert!(config.metadata.config_path.is_none());

    // No config file and any-origin CORS are both reported.
    assert!(
        load.warnings
            .iter()
            .any(|w| w.message.contains("No aerocam.toml"))
    );
    assert!(load.warnings.iter().any(|w| w.message.contains("any origin")));
}

#[test]
fn file_values_are_used_and_env_overrides_them() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
[server]
host = "127.0.0.1"
port = 8080

[gallery]
photo_dir = "/srv/aerocam/foto"
url_prefix = "/photos"
timezone = "Europe/Berlin"
separator = "+"
unknown_label = "Tidak diketahui"
conventions = ["numeric_id", "free_form"]

[gallery.numeric_labels]
"1" = "Leyangan"
"3" = "Kebun Timur"

[upload]
token = "file-token-value"
max_bytes = 1024
allowed_mime = ["image/jpeg"]

[cors]
allowed_origins = ["https://farm.example"]
"#,
    );

    let config = ConfigLoader::new()
        .with_config_path(&path)
        .with_env(EnvConfig::from_pairs([
            ("SERVER_PORT", "9000"),
            ("UPLOAD_TOKEN", TOKEN),
        ]))
        .load()
        .unwrap()
        .config;

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.bind_addr(), "127.0.0.1:9000");
    assert_eq!(config.gallery.url_prefix, "/photos/");
    assert_eq!(config.gallery.serve_path(), "/photos");
    assert_eq!(config.gallery.timezone, chrono_tz::Europe::Berlin);
    assert_eq!(config.gallery.separator, '+');
    assert_eq!(config.gallery.unknown_label, "Tidak diketahui");
    assert_eq!(
        config.gallery.conventions,
        vec![Convention::NumericId, Convention::FreeFormTitle]
    );
    assert_eq!(
        config.gallery.numeric_labels.get(&3).map(String::as_str),
        Some("Kebun Timur")
    );
    assert!(!config.gallery.numeric_labels.contains_key(&2));
    assert_eq!(config.upload.token, TOKEN);
    assert_eq!(config.upload.max_bytes, 1024);
    assert_eq!(config.cors.allowed_origins, vec!["https://farm.example"]);
    assert_eq!(config.metadata.config_path.as_deref(), Some(path.as_path()));

    let naming = config.gallery.naming_options();
    assert_eq!(naming.separator, '+');
    assert_eq!(config.upload.policy().max_bytes, 1024);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::new()
        .with_config_path(temp_dir.path().join("missing.toml"))
        .with_env(EnvConfig::from_pairs([("UPLOAD_TOKEN", TOKEN)]))
        .load();
    assert!(matches!(result, Err(ConfigLoadError::MissingConfig { .. })));
}

#[test]
fn config_path_can_come_from_the_environment() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "[server]\nport = 4100\n");
    let config = ConfigLoader::new()
        .with_env(EnvConfig::from_pairs([
            ("AEROCAM_CONFIG", path.to_str().unwrap()),
            ("UPLOAD_TOKEN", TOKEN),
        ]))
        .load()
        .unwrap()
        .config;
    assert_eq!(config.server.port, 4100);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(&temp_dir, "[server\nport = ");
    let result = ConfigLoader::new()
        .with_config_path(&path)
        .with_env(EnvConfig::from_pairs([("UPLOAD_TOKEN", TOKEN)]))
        .load();
    assert!(matches!(result, Err(ConfigLoadError::Parse { .. })));
}

#[test]
fn invalid_values_name_their_field() {
    let cases = [
        ("GALLERY_TIMEZONE", "Mars/Base", "gallery.timezone"),
        ("TITLE_SEPARATOR", "--", "gallery.separator"),
        ("NAMING_CONVENTIONS", "exif", "gallery.conventions"),
        ("SERVER_PORT", "eighty", "SERVER_PORT"),
        ("UPLOAD_MAX_BYTES", "-1", "UPLOAD_MAX_BYTES"),
        ("DEV_MODE", "perhaps", "DEV_MODE"),
        ("PHOTO_URL_PREFIX", "/", "gallery.url_prefix"),
    ];
    for (var, value, expected) in cases {
        let result = ConfigLoader::new()
            .with_env(EnvConfig::from_pairs([(var, value), ("UPLOAD_TOKEN", TOKEN)]))
            .load();
        match result {
            Err(ConfigLoadError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("{var}={value}: expected Invalid, got {other:?}"),
        }
    }
}

#[test]
fn placeholder_token_is_refused_outside_dev_mode() {
    let result = ConfigLoader::new()
        .with_env(EnvConfig::from_pairs([("DEV_MODE", "false")]))
        .load();
    assert!(matches!(
        result,
        Err(ConfigLoadError::GuardRail(ConfigGuardRailError::WeakSecret {
            field: "UPLOAD_TOKEN",
            ..
        }))
    ));
}

#[test]
fn placeholder_token_only_warns_in_dev_mode() {
    let load = ConfigLoader::new()
        .with_env(EnvConfig::from_pairs([("DEV_MODE", "true")]))
        .load()
        .unwrap();
    assert!(load.config.dev_mode);
    assert!(load.config.upload.is_default_token());
    assert!(
        load.warnings
            .iter()
            .any(|w| w.message.contains("placeholder"))
    );
}

#[test]
fn cors_origins_must_be_urls() {
    let result = ConfigLoader::new()
        .with_env(EnvConfig::from_pairs([
            ("UPLOAD_TOKEN", TOKEN),
            ("CORS_ALLOWED_ORIGINS", "farm.example"),
        ]))
        .load();
    assert!(matches!(
        result,
        Err(ConfigLoadError::GuardRail(
            ConfigGuardRailError::InvalidCorsConfig { .. }
        ))
    ));
}

#[test]
fn zero_upload_limit_is_refused() {
    let result = ConfigLoader::new()
        .with_env(EnvConfig::from_pairs([
            ("UPLOAD_TOKEN", TOKEN),
            ("UPLOAD_MAX_BYTES", "0"),
        ]))
        .load();
    assert!(matches!(
        result,
        Err(ConfigLoadError::GuardRail(
            ConfigGuardRailError::InvalidUploadConfig { .. }
        ))
    ));
}

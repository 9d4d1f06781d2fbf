use std::{path::PathBuf, sync::Arc};

use aerocam_config::{ConfigLoad, ConfigLoader};
use aerocam_core::SystemClock;
use aerocam_server::{AppState, build_cors_layer, create_app};
use anyhow::Context;
use clap::{Args as ClapArgs, Parser};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "aerocam-server")]
#[command(about = "Photo gallery and upload endpoint for aeroponic monitoring cameras")]
struct Cli {
    /// Path to an aerocam.toml configuration file
    #[arg(long, env = "AEROCAM_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = cli.env_file.clone() {
        loader = loader.with_env_file(path);
    }
    let ConfigLoad {
        mut config,
        warnings: config_warnings,
    } = loader.load().context("failed to load configuration")?;

    let args = cli.serve;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,aerocam_server=info,tower_http=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &config_warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    let gallery = &config.gallery;
    info!(
        gallery.photo_dir = %gallery.photo_dir.display(),
        gallery.url_prefix = %gallery.url_prefix,
        gallery.timezone = %gallery.timezone,
        gallery.conventions = ?gallery.conventions,
        upload.max_bytes = config.upload.max_bytes,
        dev_mode = config.dev_mode,
        "gallery configuration in effect"
    );

    let state = AppState::from_config(&config, Arc::new(SystemClock))
        .context("failed to build gallery")?;
    let app = create_app(state).layer(build_cors_layer(&config.cors, config.dev_mode));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Aerocam gallery listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! Embed player server
//!
//! Serves the embeddable player page and the JSON API behind it.

use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidluna_embed::config_file::{generate_default_config, ConfigFile};
use vidluna_embed::{create_router, AppError, AppState, Result, ServerConfig};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "vidluna-embed";

#[derive(Parser, Debug)]
#[command(name = "vidluna-embed")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file; ignored when it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Write a default configuration file to this path and exit
    #[arg(long)]
    generate_config: Option<PathBuf>,

    /// Address to bind to, overriding the configuration file
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.generate_config {
        generate_default_config(path).map_err(|e| AppError::Config(e.to_string()))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let (mut config, load_error) = load_config(&args.config);
    if let Some(bind) = args.bind {
        config.host = bind.ip().to_string();
        config.port = bind.port();
    }

    // Initialize logging
    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    if let Some(e) = load_error {
        tracing::warn!(
            "Failed to load config file {}: {}. Using defaults.",
            args.config.display(),
            e
        );
    }
    tracing::debug!("Configuration loaded: {:?}", config);

    // Create application state
    let state = Arc::new(AppState::new(config.clone())?);

    // Build router
    let app = create_router(state.clone());

    // Start server
    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid bind address: {}", e)))?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Load the configuration file if present. A file that fails to parse
/// falls back to defaults; the error is returned for logging once the
/// subscriber is up.
fn load_config(path: &Path) -> (ServerConfig, Option<String>) {
    if !path.exists() {
        return (ServerConfig::default(), None);
    }
    match ConfigFile::from_file(path) {
        Ok(cf) => (cf.into_server_config(), None),
        Err(e) => (ServerConfig::default(), Some(e.to_string())),
    }
}

/// Initialize logging with tracing
fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "vidluna_embed={},tower_http=debug",
            config.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
    state.shutdown();
}

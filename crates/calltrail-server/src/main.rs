use anyhow::Context;
use calltrail_core::{AppConfig, DEFAULT_CONFIG_PATH};
use calltrail_server::{AppState, create_router};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "calltrail-server", version, about = "Calltrail audit demo server")]
struct Cli {
    /// Path to the YAML configuration file (default: calltrail.yaml, if present).
    #[arg(long, env = "CALLTRAIL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let source = cli
        .config
        .as_deref()
        .map_or_else(|| DEFAULT_CONFIG_PATH.to_string(), |path| path.display().to_string());
    let mut config = AppConfig::load(cli.config.as_deref())
        .with_context(|| format!("failed to load configuration from {}", source))?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    tracing::info!(config = %source, "Configuration loaded");

    let addr = config.server.bind.clone();
    let state = AppState::init(config).await?;
    let app = create_router(state);

    tracing::info!("calltrail-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

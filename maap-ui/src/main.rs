//! maap-ui - Mentoring Audio Analysis Portal service
//!
//! Serves the portal UI, forwards uploads to the external automation
//! endpoint, and watches the remote record store for analysis results.

use anyhow::Result;
use clap::Parser;
use maap_common::PortalConfig;
use maap_ui::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "maap-ui", about = "Mentoring Audio Analysis Portal")]
struct Args {
    /// Path to the configuration file (overrides MAAP_CONFIG and the
    /// platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Mentoring Audio Analysis Portal (maap-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config = PortalConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.listen_port = port;
    }
    config.validate()?;

    info!(
        store_url = %config.store_url,
        detection_policy = ?config.detection_policy,
        upload_encoding = ?config.upload_encoding,
        poll_max_attempts = config.poll_max_attempts,
        poll_interval_seconds = config.poll_interval_seconds,
        "Configuration loaded"
    );

    let listen_port = config.listen_port;
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", listen_port)).await?;
    info!("maap-ui listening on http://127.0.0.1:{}", listen_port);
    info!("Health check: http://127.0.0.1:{}/health", listen_port);

    axum::serve(listener, app).await?;

    Ok(())
}

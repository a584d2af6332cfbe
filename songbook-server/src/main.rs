//! songbook - chord sheet service
//!
//! Serves the spreadsheet-backed song catalog, resolves chord sheets through
//! the source chain (manual text, Songsterr, Ultimate Guitar, generated) and
//! renders them for display.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use songbook_common::config::SongbookConfig;
use songbook_server::config::resolve_gemini_api_key;
use songbook_server::generative::GeminiClient;
use songbook_server::http::ReqwestTransport;
use songbook_server::AppState;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songbook
#[derive(Parser, Debug)]
#[command(name = "songbook")]
#[command(about = "Chord sheet service for the songbook spreadsheet")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "SONGBOOK_PORT")]
    port: Option<u16>,

    /// Google Sheets document id (overrides config)
    #[arg(long, env = "SONGBOOK_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        SongbookConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(id) = args.spreadsheet_id {
        config.spreadsheet_id = id;
    }

    // Initialize tracing
    let default_filter = format!("{},tower_http=debug", config.logging.level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting songbook on port {}", config.port);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Spreadsheet: {}", config.spreadsheet_id);

    let transport = Arc::new(
        ReqwestTransport::new(&config.fetch.user_agent, config.fetch.request_timeout())
            .context("Failed to build HTTP client")?,
    );

    let api_key = resolve_gemini_api_key(&config);
    let gemini = Arc::new(GeminiClient::new(transport.clone(), api_key, &config.gemini));
    if !gemini.is_configured() {
        warn!("Generated chords and insights disabled until a Gemini API key is configured");
    }

    let state = AppState::new(transport, gemini, &config);

    match state.catalog.reload().await {
        Ok(count) => info!("Loaded {} songs", count),
        Err(e) => {
            warn!("Initial catalog load failed: {}", e);
            state.record_error(e.to_string()).await;
        }
    }

    let app = songbook_server::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

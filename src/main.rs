//! NOVOYAZ Server
//!
//! OCR service for pre-reform Russian documents: accepts image uploads over
//! HTTP and returns recognized Cyrillic text lines with bounding boxes and
//! confidence scores.

use std::net::SocketAddr;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use novoyaz_server::{app, config::Config, ocr::OcrService, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "novoyaz_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting NOVOYAZ Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("OCR engine endpoint: {}", config.engine.endpoint);

    let ocr = OcrService::new(&config.engine);

    if config.engine.warmup {
        // Pay the model-loading cost during startup instead of on the first
        // upload. Lazy-on-first-use remains the default.
        if let Err(e) = ocr.warm_up().await {
            tracing::warn!("engine warm-up failed, will retry on first request: {e}");
        }
    }

    let state = AppState::new(ocr);
    let router = app(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("NOVOYAZ Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

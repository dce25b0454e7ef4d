use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nanomerch_api::config::ServerConfig;
use nanomerch_api::router::build_app_router;
use nanomerch_api::state::AppState;
use nanomerch_core::catalog::Catalog;
use nanomerch_core::export::PdfDocumentExporter;
use nanomerch_core::studio::Studio;
use nanomerch_gemini::{GeminiApi, GeminiConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nanomerch_api=debug,nanomerch_gemini=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Image gateway ---
    let gemini_config = GeminiConfig::from_env();
    tracing::info!(
        model = %gemini_config.model,
        timeout_secs = gemini_config.timeout_secs,
        "Loaded Gemini configuration"
    );
    let gemini = GeminiApi::new(gemini_config).expect("Failed to build Gemini HTTP client");
    let gateway_configured = gemini.is_configured();
    if !gateway_configured {
        tracing::warn!("GEMINI_API_KEY is not set; every generation will fail");
    }

    // --- Studio ---
    let catalog = Catalog::builtin();
    tracing::info!(scenarios = catalog.len(), "Loaded scenario catalog");

    let state = AppState::new(
        config.clone(),
        Studio::new(catalog),
        Arc::new(gemini),
        gateway_configured,
        Arc::new(PdfDocumentExporter),
    );

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

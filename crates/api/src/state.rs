use std::sync::Arc;

use tokio::sync::RwLock;

use nanomerch_core::export::DocumentExporter;
use nanomerch_core::gateway::ImageGateway;
use nanomerch_core::studio::Studio;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The single studio controller holding all session state.
    pub studio: Arc<RwLock<Studio>>,
    /// Image generation gateway.
    pub gateway: Arc<dyn ImageGateway>,
    /// Whether the gateway has credentials; reported by `/health`.
    pub gateway_configured: bool,
    /// Storyboard document renderer.
    pub exporter: Arc<dyn DocumentExporter>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        studio: Studio,
        gateway: Arc<dyn ImageGateway>,
        gateway_configured: bool,
        exporter: Arc<dyn DocumentExporter>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            studio: Arc::new(RwLock::new(studio)),
            gateway,
            gateway_configured,
            exporter,
        }
    }
}

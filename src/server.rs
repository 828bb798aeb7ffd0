//! HTTP server setup and lifecycle.
//!
//! Configures the axum server with:
//! - Offer/answer relay handlers
//! - Graceful shutdown that releases waiting offers
//! - Optional Prometheus endpoint

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::observability::metrics::prometheus_registry;
use crate::observability::exporter::run_exporter;
use crate::rendezvous::RendezvousStore;
use crate::service::create_router;

/// Boxed error returned by the server entry points.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server state shared across handlers.
pub struct ServerState {
    pub store: RendezvousStore,
    /// Upper bound on an offer's wait, if any.
    pub offer_timeout: Option<Duration>,
    pub max_body_bytes: usize,
    /// Fired on shutdown; cancels every waiting offer.
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(config: &Config) -> Self {
        Self {
            store: RendezvousStore::new(),
            offer_timeout: config.offer_timeout(),
            max_body_bytes: config.max_body_bytes,
            shutdown: CancellationToken::new(),
        }
    }
}

/// Run the Tryst relay.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `shutdown_rx` - Receiver for shutdown signal
///
/// # Returns
///
/// Returns when the server has shut down.
pub async fn run_server(config: Config, shutdown_rx: watch::Receiver<bool>) -> Result<(), BoxError> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(ServerState::new(&config));

    // Spawn Prometheus metrics server if enabled
    if config.metrics_enabled {
        let metrics_addr: SocketAddr = format!("{}:{}", config.host, config.metrics_port).parse()?;
        let registry = prometheus_registry();
        let store = state.store.clone();
        let metrics_shutdown_rx = shutdown_rx.clone();

        tokio::spawn(async move {
            if let Err(e) = run_exporter(metrics_addr, registry, store, metrics_shutdown_rx).await {
                tracing::error!(error = %e, "Prometheus server error");
            }
        });
    }

    let listener = TcpListener::bind(addr).await?;
    serve_state(listener, state, shutdown_rx).await
}

/// Serve the relay on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    config: &Config,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<(), BoxError> {
    serve_state(listener, Arc::new(ServerState::new(config)), shutdown_rx).await
}

async fn serve_state(
    listener: TcpListener,
    state: Arc<ServerState>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), BoxError> {
    let app = create_router(state.clone());

    tracing::info!(
        address = %listener.local_addr()?,
        offer_timeout = ?state.offer_timeout,
        "Starting Tryst relay"
    );

    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            // Wait for shutdown signal
            let _ = shutdown_rx.changed().await;
            tracing::info!("Shutdown signal received, stopping server");
            // Waiting offers would otherwise hold graceful shutdown open
            // until their deadline.
            shutdown.cancel();
        })
        .await?;

    tracing::info!(pending = state.store.len(), "Server stopped");
    Ok(())
}

//! Scrape endpoint for the relay's Prometheus metrics.
//!
//! Runs on its own port so the relay's CORS-open router never exposes it.
//! Serves `/metrics` and a `/health` probe.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::metrics::record_pending_offers;
use crate::rendezvous::RendezvousStore;
use crate::server::BoxError;

#[derive(Clone)]
struct ExporterState {
    registry: Registry,
    /// Sampled on every scrape so the pending gauge is never stale.
    store: RendezvousStore,
}

/// Router serving the scrape endpoint.
pub fn exporter_router(registry: Registry, store: RendezvousStore) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .route("/health", get(|| async { "OK" }))
        .with_state(ExporterState { registry, store })
}

async fn scrape(State(state): State<ExporterState>) -> Response {
    record_pending_offers(state.store.len());

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&state.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    ([(CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response()
}

/// Serve the scrape endpoint on `addr` until `shutdown_rx` fires.
pub async fn run_exporter(
    addr: SocketAddr,
    registry: Registry,
    store: RendezvousStore,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), BoxError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Serving Prometheus metrics");

    axum::serve(listener, exporter_router(registry, store))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendezvous::Payload;
    use axum::body::Body;
    use axum::http::Request;
    use prometheus::IntGauge;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_scrape_reports_registered_gauge() {
        let registry = Registry::new();
        let gauge = IntGauge::new("tryst_scrape_probe", "probe").unwrap();
        registry.register(Box::new(gauge.clone())).unwrap();
        gauge.set(7);

        let store = RendezvousStore::new();
        let _pending = store.register("abc", Payload::from("offer"));

        let response = exporter_router(registry, store)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("tryst_scrape_probe 7"));
    }

    #[tokio::test]
    async fn test_exporter_health() {
        let response = exporter_router(Registry::new(), RendezvousStore::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

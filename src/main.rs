//! Tryst: a rendezvous relay for peer-to-peer offer/answer handshakes.
//!
//! # Usage
//!
//! ```bash
//! tryst --port 8080 --offer-timeout-secs 15 --log-level info
//! ```
//!
//! Environment variables can also be used:
//! - `PORT`: Port to listen on
//! - `TRYST_OFFER_TIMEOUT_SECS`: How long an offer waits for its answer
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use tokio::sync::watch;
use tryst::config::Config;
use tryst::observability::metrics::init_metrics;
use tryst::observability::tracing::init_tracing;
use tryst::server::{run_server, BoxError};

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    let offer_timeout = match config.offer_timeout() {
        Some(timeout) => format!("{}s", timeout.as_secs()),
        None => "none".to_string(),
    };
    eprintln!(
        r#"
   _                  _
  | |_ _ __ _   _ ___| |_
  | __| '__| | | / __| __|
  | |_| |  | |_| \__ \ |_
   \__|_|   \__, |___/\__|
            |___/

  Tryst v{} - Rendezvous Relay

  Configuration:
    Address:        {}:{}
    Offer Timeout:  {}
    Log Level:      {}

  Press Ctrl+C to shutdown gracefully.
"#,
        version, config.host, config.port, offer_timeout, config.log_level
    );
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level, config.log_json);

    // Initialize metrics
    init_metrics()?;

    // Print startup banner
    print_banner(&config);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        // Wait for SIGTERM or SIGINT (Ctrl+C)
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, initiating shutdown...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                    let _ = ctrl_c.await;
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = ctrl_c.await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        // Signal shutdown
        let _ = shutdown_tx.send(true);
    });

    // Run the server
    run_server(config, shutdown_rx).await?;

    tracing::info!("Tryst shutdown complete");
    Ok(())
}

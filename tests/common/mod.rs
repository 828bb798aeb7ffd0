//! Test utilities and server harness for Tryst tests.
//!
//! Provides:
//! - In-process relay on an ephemeral port
//! - Client helpers
//! - Polling helper for asynchronous conditions

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tryst::client::{ConnectConfig, TrystClient};
use tryst::config::Config;
use tryst::server::{serve, BoxError};

/// A relay running inside the test process.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<Result<(), BoxError>>,
}

impl TestServer {
    /// Start a relay with test defaults.
    pub async fn start() -> Self {
        Self::start_with(test_config()).await
    }

    /// Start a relay with the given configuration (host/port are ignored).
    pub async fn start_with(config: Config) -> Self {
        tryst::observability::tracing::init_test_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("no local addr");
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move { serve(listener, &config, shutdown_rx).await });

        Self {
            addr,
            shutdown_tx,
            task,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client for this relay that gives up after one 408.
    pub fn client(&self) -> TrystClient {
        TrystClient::connect(ConnectConfig {
            endpoint: self.endpoint(),
            offer_attempts: 1,
        })
        .expect("failed to create client")
    }

    /// Stop the relay and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("server did not shut down in time")
            .expect("server task panicked")
            .expect("server returned an error");
    }
}

/// Configuration used by [`TestServer::start`].
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        log_level: "error".into(),
        offer_timeout_secs: 5,
        ..Config::default()
    }
}

/// Wait for a condition to become true with timeout.
///
/// # Returns
///
/// `true` if condition was met, `false` if timeout expired
pub async fn wait_for<F, Fut>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

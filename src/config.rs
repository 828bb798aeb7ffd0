//! Configuration parsing for the Tryst relay.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start

use clap::Parser;
use std::time::Duration;

/// Tryst: a rendezvous relay for peer-to-peer offer/answer handshakes.
#[derive(Parser, Debug, Clone)]
#[command(name = "tryst")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "TRYST_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "TRYST_LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    /// Seconds an offer waits for its answer before the client is told to retry (0 = no limit)
    #[arg(long, env = "TRYST_OFFER_TIMEOUT_SECS", default_value_t = 15)]
    pub offer_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "TRYST_MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Serve Prometheus metrics on a separate port
    #[arg(long, env = "TRYST_METRICS_ENABLED", default_value_t = false)]
    pub metrics_enabled: bool,

    /// Port for the Prometheus metrics endpoint
    #[arg(long, env = "TRYST_METRICS_PORT", default_value_t = 9090)]
    pub metrics_port: u16,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// How long an offer may wait, if bounded.
    pub fn offer_timeout(&self) -> Option<Duration> {
        (self.offer_timeout_secs > 0).then(|| Duration::from_secs(self.offer_timeout_secs))
    }

    /// Create a default configuration for testing.
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0, // Random port
            log_level: "debug".into(),
            log_json: false,
            offer_timeout_secs: 2,
            max_body_bytes: 64 * 1024,
            metrics_enabled: false,
            metrics_port: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            log_level: "info".into(),
            log_json: false,
            offer_timeout_secs: 15,
            max_body_bytes: 1024 * 1024,
            metrics_enabled: false,
            metrics_port: 9090,
        }
    }
}

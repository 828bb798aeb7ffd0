//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise the configured level applies to
//! dependencies and the relay's own targets log at debug.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used when `RUST_LOG` is unset.
fn default_directive(log_level: &str) -> String {
    format!("{log_level},tryst=debug")
}

/// Install the global subscriber.
///
/// With `json` set, events are written as newline-delimited JSON objects
/// instead of human-readable lines.
///
/// # Panics
///
/// Panics if tracing has already been initialized.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        registry.with(fmt_layer.json().flatten_event(true)).init();
    } else {
        registry.with(fmt_layer).init();
    }

    tracing::info!(log_level, json, "Tracing initialized");
}

/// Initialize tracing for tests (only logs errors).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("error")
        .with_test_writer()
        .try_init();
}

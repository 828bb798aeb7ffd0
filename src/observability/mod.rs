//! Observability infrastructure.
//!
//! Provides:
//! - Structured tracing setup
//! - Prometheus metrics for rendezvous operations
//! - A separate scrape endpoint for Prometheus

pub mod exporter;
pub mod metrics;
pub mod tracing;

//! Prometheus metrics implementation.
//!
//! Key metrics:
//! - tryst_offers_registered_total: Counter of offers registered
//! - tryst_answers_total: Counter of answers by result (delivered, not_found)
//! - tryst_offer_waits_total: Counter of finished offer waits by outcome
//! - tryst_offer_wait_seconds: Histogram of how long offers waited
//! - tryst_pending_offers: Gauge of offers currently awaiting an answer

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::OnceLock;

/// Global metrics instance.
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Tryst metrics, registered in their own registry.
pub struct Metrics {
    registry: Registry,
    /// Total number of offers registered.
    pub offers_registered: IntCounter,
    /// Answers received, labelled by result.
    pub answers: IntCounterVec,
    /// Offer waits that finished, labelled by outcome.
    pub offer_waits: IntCounterVec,
    /// Time offers spent waiting.
    pub offer_wait_seconds: Histogram,
    /// Offers currently pending.
    pub pending_offers: IntGauge,
}

impl Metrics {
    fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let offers_registered = IntCounter::new(
            "tryst_offers_registered_total",
            "Total number of offers registered",
        )?;
        let answers = IntCounterVec::new(
            Opts::new("tryst_answers_total", "Answers received, by result"),
            &["result"],
        )?;
        let offer_waits = IntCounterVec::new(
            Opts::new("tryst_offer_waits_total", "Finished offer waits, by outcome"),
            &["outcome"],
        )?;
        let offer_wait_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "tryst_offer_wait_seconds",
                "Time from offer registration to the end of its wait",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0]),
        )?;
        let pending_offers =
            IntGauge::new("tryst_pending_offers", "Offers currently awaiting an answer")?;

        registry.register(Box::new(offers_registered.clone()))?;
        registry.register(Box::new(answers.clone()))?;
        registry.register(Box::new(offer_waits.clone()))?;
        registry.register(Box::new(offer_wait_seconds.clone()))?;
        registry.register(Box::new(pending_offers.clone()))?;

        Ok(Self {
            registry,
            offers_registered,
            answers,
            offer_waits,
            offer_wait_seconds,
            pending_offers,
        })
    }
}

/// Initialize the metrics system.
///
/// This should be called once at startup. Subsequent calls are ignored.
pub fn init_metrics() -> prometheus::Result<()> {
    if METRICS.get().is_none() {
        // A concurrent initializer may win the race; either instance is fine.
        let _ = METRICS.set(Metrics::new()?);
    }
    Ok(())
}

/// Get the global metrics instance, if initialized.
pub fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

/// The registry to expose for scraping.
///
/// Empty if metrics were never initialized.
pub fn prometheus_registry() -> Registry {
    METRICS
        .get()
        .map(|m| m.registry.clone())
        .unwrap_or_else(Registry::new)
}

/// Record a newly registered offer.
pub fn record_offer_registered() {
    if let Some(m) = METRICS.get() {
        m.offers_registered.inc();
    }
}

/// Record an answer attempt.
pub fn record_answer(delivered: bool) {
    if let Some(m) = METRICS.get() {
        let result = if delivered { "delivered" } else { "not_found" };
        m.answers.with_label_values(&[result]).inc();
    }
}

/// Record the end of an offer wait.
pub fn record_offer_wait(outcome: &str, waited_seconds: f64) {
    if let Some(m) = METRICS.get() {
        m.offer_waits.with_label_values(&[outcome]).inc();
        m.offer_wait_seconds.observe(waited_seconds);
    }
}

/// Record the current number of pending offers.
pub fn record_pending_offers(pending: usize) {
    if let Some(m) = METRICS.get() {
        m.pending_offers
            .set(i64::try_from(pending).unwrap_or(i64::MAX));
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the router certificate watcher.
//!
//! All metrics use the namespace prefix `router_acme_`.
//!
//! # Metrics Categories
//!
//! - **Cycle Metrics** - Outcome and duration of each reconciliation cycle
//! - **Gap Metrics** - Services and domains still lacking certificates
//! - **Annotation Metrics** - Malformed certificate annotation entries
//!
//! # Example
//!
//! ```rust,no_run
//! use router_acme::metrics::record_cycle_success;
//!
//! record_cycle_success(std::time::Duration::from_millis(120), 12, 2, 3);
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry,
    TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "router_acme";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Cycle Metrics
// ============================================================================

/// Total number of reconciliation cycles by outcome
///
/// Labels:
/// - `status`: Outcome (`success`, `error`)
pub static CYCLES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cycles_total"),
        "Total number of reconciliation cycles by status",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliation cycles in seconds, excluding the sleep
pub static CYCLE_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_cycle_duration_seconds"),
        "Duration of reconciliation cycles in seconds",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = Histogram::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Gap Metrics
// ============================================================================

/// Number of routable services seen in the last successful cycle
pub static SERVICES_CHECKED: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_services_checked"),
        "Number of routable services checked in the last successful cycle",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Number of services with at least one missing certificate
pub static SERVICES_NEEDING_CERTIFICATES: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_services_needing_certificates"),
        "Number of services with domains lacking a certificate in the last successful cycle",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Number of domains lacking a certificate across all services
pub static MISSING_DOMAINS: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_missing_domains"),
        "Number of routed domains lacking a certificate in the last successful cycle",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Annotation Metrics
// ============================================================================

/// Total number of malformed certificate annotation entries skipped
pub static MALFORMED_CERTIFICATE_ENTRIES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        format!("{METRICS_NAMESPACE}_malformed_certificate_entries_total"),
        "Total number of malformed certificate annotation entries skipped",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful cycle
///
/// # Arguments
/// * `duration` - Time spent listing and diffing
/// * `services` - Services returned by the listing
/// * `needing_certificates` - Services with at least one gap
/// * `missing_domains` - Total gapped domains across those services
#[allow(clippy::cast_precision_loss)]
pub fn record_cycle_success(
    duration: Duration,
    services: usize,
    needing_certificates: usize,
    missing_domains: usize,
) {
    CYCLES_TOTAL.with_label_values(&["success"]).inc();
    CYCLE_DURATION_SECONDS.observe(duration.as_secs_f64());
    SERVICES_CHECKED.set(services as f64);
    SERVICES_NEEDING_CERTIFICATES.set(needing_certificates as f64);
    MISSING_DOMAINS.set(missing_domains as f64);
}

/// Record a cycle whose listing failed
///
/// Gap gauges keep the values from the last successful cycle.
pub fn record_cycle_error(duration: Duration) {
    CYCLES_TOTAL.with_label_values(&["error"]).inc();
    CYCLE_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record skipped certificate annotation entries
pub fn record_malformed_certificate_entries(count: usize) {
    MALFORMED_CERTIFICATE_ENTRIES_TOTAL.inc_by(count as u64);
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

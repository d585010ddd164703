//! Self-instrumentation.
//!
//! # Metrics
//! - `ssl_watch_sweeps_total` (counter): completed sweeps
//! - `ssl_watch_sweep_duration_seconds` (histogram): time per sweep
//! - `ssl_watch_sweep_domains` (gauge): domains in the last sweep
//! - `ssl_watch_probe_endpoints_total` (counter): endpoints probed by outcome
//! - `ssl_watch_lookup_failures_total` (counter): DNS failures by reason
//! - `ssl_watch_reloads_total` (counter): reloads by reason and result
//! - `ssl_watch_config_documents_rejected_total` (counter): undecodable documents

use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const SWEEP_BUCKETS: &[f64] = &[0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0];

/// Install the Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("ssl_watch_sweep_duration_seconds".to_string()),
            SWEEP_BUCKETS,
        )?
        .install_recorder()?;

    metrics::describe_counter!("ssl_watch_sweeps_total", "Completed probe sweeps");
    metrics::describe_histogram!(
        "ssl_watch_sweep_duration_seconds",
        metrics::Unit::Seconds,
        "Duration of one sweep over all domains"
    );
    metrics::describe_gauge!("ssl_watch_sweep_domains", "Domains probed in the last sweep");
    metrics::describe_counter!("ssl_watch_probe_endpoints_total", "Endpoints probed, by outcome");
    metrics::describe_counter!("ssl_watch_lookup_failures_total", "Failed DNS lookups, by reason");
    metrics::describe_counter!("ssl_watch_reloads_total", "Configuration reloads, by reason and result");
    metrics::describe_counter!(
        "ssl_watch_config_documents_rejected_total",
        "Config documents that failed to decode"
    );

    Ok(handle)
}

pub fn record_sweep(elapsed: Duration, domains: usize) {
    metrics::counter!("ssl_watch_sweeps_total").increment(1);
    metrics::histogram!("ssl_watch_sweep_duration_seconds").record(elapsed.as_secs_f64());
    metrics::gauge!("ssl_watch_sweep_domains").set(domains as f64);
}

pub fn record_endpoint(alive: bool) {
    let outcome = if alive { "alive" } else { "dead" };
    metrics::counter!("ssl_watch_probe_endpoints_total", "outcome" => outcome).increment(1);
}

pub fn record_lookup_failure(reason: &'static str) {
    metrics::counter!("ssl_watch_lookup_failures_total", "reason" => reason).increment(1);
}

pub fn record_reload(reason: &'static str, applied: bool) {
    let result = if applied { "applied" } else { "failed" };
    metrics::counter!("ssl_watch_reloads_total", "reason" => reason, "result" => result).increment(1);
}

pub fn record_rejected_document() {
    metrics::counter!("ssl_watch_config_documents_rejected_total").increment(1);
}

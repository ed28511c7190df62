//! Metrics collection and exposition.
//!
//! # Metrics
//! - `settings_edits_total` (counter): edit batches by outcome
//! - `settings_access_denied_total` (counter): gate rejections by reason
//! - `settings_cache_entries` (gauge): entries in the current snapshot
//! - `routes_uploads_total` (counter): routes uploads by outcome
//! - `routes_rollbacks_total` (counter): compensating restores attempted
//! - `http_requests_total` (counter) and `http_request_duration_seconds`
//!   (histogram) by method and status

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_edit(outcome: &str) {
    metrics::counter!("settings_edits_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_access_denied(reason: &'static str) {
    metrics::counter!("settings_access_denied_total", "reason" => reason).increment(1);
}

pub fn record_cache_size(entries: usize) {
    metrics::gauge!("settings_cache_entries").set(entries as f64);
}

pub fn record_upload(outcome: &'static str) {
    metrics::counter!("routes_uploads_total", "outcome" => outcome).increment(1);
}

pub fn record_rollback() {
    metrics::counter!("routes_rollbacks_total").increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!("http_requests_total", "method" => method.to_string(), "status" => status.clone())
        .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `echo_http_requests_total` (counter): plain metadata responses
//! - `echo_replays_total` (counter): redirects by `target` (instance, region)
//! - `echo_sessions_total` (counter): sessions ended, by `outcome`
//! - `echo_sessions_active` (gauge): currently open sessions
//! - `echo_messages_total` (counter): echoed messages by `type`
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_metadata_request() {
    counter!("echo_http_requests_total").increment(1);
}

pub fn record_replay(target: &'static str) {
    counter!("echo_replays_total", "target" => target).increment(1);
}

pub fn session_opened() {
    gauge!("echo_sessions_active").increment(1.0);
}

pub fn session_closed(outcome: &'static str) {
    gauge!("echo_sessions_active").decrement(1.0);
    counter!("echo_sessions_total", "outcome" => outcome).increment(1);
}

pub fn record_echo(message_type: &'static str) {
    counter!("echo_messages_total", "type" => message_type).increment(1);
}

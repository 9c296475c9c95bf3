//! Prometheus metrics.
//!
//! Exposed on `/metrics` when `[server] metrics_port` is set. Recording is a
//! no-op until [`init`] has run, so library users and tests that never call
//! it pay nothing.
//!
//! - `warden_reconcile_total{kind,outcome}` - update decisions
//! - `warden_reconcile_duration_seconds{kind}` - time from update to decision
//! - `warden_reverts_failed_total{kind,error}` - corrective writes that failed
//! - `warden_audit_fetch_failures_total` - audit log reads that errored
//! - `warden_notifications_dropped_total` - decision reports that were not delivered
//! - `warden_snapshots{kind}` - entities with a trusted baseline
//! - `warden_bridge_frames_total{direction,frame}` - bridge traffic

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Update decisions by entity kind and outcome.
pub static RECONCILE_OUTCOMES: OnceLock<IntCounterVec> = OnceLock::new();

/// Failed corrective writes by entity kind and error code.
pub static REVERT_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

/// Audit log reads that returned an error.
pub static AUDIT_FETCH_FAILURES: OnceLock<IntCounter> = OnceLock::new();

/// Notifications that could not be delivered.
pub static NOTIFICATIONS_DROPPED: OnceLock<IntCounter> = OnceLock::new();

/// Frames crossing the bridge.
pub static BRIDGE_FRAMES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Stored snapshots by entity kind.
pub static SNAPSHOTS: OnceLock<IntGaugeVec> = OnceLock::new();

/// Latency from update receipt to decision. Includes attribution retries.
pub static RECONCILE_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(RECONCILE_OUTCOMES, IntCounterVec::new(Opts::new("warden_reconcile_total", "Update decisions by outcome"), &["kind", "outcome"]));
    register!(REVERT_FAILURES, IntCounterVec::new(Opts::new("warden_reverts_failed_total", "Corrective writes that failed"), &["kind", "error"]));
    register!(AUDIT_FETCH_FAILURES, IntCounter::new("warden_audit_fetch_failures_total", "Audit log reads that errored"));
    register!(NOTIFICATIONS_DROPPED, IntCounter::new("warden_notifications_dropped_total", "Notifications that could not be delivered"));
    register!(BRIDGE_FRAMES, IntCounterVec::new(Opts::new("warden_bridge_frames_total", "Frames crossing the bridge"), &["direction", "frame"]));
    register!(SNAPSHOTS, IntGaugeVec::new(Opts::new("warden_snapshots", "Entities with a stored baseline"), &["kind"]));
    register!(RECONCILE_LATENCY, HistogramVec::new(
        HistogramOpts::new("warden_reconcile_duration_seconds", "Time from update to decision")
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["kind"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn get_counter_vec(metric: &OnceLock<IntCounterVec>) -> Option<&IntCounterVec> {
    metric.get()
}

fn get_counter(metric: &OnceLock<IntCounter>) -> Option<&IntCounter> {
    metric.get()
}

/// Record the outcome of one update and how long deciding it took.
#[inline]
pub fn record_reconcile(kind: &str, outcome: &str, duration_secs: f64) {
    if let Some(c) = get_counter_vec(&RECONCILE_OUTCOMES) {
        c.with_label_values(&[kind, outcome]).inc();
    }
    if let Some(h) = RECONCILE_LATENCY.get() {
        h.with_label_values(&[kind]).observe(duration_secs);
    }
}

#[inline]
pub fn record_revert_failure(kind: &str, error: &str) {
    if let Some(c) = get_counter_vec(&REVERT_FAILURES) {
        c.with_label_values(&[kind, error]).inc();
    }
}

#[inline]
pub fn record_audit_fetch_failure() {
    if let Some(c) = get_counter(&AUDIT_FETCH_FAILURES) {
        c.inc();
    }
}

#[inline]
pub fn record_notification_dropped() {
    if let Some(c) = get_counter(&NOTIFICATIONS_DROPPED) {
        c.inc();
    }
}

/// `direction` is `in` or `out`.
#[inline]
pub fn record_bridge_frame(direction: &str, frame: &str) {
    if let Some(c) = get_counter_vec(&BRIDGE_FRAMES) {
        c.with_label_values(&[direction, frame]).inc();
    }
}

#[inline]
pub fn set_snapshot_count(kind: &str, count: usize) {
    if let Some(g) = SNAPSHOTS.get() {
        g.with_label_values(&[kind]).set(count as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();

        record_reconcile("channel", "reverted", 0.25);
        record_bridge_frame("in", "CHANNEL_UPDATE");
        set_snapshot_count("role", 3);

        let output = gather_metrics();
        assert!(output.contains("warden_reconcile_total"));
        assert!(output.contains("warden_snapshots"));
    }
}

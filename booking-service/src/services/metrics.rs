use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("Metrics recorder already initialized");
    }
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count a created booking by kind (trial/regular).
pub fn record_booking_created(is_trial: bool) {
    let kind = if is_trial { "trial" } else { "regular" };
    metrics::counter!("bookings_created_total", "kind" => kind).increment(1);
}

/// Count a payment outcome by result.
pub fn record_payment_outcome(outcome: &'static str) {
    metrics::counter!("booking_payment_outcomes_total", "outcome" => outcome).increment(1);
}

/// Count a status transition by target.
pub fn record_status_transition(target: &'static str) {
    metrics::counter!("booking_status_transitions_total", "target" => target).increment(1);
}

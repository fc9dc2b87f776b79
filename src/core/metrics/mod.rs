//! Metrics facade: a thin collaborator wrapping the `metrics` crate so
//! every emission point in the codebase names its metric once, here,
//! instead of scattering string literals through the scheduler loops.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// A cheap-to-clone handle passed into every loop and service that emits
/// metrics. Carries no state of its own — it only knows the metric names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Metrics;

impl Metrics {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn record_ingest_latency(&self, venue: &'static str, elapsed: Duration) {
        histogram!("ingest_latency_ms", "venue" => venue).record(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_ingest_tick(&self, venue: &'static str, at: chrono::DateTime<chrono::Utc>) {
        gauge!("ingest_last_tick_timestamp", "venue" => venue).set(at.timestamp() as f64);
    }

    pub fn record_rule_eval(&self, elapsed: Duration) {
        histogram!("rule_eval_ms").record(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_signal(&self, rule: &'static str) {
        counter!("signals_total", "rule" => rule).increment(1);
    }

    pub fn record_order_intent(&self, status: &'static str) {
        counter!("order_intents_total", "status" => status).increment(1);
    }

    pub fn record_alert_failure(&self) {
        counter!("alert_failures_total").increment(1);
    }

    pub fn record_request(&self, route: &'static str) {
        counter!("requests_total", "route" => route).increment(1);
    }

    pub fn record_health(&self, healthy: bool) {
        gauge!("health").set(if healthy { 1.0 } else { 0.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_handle_is_cheaply_constructed_and_copied() {
        let m = Metrics::new();
        let m2 = m;
        m.record_health(true);
        m2.record_health(false);
    }
}

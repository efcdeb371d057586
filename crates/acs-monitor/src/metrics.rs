//! Prometheus-backed `MetricsCollector`/`BusinessMetrics` implementation.
//!
//! One `CounterVec`/`HistogramVec`/`GaugeVec` per named metric, registered
//! against a dedicated `prometheus::Registry` so the caller controls
//! whether/how it gets exposed (e.g. wired into an existing `/metrics`
//! endpoint elsewhere in the embedding application).

use acs_types::ports::metrics::{BusinessMetrics, MetricsCollector};
use prometheus::{CounterVec, GaugeVec, HistogramVec, Opts, Registry};
use std::time::Duration;

/// Registers and owns the gauges/counters/histograms the monitor and rate
/// limiter emit to.
pub struct PrometheusMetrics {
    registry: Registry,
    requests_allowed: CounterVec,
    requests_blocked: CounterVec,
    resets: CounterVec,
    evaluator_decisions: CounterVec,
    check_duration_seconds: HistogramVec,
    remaining_requests: HistogramVec,
    active_limits_by_tenant: GaugeVec,
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Self {
        let requests_allowed = CounterVec::new(
            Opts::new("acs_requests_allowed_total", "rate-limit checks that admitted a request"),
            &["tenant_id", "policy"],
        )
        .expect("valid metric definition");
        let requests_blocked = CounterVec::new(
            Opts::new("acs_requests_blocked_total", "rate-limit checks that blocked a request"),
            &["tenant_id", "policy"],
        )
        .expect("valid metric definition");
        let resets = CounterVec::new(
            Opts::new("acs_resets_total", "explicit rate-limit resets"),
            &["tenant_id", "policy"],
        )
        .expect("valid metric definition");
        let evaluator_decisions = CounterVec::new(
            Opts::new("acs_evaluator_decisions_total", "authorization decisions produced"),
            &["tenant_id", "allowed"],
        )
        .expect("valid metric definition");
        let check_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "acs_check_duration_seconds",
                "wall-clock duration of RateLimiter::check calls",
            ),
            &["tenant_id", "policy"],
        )
        .expect("valid metric definition");
        let remaining_requests = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "acs_remaining_requests",
                "remaining-quota distribution observed on checks",
            ),
            &["tenant_id", "policy"],
        )
        .expect("valid metric definition");
        let active_limits_by_tenant = GaugeVec::new(
            Opts::new("acs_active_limits_by_tenant", "live rate-limit keys per tenant"),
            &["tenant_id"],
        )
        .expect("valid metric definition");

        for collector in [
            Box::new(requests_allowed.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(requests_blocked.clone()),
            Box::new(resets.clone()),
            Box::new(evaluator_decisions.clone()),
            Box::new(check_duration_seconds.clone()),
            Box::new(remaining_requests.clone()),
            Box::new(active_limits_by_tenant.clone()),
        ] {
            registry
                .register(collector)
                .expect("metric registered exactly once");
        }

        Self {
            registry,
            requests_allowed,
            requests_blocked,
            resets,
            evaluator_decisions,
            check_duration_seconds,
            remaining_requests,
            active_limits_by_tenant,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for PrometheusMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector for PrometheusMetrics {
    fn record_counter(&self, name: &str, value: u64, tags: &[(&str, &str)]) {
        tracing::trace!(target: "acs::metrics", name, value, ?tags, "record_counter (unrouted)");
    }

    fn record_histogram(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        tracing::trace!(target: "acs::metrics", name, value, ?tags, "record_histogram (unrouted)");
    }

    fn record_gauge(&self, name: &str, value: f64, tags: &[(&str, &str)]) {
        tracing::trace!(target: "acs::metrics", name, value, ?tags, "record_gauge (unrouted)");
    }
}

impl BusinessMetrics for PrometheusMetrics {
    fn record_request_allowed(&self, tenant_id: &str, policy: &str) {
        self.requests_allowed.with_label_values(&[tenant_id, policy]).inc();
    }

    fn record_request_blocked(&self, tenant_id: &str, policy: &str) {
        self.requests_blocked.with_label_values(&[tenant_id, policy]).inc();
    }

    fn record_reset(&self, tenant_id: &str, policy: &str) {
        self.resets.with_label_values(&[tenant_id, policy]).inc();
    }

    fn record_check_duration(&self, tenant_id: &str, policy: &str, duration: Duration) {
        self.check_duration_seconds
            .with_label_values(&[tenant_id, policy])
            .observe(duration.as_secs_f64());
    }

    fn record_remaining_requests(&self, tenant_id: &str, policy: &str, remaining: u32) {
        self.remaining_requests
            .with_label_values(&[tenant_id, policy])
            .observe(remaining as f64);
    }

    fn record_active_limits(&self, tenant_id: &str, count: u64) {
        self.active_limits_by_tenant
            .with_label_values(&[tenant_id])
            .set(count as f64);
    }

    fn record_decision(&self, tenant_id: &str, allowed: bool) {
        self.evaluator_decisions
            .with_label_values(&[tenant_id, if allowed { "true" } else { "false" }])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Encoder;

    #[test]
    fn metrics_register_exactly_once_and_are_queryable() {
        let metrics = PrometheusMetrics::new();
        metrics.record_request_allowed("acme", "default");
        metrics.record_request_blocked("acme", "default");
        metrics.record_active_limits("acme", 3);
        metrics.record_check_duration("acme", "default", Duration::from_millis(12));

        let mut buffer = Vec::new();
        let encoder = prometheus::TextEncoder::new();
        encoder.encode(&metrics.registry().gather(), &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("acs_requests_allowed_total"));
        assert!(output.contains("acs_active_limits_by_tenant"));
    }
}

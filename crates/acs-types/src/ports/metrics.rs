//! Metrics collection port definitions.
//!
//! Defines the abstract metrics collection interfaces. Supports low-level
//! metrics (counters, histograms, gauges) and the semantic, access-control
//! specific metrics the monitor emits.

use std::time::Duration;

/// Low-level metrics collector port.
pub trait MetricsCollector: Send + Sync {
    fn record_counter(&self, name: &str, value: u64, tags: &[(&str, &str)]);

    fn record_histogram(&self, name: &str, value: f64, tags: &[(&str, &str)]);

    fn record_gauge(&self, name: &str, value: f64, tags: &[(&str, &str)]);
}

/// Semantic metrics specific to the access control system, layered on top
/// of `MetricsCollector`.
pub trait BusinessMetrics: Send + Sync {
    /// A rate-limit check admitted the request.
    fn record_request_allowed(&self, tenant_id: &str, policy: &str);

    /// A rate-limit check blocked the request.
    fn record_request_blocked(&self, tenant_id: &str, policy: &str);

    /// A rate-limit key was explicitly reset.
    fn record_reset(&self, tenant_id: &str, policy: &str);

    /// Duration of a single `RateLimiter::check` call.
    fn record_check_duration(&self, tenant_id: &str, policy: &str, duration: Duration);

    /// Remaining-quota distribution observed on checks.
    fn record_remaining_requests(&self, tenant_id: &str, policy: &str, remaining: u32);

    /// Point-in-time count of active rate-limit keys for a tenant.
    fn record_active_limits(&self, tenant_id: &str, count: u64);

    /// An evaluator decision was produced (for audit/observability, not for
    /// authorization itself).
    fn record_decision(&self, tenant_id: &str, allowed: bool);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockMetricsCollector {
        counters: Arc<Mutex<Vec<(String, u64)>>>,
        histograms: Arc<Mutex<Vec<(String, f64)>>>,
        gauges: Arc<Mutex<Vec<(String, f64)>>>,
    }

    impl MetricsCollector for MockMetricsCollector {
        fn record_counter(&self, name: &str, value: u64, _tags: &[(&str, &str)]) {
            self.counters
                .lock()
                .unwrap()
                .push((name.to_string(), value));
        }

        fn record_histogram(&self, name: &str, value: f64, _tags: &[(&str, &str)]) {
            self.histograms
                .lock()
                .unwrap()
                .push((name.to_string(), value));
        }

        fn record_gauge(&self, name: &str, value: f64, _tags: &[(&str, &str)]) {
            self.gauges.lock().unwrap().push((name.to_string(), value));
        }
    }

    impl BusinessMetrics for MockMetricsCollector {
        fn record_request_allowed(&self, tenant_id: &str, policy: &str) {
            self.record_counter("requests_allowed", 1, &[("tenant_id", tenant_id), ("policy", policy)]);
        }

        fn record_request_blocked(&self, tenant_id: &str, policy: &str) {
            self.record_counter("requests_blocked", 1, &[("tenant_id", tenant_id), ("policy", policy)]);
        }

        fn record_reset(&self, tenant_id: &str, policy: &str) {
            self.record_counter("resets", 1, &[("tenant_id", tenant_id), ("policy", policy)]);
        }

        fn record_check_duration(&self, tenant_id: &str, policy: &str, duration: Duration) {
            self.record_histogram(
                "check_duration_seconds",
                duration.as_secs_f64(),
                &[("tenant_id", tenant_id), ("policy", policy)],
            );
        }

        fn record_remaining_requests(&self, tenant_id: &str, policy: &str, remaining: u32) {
            self.record_histogram(
                "remaining_requests",
                remaining as f64,
                &[("tenant_id", tenant_id), ("policy", policy)],
            );
        }

        fn record_active_limits(&self, tenant_id: &str, count: u64) {
            self.record_gauge("active_limits_by_tenant", count as f64, &[("tenant_id", tenant_id)]);
        }

        fn record_decision(&self, tenant_id: &str, allowed: bool) {
            self.record_counter(
                "evaluator_decisions",
                1,
                &[("tenant_id", tenant_id), ("allowed", if allowed { "true" } else { "false" })],
            );
        }
    }

    #[test]
    fn business_metrics_delegate_to_collector() {
        let collector = MockMetricsCollector::default();
        collector.record_request_allowed("acme", "default");
        collector.record_request_blocked("acme", "default");
        collector.record_active_limits("acme", 3);

        assert_eq!(collector.counters.lock().unwrap().len(), 2);
        assert_eq!(collector.gauges.lock().unwrap().len(), 1);
    }
}

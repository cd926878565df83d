use std::time::Duration;

use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub transitions_total: IntCounterVec,
    pub open_broadcasts: IntGauge,
    pub audit_events_total: IntCounterVec,
    pub advisor_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let transitions_total = IntCounterVec::new(
            Opts::new("transitions_total", "Status transitions by operation and outcome"),
            &["op", "outcome"],
        )
        .expect("valid transitions_total metric");

        let open_broadcasts = IntGauge::new(
            "open_broadcasts",
            "Broadcast deliveries currently waiting for a driver",
        )
        .expect("valid open_broadcasts metric");

        let audit_events_total = IntCounterVec::new(
            Opts::new("audit_events_total", "Audit log writes by event and outcome"),
            &["event", "outcome"],
        )
        .expect("valid audit_events_total metric");

        let advisor_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "advisor_latency_seconds",
                "Latency of AI advisory calls in seconds",
            ),
            &["outcome"],
        )
        .expect("valid advisor_latency_seconds metric");

        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(open_broadcasts.clone()))
            .expect("register open_broadcasts");
        registry
            .register(Box::new(audit_events_total.clone()))
            .expect("register audit_events_total");
        registry
            .register(Box::new(advisor_latency_seconds.clone()))
            .expect("register advisor_latency_seconds");

        Self {
            registry,
            transitions_total,
            open_broadcasts,
            audit_events_total,
            advisor_latency_seconds,
        }
    }

    pub fn observe_transition(&self, op: &str, ok: bool) {
        self.transitions_total
            .with_label_values(&[op, outcome(ok)])
            .inc();
    }

    pub fn observe_audit(&self, event: &str, stored: bool) {
        self.audit_events_total
            .with_label_values(&[event, outcome(stored)])
            .inc();
    }

    pub fn observe_advisor(&self, ok: bool, elapsed: Duration) {
        self.advisor_latency_seconds
            .with_label_values(&[outcome(ok)])
            .observe(elapsed.as_secs_f64());
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "error"
    }
}

use prometheus::{
    Encoder, GaugeVec, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};

/// Assignment metrics on a private registry; the host decides how to expose them.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub assignments_total: IntCounterVec,
    pub assignment_latency_seconds: HistogramVec,
    pub candidates_in_radius: Histogram,
    pub reassignments_total: IntCounterVec,
    pub ledger_workload: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let assignments_total = IntCounterVec::new(
            Opts::new("assignments_total", "Total assignment attempts by outcome"),
            &["outcome"],
        )
        .expect("valid assignments_total metric");

        let assignment_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "assignment_latency_seconds",
                "Latency of a single assignment in seconds",
            ),
            &["outcome"],
        )
        .expect("valid assignment_latency_seconds metric");

        let candidates_in_radius = Histogram::with_opts(
            HistogramOpts::new(
                "candidates_in_radius",
                "Eligible candidates left after the radius prefilter",
            )
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        )
        .expect("valid candidates_in_radius metric");

        let reassignments_total = IntCounterVec::new(
            Opts::new("reassignments_total", "Sweep items by outcome"),
            &["outcome"],
        )
        .expect("valid reassignments_total metric");

        let ledger_workload = GaugeVec::new(
            Opts::new(
                "ledger_workload",
                "Simulated resource workload at the end of the last batch",
            ),
            &["resource_id"],
        )
        .expect("valid ledger_workload metric");

        registry
            .register(Box::new(assignments_total.clone()))
            .expect("register assignments_total");
        registry
            .register(Box::new(assignment_latency_seconds.clone()))
            .expect("register assignment_latency_seconds");
        registry
            .register(Box::new(candidates_in_radius.clone()))
            .expect("register candidates_in_radius");
        registry
            .register(Box::new(reassignments_total.clone()))
            .expect("register reassignments_total");
        registry
            .register(Box::new(ledger_workload.clone()))
            .expect("register ledger_workload");

        Self {
            registry,
            assignments_total,
            assignment_latency_seconds,
            candidates_in_radius,
            reassignments_total,
            ledger_workload,
        }
    }

    pub fn record_assignment(&self, outcome: &str, elapsed_secs: f64) {
        self.assignments_total.with_label_values(&[outcome]).inc();
        self.assignment_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_secs);
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

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

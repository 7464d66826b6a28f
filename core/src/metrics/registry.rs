use prometheus::{
  Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use shared::metrics::{LABEL_ERROR, LABEL_SOURCE};

/// Prometheus metrics for the refresh cycle.
///
/// Cloning is cheap; clones share the same underlying collectors.
#[derive(Clone)]
pub struct DiscoveryMetrics {
  pub registry: Registry,
  // Cycle metrics
  pub refreshes: IntCounter,
  pub refresh_failures: IntCounterVec,
  pub refresh_duration: Histogram,
  // Result metrics
  pub targets: IntGauge,
  pub rows_skipped: IntCounter,
  pub labels_rejected: IntCounter,
  pub targets_deduplicated: IntCounter,
}

impl DiscoveryMetrics {
  /// Create the collectors, labelled with the target group `source` name.
  pub fn new(source: &str) -> anyhow::Result<Self> {
    let registry = Registry::new();
    let constant = |opts: Opts| opts.const_label(LABEL_SOURCE, source);

    let refreshes = IntCounter::with_opts(constant(Opts::new(
      "dbsd_refreshes_total",
      "Total refresh cycles started",
    )))?;
    let refresh_failures = IntCounterVec::new(
      constant(Opts::new(
        "dbsd_refresh_failures_total",
        "Refresh cycles that ended without data, by error kind",
      )),
      &[LABEL_ERROR],
    )?;
    let refresh_duration = Histogram::with_opts(
      HistogramOpts::new("dbsd_refresh_duration_seconds", "Refresh cycle duration")
        .const_label(LABEL_SOURCE, source)
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]),
    )?;

    let targets = IntGauge::with_opts(constant(Opts::new(
      "dbsd_targets",
      "Targets in the most recent target group",
    )))?;
    let rows_skipped = IntCounter::with_opts(constant(Opts::new(
      "dbsd_rows_skipped_total",
      "Rows dropped because they could not be decoded",
    )))?;
    let labels_rejected = IntCounter::with_opts(constant(Opts::new(
      "dbsd_labels_rejected_total",
      "Malformed custom label pairs dropped",
    )))?;
    let targets_deduplicated = IntCounter::with_opts(constant(Opts::new(
      "dbsd_targets_deduplicated_total",
      "Targets dropped because an identical one was already in the group",
    )))?;

    // Register all metrics
    registry.register(Box::new(refreshes.clone()))?;
    registry.register(Box::new(refresh_failures.clone()))?;
    registry.register(Box::new(refresh_duration.clone()))?;
    registry.register(Box::new(targets.clone()))?;
    registry.register(Box::new(rows_skipped.clone()))?;
    registry.register(Box::new(labels_rejected.clone()))?;
    registry.register(Box::new(targets_deduplicated.clone()))?;

    Ok(Self {
      registry,
      refreshes,
      refresh_failures,
      refresh_duration,
      targets,
      rows_skipped,
      labels_rejected,
      targets_deduplicated,
    })
  }

  /// Encode all metrics in Prometheus text format.
  pub fn encode(&self) -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let families = self.registry.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
  }
}

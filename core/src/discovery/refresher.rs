use super::labels::LabelBuilder;
use crate::metrics::DiscoveryMetrics;
use shared::error::DiscoveryError;
use shared::source::EndpointSource;
use shared::target::TargetGroup;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument, Span};

/// Phase of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
  /// Waiting for the scheduler tick.
  Idle,
  /// Waiting on the endpoint source.
  Querying,
  /// Folding records into the target group.
  Building,
  /// Finished, with or without an error.
  Done,
}

/// Everything one cycle produced.
///
/// `group` is always well formed: a failed cycle carries an empty group
/// next to its `error`, so the consumer can reconcile to "no targets".
#[derive(Debug)]
pub struct CycleReport {
  pub group: TargetGroup,
  /// States visited, starting at `Idle` and ending at `Done`.
  pub trail: Vec<CycleState>,
  pub skipped_rows: usize,
  pub rejected_labels: usize,
  pub duplicates: usize,
  /// Cycle-level failure (connection, query, cancellation).
  pub error: Option<DiscoveryError>,
}

impl CycleReport {
  pub fn is_ok(&self) -> bool {
    self.error.is_none()
  }
}

/// Runs one discovery cycle: source query, then label building.
///
/// Holds no state between cycles besides its immutable settings; the
/// scheduler calling [`Refresher::refresh`] guarantees cycles do not overlap.
pub struct Refresher {
  source: Arc<dyn EndpointSource>,
  builder: LabelBuilder,
  source_name: String,
  metrics: DiscoveryMetrics,
  span: Span,
}

impl Refresher {
  pub fn new(
    source: Arc<dyn EndpointSource>,
    builder: LabelBuilder,
    source_name: impl Into<String>,
    metrics: DiscoveryMetrics,
  ) -> Self {
    let source_name = source_name.into();
    let span = tracing::info_span!("refresh", source = %source_name);
    Self {
      source,
      builder,
      source_name,
      metrics,
      span,
    }
  }

  /// Run every cycle inside `span` instead of the default `refresh` span.
  pub fn with_span(mut self, span: Span) -> Self {
    self.span = span;
    self
  }

  pub fn source_name(&self) -> &str {
    &self.source_name
  }

  pub fn metrics(&self) -> &DiscoveryMetrics {
    &self.metrics
  }

  /// Run one cycle. Never fails: errors are reported in the returned
  /// [`CycleReport`] next to an empty group.
  pub async fn refresh(&self, cancel: &CancellationToken) -> CycleReport {
    self.run_cycle(cancel).instrument(self.span.clone()).await
  }

  async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
    let started = Instant::now();
    self.metrics.refreshes.inc();

    let mut trail = vec![CycleState::Idle];
    transition(&mut trail, CycleState::Querying);

    let fetched = match self.source.fetch_endpoints(cancel).await {
      Ok(fetched) => fetched,
      Err(e) => {
        warn!(
            store = %self.source.describe(),
            error = %e.chain(),
            kind = e.kind(),
            "refresh failed, delivering empty target group"
        );
        self
          .metrics
          .refresh_failures
          .with_label_values(&[e.kind()])
          .inc();
        self.metrics.targets.set(0);
        transition(&mut trail, CycleState::Done);
        self.observe_duration(started);

        return CycleReport {
          group: TargetGroup::empty(&self.source_name),
          trail,
          skipped_rows: 0,
          rejected_labels: 0,
          duplicates: 0,
          error: Some(e),
        };
      }
    };
    transition(&mut trail, CycleState::Building);

    let mut group = TargetGroup::empty(&self.source_name);
    let mut seen = HashSet::with_capacity(fetched.records.len());
    let mut rejected_labels = 0;
    let mut duplicates = 0;

    for record in &fetched.records {
      let built = self.builder.build(record);
      for err in &built.rejected {
        warn!(address = %record.address(), error = %err, "dropping malformed custom label");
      }
      rejected_labels += built.rejected.len();

      if seen.insert(built.labels.clone()) {
        group.targets.push(built.labels);
      } else {
        duplicates += 1;
        debug!(address = %record.address(), "dropping duplicate target");
      }
    }

    self.metrics.rows_skipped.inc_by(fetched.skipped as u64);
    self.metrics.labels_rejected.inc_by(rejected_labels as u64);
    self.metrics.targets_deduplicated.inc_by(duplicates as u64);
    self.metrics.targets.set(group.len() as i64);
    transition(&mut trail, CycleState::Done);
    self.observe_duration(started);

    info!(
        targets = group.len(),
        skipped_rows = fetched.skipped,
        rejected_labels,
        duplicates,
        "refresh complete"
    );

    CycleReport {
      group,
      trail,
      skipped_rows: fetched.skipped,
      rejected_labels,
      duplicates,
      error: None,
    }
  }

  fn observe_duration(&self, started: Instant) {
    self
      .metrics
      .refresh_duration
      .observe(started.elapsed().as_secs_f64());
  }
}

fn transition(trail: &mut Vec<CycleState>, next: CycleState) {
  if let Some(from) = trail.last() {
    debug!(from = ?from, to = ?next, "cycle state transition");
  }
  trail.push(next);
}

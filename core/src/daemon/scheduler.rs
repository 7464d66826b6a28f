use crate::discovery::{CycleReport, Refresher};
use shared::target::TargetGroup;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Drives a [`Refresher`] on a fixed interval.
///
/// Refreshes once immediately, then on every tick. Each cycle's group is
/// sent on the channel, failed cycles included (as an empty group), so the
/// consumer never keeps serving targets the store no longer confirms. A
/// cycle that runs past `cycle_timeout` is cancelled. Ticks that fire while
/// a cycle is still running are delayed, never stacked, so cycles cannot
/// overlap.
pub struct RefreshLoop {
  refresher: Refresher,
  interval: Duration,
  cycle_timeout: Duration,
  observer: Option<CycleObserver>,
}

/// Called with every finished cycle's report before its group is sent.
pub type CycleObserver = Box<dyn Fn(&CycleReport) + Send + Sync>;

impl RefreshLoop {
  pub fn new(refresher: Refresher, interval: Duration) -> Self {
    Self {
      refresher,
      interval,
      cycle_timeout: interval,
      observer: None,
    }
  }

  pub fn with_cycle_timeout(mut self, timeout: Duration) -> Self {
    self.cycle_timeout = timeout;
    self
  }

  pub fn on_cycle(mut self, observer: impl Fn(&CycleReport) + Send + Sync + 'static) -> Self {
    self.observer = Some(Box::new(observer));
    self
  }

  /// Run until `shutdown` fires or the receiver goes away.
  pub async fn run(self, tx: mpsc::Sender<Vec<TargetGroup>>, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        source = %self.refresher.source_name(),
        interval_secs = self.interval.as_secs_f64(),
        "refresh loop started"
    );

    loop {
      tokio::select! {
          _ = shutdown.cancelled() => break,
          _ = ticker.tick() => {}
      }

      let report = self.run_cycle(&shutdown).await;
      if shutdown.is_cancelled() {
        break;
      }
      if let Some(observer) = &self.observer {
        observer(&report);
      }

      if tx.send(vec![report.group]).await.is_err() {
        info!("target group receiver dropped");
        break;
      }
    }

    info!(source = %self.refresher.source_name(), "refresh loop stopped");
  }

  /// One cycle bounded by `cycle_timeout`. The cycle token is a child of
  /// `shutdown`, so shutdown cancels the in-flight query too.
  async fn run_cycle(&self, shutdown: &CancellationToken) -> CycleReport {
    let cycle = shutdown.child_token();
    let refresh = self.refresher.refresh(&cycle);
    tokio::pin!(refresh);

    tokio::select! {
        report = &mut refresh => report,
        _ = tokio::time::sleep(self.cycle_timeout) => {
          warn!(
              timeout_secs = self.cycle_timeout.as_secs_f64(),
              "refresh cycle timed out, cancelling"
          );
          cycle.cancel();
          refresh.await
        }
    }
  }
}

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Health check state.
///
/// The daemon is "ready" once the first target group has been delivered.
/// Liveness stays true for the whole run: a failing store only shows up in
/// `last_cycle_ok` and in the failure counters, never as a restart signal.
pub struct HealthEndpoint {
  ready: Arc<AtomicBool>,
  live: Arc<AtomicBool>,
  last_cycle_ok: Arc<AtomicBool>,
  cycles: Arc<AtomicU64>,
}

impl HealthEndpoint {
  pub fn new() -> Self {
    Self {
      ready: Arc::new(AtomicBool::new(false)),
      live: Arc::new(AtomicBool::new(true)),
      last_cycle_ok: Arc::new(AtomicBool::new(false)),
      cycles: Arc::new(AtomicU64::new(0)),
    }
  }

  /// Record a delivered cycle. The first one marks the daemon ready.
  pub fn record_cycle(&self, ok: bool) {
    self.last_cycle_ok.store(ok, Ordering::Release);
    self.cycles.fetch_add(1, Ordering::Relaxed);
    if !self.ready.swap(true, Ordering::AcqRel) {
      info!("health: first target group delivered, daemon is ready");
    }
  }

  /// Mark the daemon as not ready (e.g. during shutdown).
  pub fn set_not_ready(&self) {
    self.ready.store(false, Ordering::Release);
  }

  /// Mark the daemon as not live (fatal error).
  pub fn set_not_live(&self) {
    self.live.store(false, Ordering::Release);
  }

  /// Returns `true` once a target group has been delivered.
  pub fn is_ready(&self) -> bool {
    self.ready.load(Ordering::Acquire)
  }

  /// Returns `true` if the daemon is alive and should not be restarted.
  pub fn is_live(&self) -> bool {
    self.live.load(Ordering::Acquire)
  }

  /// Health check response as JSON.
  pub fn status_json(&self) -> String {
    serde_json::json!({
      "ready": self.is_ready(),
      "live": self.is_live(),
      "last_cycle_ok": self.last_cycle_ok.load(Ordering::Acquire),
      "cycles": self.cycles.load(Ordering::Relaxed),
    })
    .to_string()
  }
}

impl Default for HealthEndpoint {
  fn default() -> Self {
    Self::new()
  }
}

impl Clone for HealthEndpoint {
  fn clone(&self) -> Self {
    Self {
      ready: Arc::clone(&self.ready),
      live: Arc::clone(&self.live),
      last_cycle_ok: Arc::clone(&self.last_cycle_ok),
      cycles: Arc::clone(&self.cycles),
    }
  }
}

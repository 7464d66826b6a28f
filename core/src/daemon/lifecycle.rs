use tokio::signal;
use tracing::info;

/// Manages the daemon lifecycle: startup → running → graceful shutdown.
pub struct Lifecycle {
  state: LifecycleState,
}

/// Current lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
  /// Initializing (loading config, registering metrics, binding listeners).
  Initializing,
  /// Running (refresh loop ticking).
  Running,
  /// Shutting down (cancelling the in-flight cycle, flushing output).
  ShuttingDown,
  /// Stopped.
  Stopped,
}

impl Lifecycle {
  pub fn new() -> Self {
    Self {
      state: LifecycleState::Initializing,
    }
  }

  /// Transition to the next state.
  pub fn transition(&mut self, new_state: LifecycleState) {
    info!(
        from = ?self.state,
        to = ?new_state,
        "lifecycle state transition"
    );
    self.state = new_state;
  }

  /// Current state.
  pub fn state(&self) -> LifecycleState {
    self.state
  }

  /// Wait for a shutdown signal (SIGINT or SIGTERM).
  pub async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
      let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
      tokio::select! {
          res = signal::ctrl_c() => {
            res?;
            info!("received SIGINT");
          }
          _ = terminate.recv() => info!("received SIGTERM"),
      }
    }

    #[cfg(not(unix))]
    {
      signal::ctrl_c().await?;
      info!("received SIGINT");
    }

    Ok(())
  }
}

impl Default for Lifecycle {
  fn default() -> Self {
    Self::new()
  }
}

use tracing::info;

/// Daemon runtime configuration.
///
/// Discovery does one query per interval, so a couple of workers cover the
/// refresh loop, the output writer and the HTTP listener.
pub struct RuntimeConfig {
  /// Number of Tokio worker threads.
  pub worker_threads: usize,
  /// Thread name prefix.
  pub thread_name: String,
}

impl Default for RuntimeConfig {
  fn default() -> Self {
    Self {
      worker_threads: num_cpus().min(2),
      thread_name: "dbsd-worker".to_string(),
    }
  }
}

impl RuntimeConfig {
  /// Build a Tokio runtime from this config.
  pub fn build_runtime(&self) -> anyhow::Result<tokio::runtime::Runtime> {
    let rt = tokio::runtime::Builder::new_multi_thread()
      .worker_threads(self.worker_threads)
      .thread_name(&self.thread_name)
      .enable_all()
      .build()?;

    info!(workers = self.worker_threads, "tokio runtime configured");

    Ok(rt)
  }
}

fn num_cpus() -> usize {
  std::thread::available_parallelism()
    .map(|n| n.get())
    .unwrap_or(2)
}

use dbsd_core::daemon::{Lifecycle, LifecycleState, RefreshLoop, RuntimeConfig};
use dbsd_core::discovery::{LabelBuilder, Refresher};
use dbsd_core::metrics::DiscoveryMetrics;
use dbsd_http::{FileSdWriter, HealthEndpoint, HttpState};
use dbsd_pgsql::PgQueryExecutor;
use shared::config::{self, DiscoveryConfig};
use shared::source::EndpointSource;
use shared::target::TargetGroup;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
  let env = std::env::var("DBSD_ENV").unwrap_or_else(|_| "development".to_string());
  let config_dir = Path::new("config");
  let cfg = config::load_config(config_dir, &env)?;

  init_logging(&cfg.observability.log_level);
  info!(env = %env, "dbsd starting, configuration loaded");

  let runtime_cfg = RuntimeConfig::default();
  let rt = runtime_cfg.build_runtime()?;

  rt.block_on(async move { run_daemon(cfg).await })
}

async fn run_daemon(cfg: DiscoveryConfig) -> anyhow::Result<()> {
  let mut lifecycle = Lifecycle::new();

  // Phase 1: Initialize
  lifecycle.transition(LifecycleState::Initializing);

  let metrics = DiscoveryMetrics::new(&cfg.discovery.source_name)?;
  let health = HealthEndpoint::new();
  let shutdown = CancellationToken::new();

  let executor = PgQueryExecutor::from_discovery_config(&cfg);
  info!(
      store = %executor.describe(),
      shard_id = %cfg.filter.shard_id,
      class = %cfg.filter.class,
      "endpoint source configured"
  );

  let refresher = Refresher::new(
    Arc::new(executor),
    LabelBuilder::new(cfg.discovery.metrics_path.clone()),
    cfg.discovery.source_name.clone(),
    metrics.clone(),
  );
  let cycle_health = health.clone();
  let refresh_loop = RefreshLoop::new(refresher, cfg.refresh_interval())
    .with_cycle_timeout(cfg.cycle_timeout())
    .on_cycle(move |report| cycle_health.record_cycle(report.is_ok()));

  let http = cfg.observability.http_addr().map(|addr| {
    let addr = addr.to_string();
    let state = HttpState {
      health: health.clone(),
      metrics: metrics.clone(),
    };
    let token = shutdown.clone();
    tokio::spawn(async move { dbsd_http::serve(&addr, state, token).await })
  });

  let writer = cfg.output.file_sd_path.as_deref().map(FileSdWriter::new);
  let (tx, rx) = mpsc::channel(1);
  let consumer = tokio::spawn(consume_groups(rx, writer));
  let refresher_task = tokio::spawn(refresh_loop.run(tx, shutdown.clone()));

  // Phase 2: Running
  lifecycle.transition(LifecycleState::Running);
  info!(
      interval_secs = cfg.discovery.refresh_interval_secs,
      "daemon is running"
  );

  if let Err(e) = Lifecycle::wait_for_shutdown().await {
    error!(error = %e, "signal handler failed, shutting down");
  }

  // Phase 3: Shutdown
  lifecycle.transition(LifecycleState::ShuttingDown);
  health.set_not_ready();
  shutdown.cancel();

  if let Err(e) = refresher_task.await {
    health.set_not_live();
    error!(error = %e, "refresh loop task failed");
  }
  if let Err(e) = consumer.await {
    error!(error = %e, "output task failed");
  }
  if let Some(http) = http {
    match http.await {
      Ok(Err(e)) => error!(error = %e, "http listener failed"),
      Err(e) => error!(error = %e, "http task failed"),
      Ok(Ok(())) => {}
    }
  }

  lifecycle.transition(LifecycleState::Stopped);
  info!("dbsd stopped");

  Ok(())
}

/// Receive every delivered group and write it out.
async fn consume_groups(mut rx: mpsc::Receiver<Vec<TargetGroup>>, writer: Option<FileSdWriter>) {
  while let Some(groups) = rx.recv().await {
    let targets: usize = groups.iter().map(TargetGroup::len).sum();
    info!(groups = groups.len(), targets, "target groups delivered");

    if let Some(writer) = &writer {
      if let Err(e) = writer.write(&groups).await {
        warn!(path = %writer.path().display(), error = %e, "failed to write file_sd output");
      }
    }
  }
}

fn init_logging(default_level: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_thread_ids(true)
    .init();
}

#![cfg(test)]
//! Refresh loop to `file_sd` output, with scripted sources in place of a store.

use async_trait::async_trait;
use dbsd_core::daemon::RefreshLoop;
use dbsd_core::discovery::{LabelBuilder, Refresher};
use dbsd_core::metrics::DiscoveryMetrics;
use dbsd_http::{FileSdWriter, HealthEndpoint};
use shared::error::{DiscoveryError, Result};
use shared::source::{EndpointSource, FetchedEndpoints};
use shared::target::{EndpointRecord, FileSdEntry};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct ScriptedSource {
  answers: Mutex<VecDeque<Result<FetchedEndpoints>>>,
}

#[async_trait]
impl EndpointSource for ScriptedSource {
  async fn fetch_endpoints(&self, _cancel: &CancellationToken) -> Result<FetchedEndpoints> {
    self
      .answers
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Ok(FetchedEndpoints::default()))
  }

  fn describe(&self) -> String {
    "scripted".to_string()
  }
}

fn endpoints(rows: &[(&str, &str, &str)]) -> Result<FetchedEndpoints> {
  let records = rows
    .iter()
    .map(|(host, port, labels)| EndpointRecord::new(*host, *port, "", *labels).unwrap())
    .collect();
  Ok(FetchedEndpoints::new(records, 0))
}

fn read_entries(writer: &FileSdWriter) -> Vec<FileSdEntry> {
  let raw = std::fs::read_to_string(writer.path()).unwrap();
  serde_json::from_str(&raw).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_store_outage_clears_file_sd_targets() {
  let source = Arc::new(ScriptedSource {
    answers: Mutex::new(VecDeque::from(vec![
      endpoints(&[("a.internal", "9100", "env=prod"), ("b.internal", "9100", "")]),
      Err(DiscoveryError::ConnectFailed("connection refused".into())),
      endpoints(&[("b.internal", "9100", "")]),
    ])),
  });
  let metrics = DiscoveryMetrics::new("database").unwrap();
  let refresher = Refresher::new(source, LabelBuilder::new("/metrics"), "database", metrics.clone());

  let health = HealthEndpoint::new();
  let cycle_health = health.clone();
  let refresh_loop = RefreshLoop::new(refresher, Duration::from_secs(10))
    .on_cycle(move |report| cycle_health.record_cycle(report.is_ok()));

  let dir = tempfile::tempdir().unwrap();
  let writer = FileSdWriter::new(dir.path().join("targets.json"));
  let (tx, mut rx) = mpsc::channel(1);
  let shutdown = CancellationToken::new();
  let handle = tokio::spawn(refresh_loop.run(tx, shutdown.clone()));

  // Cycle 1: two targets.
  writer.write(&rx.recv().await.unwrap()).await.unwrap();
  let entries = read_entries(&writer);
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0].targets, vec!["a.internal:9100".to_string()]);
  assert_eq!(entries[0].labels["env"], "prod");
  assert!(health.is_ready());

  // Cycle 2: store down, the file is emptied rather than left stale.
  writer.write(&rx.recv().await.unwrap()).await.unwrap();
  assert!(read_entries(&writer).is_empty());
  assert!(health.status_json().contains(r#""last_cycle_ok":false"#));

  // Cycle 3: recovered.
  writer.write(&rx.recv().await.unwrap()).await.unwrap();
  assert_eq!(read_entries(&writer).len(), 1);
  assert!(health.status_json().contains(r#""last_cycle_ok":true"#));

  shutdown.cancel();
  handle.await.unwrap();

  assert_eq!(metrics.refreshes.get(), 3);
  assert_eq!(
    metrics
      .refresh_failures
      .with_label_values(&["connection"])
      .get(),
    1
  );
}

#[tokio::test]
async fn test_metrics_text_reports_targets_after_cycle() {
  let source = Arc::new(ScriptedSource {
    answers: Mutex::new(VecDeque::from(vec![endpoints(&[
      ("a.internal", "9100", ""),
      ("a.internal", "9100", ""),
    ])])),
  });
  let metrics = DiscoveryMetrics::new("database").unwrap();
  let refresher = Refresher::new(source, LabelBuilder::new("/metrics"), "database", metrics.clone());

  let report = refresher.refresh(&CancellationToken::new()).await;
  assert_eq!(report.group.len(), 1);
  assert_eq!(report.duplicates, 1);

  let text = metrics.encode();
  assert!(text.contains(r#"dbsd_targets{source="database"} 1"#));
  assert!(text.contains(r#"dbsd_targets_deduplicated_total{source="database"} 1"#));
}

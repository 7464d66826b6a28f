#![cfg(test)]
use super::fixtures::{clear_shard, connect, insert_endpoint, load_test_config};
use dbsd_core::discovery::{LabelBuilder, Refresher};
use dbsd_core::metrics::DiscoveryMetrics;
use dbsd_pgsql::PgQueryExecutor;
use shared::source::EndpointSource;
use shared::target::{ADDRESS_LABEL, METRICS_PATH_LABEL};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::test]
#[ignore]
async fn test_filter_returns_only_matching_shard_and_class() {
  let shard = "it-filter";
  let cfg = load_test_config(shard);
  let client = connect(&cfg).await;
  clear_shard(client.inner(), shard).await;

  insert_endpoint(client.inner(), shard, "node", Some("a.internal"), Some("9100"), None, None).await;
  insert_endpoint(client.inner(), shard, "db", Some("b.internal"), Some("9187"), None, None).await;
  insert_endpoint(client.inner(), "it-other", "node", Some("c.internal"), Some("9100"), None, None)
    .await;

  let executor = PgQueryExecutor::from_discovery_config(&cfg);
  let fetched = executor
    .fetch_endpoints(&CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(fetched.records.len(), 1);
  assert_eq!(fetched.records[0].address(), "a.internal:9100");
  assert_eq!(fetched.skipped, 0);

  clear_shard(client.inner(), shard).await;
  clear_shard(client.inner(), "it-other").await;
}

#[tokio::test]
#[ignore]
async fn test_filter_values_are_bound_not_interpolated() {
  let shard = "it-bind";
  let cfg = load_test_config(shard);
  let client = connect(&cfg).await;
  clear_shard(client.inner(), shard).await;
  insert_endpoint(client.inner(), shard, "node", Some("a.internal"), Some("9100"), None, None).await;

  // Would match every row if spliced into the statement text.
  let mut hostile = cfg.clone();
  hostile.filter.shard_id = "x' OR '1'='1".to_string();

  let fetched = PgQueryExecutor::from_discovery_config(&hostile)
    .fetch_endpoints(&CancellationToken::new())
    .await
    .unwrap();
  assert!(fetched.records.is_empty());

  clear_shard(client.inner(), shard).await;
}

#[tokio::test]
#[ignore]
async fn test_undecodable_rows_are_skipped() {
  let shard = "it-skip";
  let cfg = load_test_config(shard);
  let client = connect(&cfg).await;
  clear_shard(client.inner(), shard).await;

  insert_endpoint(client.inner(), shard, "node", None, Some("9100"), None, None).await;
  insert_endpoint(client.inner(), shard, "node", Some("bad host"), Some("9100"), None, None).await;
  insert_endpoint(client.inner(), shard, "node", Some("ok.internal"), Some("9100"), None, None).await;

  let fetched = PgQueryExecutor::from_discovery_config(&cfg)
    .fetch_endpoints(&CancellationToken::new())
    .await
    .unwrap();
  assert_eq!(fetched.records.len(), 1);
  assert_eq!(fetched.skipped, 2);

  clear_shard(client.inner(), shard).await;
}

#[tokio::test]
#[ignore]
async fn test_refresh_cycle_against_store() {
  let shard = "it-cycle";
  let cfg = load_test_config(shard);
  let client = connect(&cfg).await;
  clear_shard(client.inner(), shard).await;

  insert_endpoint(
    client.inner(),
    shard,
    "node",
    Some("db-1.internal"),
    Some("9187"),
    Some("/probe"),
    Some("env=prod,bad,team=dba"),
  )
  .await;

  let refresher = Refresher::new(
    Arc::new(PgQueryExecutor::from_discovery_config(&cfg)),
    LabelBuilder::new("/metrics"),
    "database",
    DiscoveryMetrics::new("database").unwrap(),
  );
  let report = refresher.refresh(&CancellationToken::new()).await;

  assert!(report.is_ok());
  assert_eq!(report.rejected_labels, 1);
  let target = &report.group.targets[0];
  assert_eq!(target.get(ADDRESS_LABEL), Some("db-1.internal:9187"));
  assert_eq!(target.get(METRICS_PATH_LABEL), Some("/probe"));
  assert_eq!(target.get("env"), Some("prod"));
  assert_eq!(target.get("team"), Some("dba"));

  clear_shard(client.inner(), shard).await;
}

#[tokio::test]
#[ignore]
async fn test_consul_configs_query() {
  let shard = "it-consul";
  let cfg = load_test_config(shard);
  let client = connect(&cfg).await;
  clear_shard(client.inner(), shard).await;

  client
    .inner()
    .execute(
      "INSERT INTO public.metrics (shardid, type, server, services, tags, datacenter, token) \
       VALUES ($1, 'node', 'consul.internal:8500', ARRAY['api', NULL, 'web'], ARRAY['prod'], 'dc1', 's3cret')",
      &[&shard],
    )
    .await
    .unwrap();

  let fetched = PgQueryExecutor::from_discovery_config(&cfg)
    .fetch_consul_configs(&CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(fetched.records.len(), 1);
  let record = &fetched.records[0];
  assert_eq!(record.server, "consul.internal:8500");
  assert_eq!(record.services, vec!["api".to_string(), "web".to_string()]);
  assert_eq!(record.datacenter, "dc1");
  assert!(!format!("{record:?}").contains("s3cret"));

  clear_shard(client.inner(), shard).await;
}

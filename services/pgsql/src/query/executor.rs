use super::decode::{decode_consul, decode_endpoint};
use super::statements::{CONSUL_CONFIGS_BY_SHARD_AND_CLASS, ENDPOINTS_BY_SHARD_AND_CLASS};
use crate::connector::{ConnectorConfig, PgClient};
use async_trait::async_trait;
use shared::config::{DiscoveryConfig, FilterConfig};
use shared::error::{DiscoveryError, Result};
use shared::source::{EndpointSource, Fetched, FetchedEndpoints};
use shared::target::ConsulServiceRecord;
use tokio_postgres::Row;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shard / class pair bound as `$1` / `$2` of every filter query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
  pub shard_id: String,
  pub class: String,
}

impl QueryFilter {
  pub fn new(shard_id: impl Into<String>, class: impl Into<String>) -> Self {
    Self {
      shard_id: shard_id.into(),
      class: class.into(),
    }
  }

  pub fn from_config(cfg: &FilterConfig) -> Self {
    Self::new(cfg.shard_id.clone(), cfg.class.clone())
  }
}

/// Runs the shard/class filtered queries against PostgreSQL.
///
/// Every call opens its own connection, verifies it, runs one query and
/// releases the connection before returning. Nothing is shared between
/// calls, so concurrent callers never see each other's connection.
pub struct PgQueryExecutor {
  config: ConnectorConfig,
  filter: QueryFilter,
}

impl PgQueryExecutor {
  pub fn new(config: ConnectorConfig, filter: QueryFilter) -> Self {
    Self { config, filter }
  }

  /// Build from the shared DiscoveryConfig.
  pub fn from_discovery_config(cfg: &DiscoveryConfig) -> Self {
    Self::new(
      ConnectorConfig::from_discovery_config(cfg),
      QueryFilter::from_config(&cfg.filter),
    )
  }

  pub fn filter(&self) -> &QueryFilter {
    &self.filter
  }

  /// Run the Consul-shaped query and decode its rows.
  pub async fn fetch_consul_configs(
    &self,
    cancel: &CancellationToken,
  ) -> Result<Fetched<ConsulServiceRecord>> {
    self
      .fetch(CONSUL_CONFIGS_BY_SHARD_AND_CLASS, cancel, decode_consul)
      .await
  }

  async fn fetch<T>(
    &self,
    statement: &str,
    cancel: &CancellationToken,
    decode: fn(usize, &Row) -> Result<T>,
  ) -> Result<Fetched<T>> {
    // Dropping the query future on cancellation drops the client with it.
    let rows = tokio::select! {
      biased;
      _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
      rows = self.query_filtered(statement) => rows?,
    };

    let fetched = decode_rows(&rows, decode);

    info!(
        shard = %self.filter.shard_id,
        class = %self.filter.class,
        rows = rows.len(),
        skipped = fetched.skipped,
        "filter query complete"
    );

    Ok(fetched)
  }

  async fn query_filtered(&self, statement: &str) -> Result<Vec<Row>> {
    debug!(store = %self.config.display_name(), "querying backing store");

    let client = PgClient::connect(&self.config).await?;
    client.ping().await?;

    client
      .inner()
      .query(statement, &[&self.filter.shard_id, &self.filter.class])
      .await
      .map_err(|e| DiscoveryError::QueryFailed(Box::new(e)))
  }
}

/// Decode `rows` in order, skipping and counting the ones `decode` rejects.
fn decode_rows<R, T>(rows: &[R], decode: fn(usize, &R) -> Result<T>) -> Fetched<T> {
  let mut records = Vec::with_capacity(rows.len());
  let mut skipped = 0;
  for (index, row) in rows.iter().enumerate() {
    match decode(index, row) {
      Ok(record) => records.push(record),
      Err(e) => {
        skipped += 1;
        warn!(row = index, error = %e, "skipping undecodable row");
      }
    }
  }
  Fetched::new(records, skipped)
}

#[async_trait]
impl EndpointSource for PgQueryExecutor {
  async fn fetch_endpoints(&self, cancel: &CancellationToken) -> Result<FetchedEndpoints> {
    self
      .fetch(ENDPOINTS_BY_SHARD_AND_CLASS, cancel, decode_endpoint)
      .await
  }

  fn describe(&self) -> String {
    format!(
      "{} shard={} class={}",
      self.config.display_name(),
      self.filter.shard_id,
      self.filter.class
    )
  }
}

#![cfg(test)]
use dbsd_pgsql::{ConnectorConfig, PgClient};
use shared::config::{
  DatabaseDriver, DiscoveryConfig, FilterConfig, ObservabilityConfig, OutputConfig, RefreshConfig,
  SourceConfig, SslMode,
};

/// Build a test configuration from `env/.env` and the environment.
pub fn load_test_config(shard_id: &str) -> DiscoveryConfig {
  dotenvy::from_path("../../env/.env").ok();

  let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());

  let source = SourceConfig {
    driver: DatabaseDriver::Postgres,
    host: var("DBSD_SOURCE__HOST", "localhost"),
    port: var("DBSD_SOURCE__PORT", "5432").parse().unwrap(),
    database: var("DBSD_SOURCE__DATABASE", "postgres"),
    user: var("DBSD_SOURCE__USER", "postgres"),
    password: var("DBSD_SOURCE__PASSWORD", "postgres"),
    ssl_mode: SslMode::Disable,
    connect_timeout_secs: 5,
    application_name: "dbsd_integration_test".to_string(),
  };

  DiscoveryConfig {
    source,
    filter: FilterConfig {
      shard_id: shard_id.to_string(),
      class: "node".to_string(),
    },
    discovery: RefreshConfig::default(),
    output: OutputConfig::default(),
    observability: ObservabilityConfig::default(),
  }
}

/// Connect with the test configuration and make sure both tables exist.
pub async fn connect(cfg: &DiscoveryConfig) -> PgClient {
  let client = PgClient::connect(&ConnectorConfig::from_discovery_config(cfg))
    .await
    .unwrap();
  apply_fixtures(client.inner()).await;
  client
}

pub async fn apply_fixtures(client: &tokio_postgres::Client) {
  client
    .batch_execute(
      r#"
      CREATE TABLE IF NOT EXISTS public.prometheus (
        shardid TEXT NOT NULL,
        type    TEXT NOT NULL,
        host    TEXT,
        port    TEXT,
        path    TEXT,
        labels  TEXT
      );
      CREATE TABLE IF NOT EXISTS public.metrics (
        shardid    TEXT NOT NULL,
        type       TEXT NOT NULL,
        server     TEXT,
        services   TEXT[],
        tags       TEXT[],
        datacenter TEXT,
        token      TEXT
      );
      "#,
    )
    .await
    .unwrap();
}

/// Remove every row of `shard_id` from both tables. Each test owns its own
/// shard, so tests can run in parallel against one database.
pub async fn clear_shard(client: &tokio_postgres::Client, shard_id: &str) {
  client
    .execute("DELETE FROM public.prometheus WHERE shardid = $1", &[&shard_id])
    .await
    .unwrap();
  client
    .execute("DELETE FROM public.metrics WHERE shardid = $1", &[&shard_id])
    .await
    .unwrap();
}

pub async fn insert_endpoint(
  client: &tokio_postgres::Client,
  shard_id: &str,
  class: &str,
  host: Option<&str>,
  port: Option<&str>,
  path: Option<&str>,
  labels: Option<&str>,
) {
  client
    .execute(
      "INSERT INTO public.prometheus (shardid, type, host, port, path, labels) \
       VALUES ($1, $2, $3, $4, $5, $6)",
      &[&shard_id, &class, &host, &port, &path, &labels],
    )
    .await
    .unwrap();
}

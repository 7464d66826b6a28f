use shared::config::{DatabaseDriver, DiscoveryConfig, SslMode};
use std::time::Duration;

/// Connection configuration for the backing PostgreSQL store.
///
/// Built once from the loaded [`DiscoveryConfig`] and never mutated. The
/// password is handed to the driver directly and never rendered into a
/// connection string.
#[derive(Clone)]
pub struct ConnectorConfig {
  pub driver: DatabaseDriver,
  pub host: String,
  pub port: u16,
  pub dbname: String,
  pub user: String,
  pub password: String,
  pub ssl_mode: SslMode,
  pub connect_timeout: Duration,
  /// Application name visible in `pg_stat_activity`.
  pub application_name: String,
}

impl ConnectorConfig {
  /// Build from the shared DiscoveryConfig.
  pub fn from_discovery_config(cfg: &DiscoveryConfig) -> Self {
    Self {
      driver: cfg.source.driver,
      host: cfg.source.host.clone(),
      port: cfg.source.port,
      dbname: cfg.source.database.clone(),
      user: cfg.source.user.clone(),
      password: cfg.source.password.clone(),
      ssl_mode: cfg.source.ssl_mode,
      connect_timeout: Duration::from_secs(cfg.source.connect_timeout_secs),
      application_name: cfg.source.application_name.clone(),
    }
  }

  /// Translate into the driver's configuration.
  pub fn to_pg_config(&self) -> tokio_postgres::Config {
    let mut pg = tokio_postgres::Config::new();
    pg.host(&self.host)
      .port(self.port)
      .dbname(&self.dbname)
      .user(&self.user)
      .ssl_mode(pg_ssl_mode(self.ssl_mode))
      .connect_timeout(self.connect_timeout)
      .application_name(&self.application_name);
    if !self.password.is_empty() {
      pg.password(&self.password);
    }
    pg
  }

  /// `driver: user@host:port/dbname`, safe to log.
  pub fn display_name(&self) -> String {
    format!(
      "{}: {}@{}:{}/{}",
      self.driver.as_str(),
      self.user,
      self.host,
      self.port,
      self.dbname
    )
  }
}

impl std::fmt::Debug for ConnectorConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ConnectorConfig")
      .field("driver", &self.driver)
      .field("host", &self.host)
      .field("port", &self.port)
      .field("dbname", &self.dbname)
      .field("user", &self.user)
      .field("password", &"***REDACTED***")
      .field("ssl_mode", &self.ssl_mode)
      .field("connect_timeout", &self.connect_timeout)
      .field("application_name", &self.application_name)
      .finish()
  }
}

fn pg_ssl_mode(mode: SslMode) -> tokio_postgres::config::SslMode {
  match mode {
    SslMode::Disable => tokio_postgres::config::SslMode::Disable,
    SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
    SslMode::Require => tokio_postgres::config::SslMode::Require,
  }
}

use crate::error::{DiscoveryError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Shortest refresh interval accepted by [`DiscoveryConfig::validate`].
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Root configuration for the dbsd daemon.
///
/// Loaded from TOML files via the `config` crate with environment-variable
/// overrides (prefix: `DBSD_`). Immutable once loaded; components receive it
/// behind an `Arc` or copy the parts they need.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Backing store connection settings.
    pub source: SourceConfig,
    /// Shard / class filter applied to every query.
    pub filter: FilterConfig,
    /// Refresh cycle settings.
    #[serde(default)]
    pub discovery: RefreshConfig,
    /// Where delivered groups are written.
    #[serde(default)]
    pub output: OutputConfig,
    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Database driver kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    #[serde(alias = "postgresql")]
    Postgres,
}

impl DatabaseDriver {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseDriver::Postgres => "postgres",
        }
    }
}

/// TLS mode for the store connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// Plain TCP.
    #[default]
    Disable,
    /// Try TLS, fall back to plain TCP.
    Prefer,
    /// Fail unless TLS can be negotiated.
    Require,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }
}

/// Backing store connection configuration.
#[derive(Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub driver: DatabaseDriver,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database name.
    pub database: String,
    pub user: String,
    /// Password. Never logged; see the `Debug` impl.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ssl_mode: SslMode,
    /// TCP connect timeout, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Application name shown in `pg_stat_activity`.
    #[serde(default = "default_app_name")]
    pub application_name: String,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***REDACTED***")
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("application_name", &self.application_name)
            .finish()
    }
}

/// Partition filter. Both values are bound as query parameters verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Shard identifier (`shardid` column).
    pub shard_id: String,
    /// Class / type tag (`type` column).
    pub class: String,
}

/// Refresh cycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// `source` name of every produced target group.
    #[serde(default = "default_source_name")]
    pub source_name: String,
    /// Interval between refresh cycles, in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Upper bound for one cycle, in seconds. Defaults to the interval.
    #[serde(default)]
    pub cycle_timeout_secs: Option<u64>,
    /// Metrics path used when a row leaves `path` empty.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            source_name: default_source_name(),
            refresh_interval_secs: default_refresh_interval(),
            cycle_timeout_secs: None,
            metrics_path: default_metrics_path(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Prometheus `file_sd` JSON file rewritten after every cycle.
    pub file_sd_path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level filter (e.g. `info`, `debug`, `trace`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Listen address for `/metrics` and `/healthz`. An empty string
    /// disables the listener.
    #[serde(default = "default_http_addr")]
    pub http_addr: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            http_addr: default_http_addr(),
        }
    }
}

impl ObservabilityConfig {
    /// The HTTP listen address, if the listener is enabled.
    pub fn http_addr(&self) -> Option<&str> {
        self.http_addr.as_deref().filter(|addr| !addr.trim().is_empty())
    }
}

impl DiscoveryConfig {
    /// Check the values serde cannot: required strings, interval floor,
    /// path shape.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("source.host", &self.source.host),
            ("source.database", &self.source.database),
            ("source.user", &self.source.user),
            ("filter.shard_id", &self.filter.shard_id),
            ("filter.class", &self.filter.class),
            ("discovery.source_name", &self.discovery.source_name),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(DiscoveryError::config_invalid(key, "must not be empty"));
            }
        }

        if self.source.port == 0 {
            return Err(DiscoveryError::config_invalid(
                "source.port",
                "must not be 0",
            ));
        }

        if self.source.connect_timeout_secs == 0 {
            return Err(DiscoveryError::config_invalid(
                "source.connect_timeout_secs",
                "must be greater than 0",
            ));
        }

        if self.refresh_interval() < MIN_REFRESH_INTERVAL {
            return Err(DiscoveryError::config_invalid(
                "discovery.refresh_interval_secs",
                format!("must be at least {}s", MIN_REFRESH_INTERVAL.as_secs()),
            ));
        }

        if self.discovery.cycle_timeout_secs == Some(0) {
            return Err(DiscoveryError::config_invalid(
                "discovery.cycle_timeout_secs",
                "must be greater than 0",
            ));
        }

        if !self.discovery.metrics_path.starts_with('/') {
            return Err(DiscoveryError::config_invalid(
                "discovery.metrics_path",
                "must start with '/'",
            ));
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.discovery.refresh_interval_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        self.discovery
            .cycle_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.refresh_interval())
    }
}

// ── Default value functions ─────────────────────────────────────────

fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_app_name() -> String {
    "dbsd".to_string()
}
fn default_source_name() -> String {
    crate::target::DEFAULT_SOURCE.to_string()
}
fn default_refresh_interval() -> u64 {
    10
}
fn default_metrics_path() -> String {
    "/metrics".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_http_addr() -> Option<String> {
    Some("0.0.0.0:9464".to_string())
}

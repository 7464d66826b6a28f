pub mod loader;

pub use loader::{
    DatabaseDriver, DiscoveryConfig, FilterConfig, ObservabilityConfig, OutputConfig,
    RefreshConfig, SourceConfig, SslMode, MIN_REFRESH_INTERVAL,
};

use crate::error::{DiscoveryError, Result};
use std::path::Path;

/// Load configuration from a TOML file with environment-variable overrides.
///
/// Resolution order:
/// 1. `config/default.toml`: base configuration
/// 2. `config/{env}.toml`: environment overlay (development, testing, production)
/// 3. Environment variables with prefix `DBSD_` (double underscore for nesting)
///
/// The merged result is validated before it is returned.
///
/// # Example
///
/// `DBSD_SOURCE__PASSWORD=...` overrides `source.password`.
pub fn load_config(config_dir: &Path, env: &str) -> Result<DiscoveryConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(config_dir.join("default.toml")).required(true))
        .add_source(config::File::from(config_dir.join(format!("{}.toml", env))).required(false))
        .add_source(
            config::Environment::with_prefix("DBSD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| DiscoveryError::ConfigLoadFailed(Box::new(e)))?;

    let cfg: DiscoveryConfig = settings
        .try_deserialize()
        .map_err(|e| DiscoveryError::ConfigLoadFailed(Box::new(e)))?;
    cfg.validate()?;
    Ok(cfg)
}

use super::config::ConnectorConfig;
use shared::error::{DiscoveryError, Result};
use tokio::task::JoinHandle;
use tokio_postgres::Client;
use tracing::{debug, warn};

/// One exclusively-owned connection to the backing store.
///
/// The client is opened per refresh cycle and released when the value is
/// dropped, on every exit path: dropping closes the client and aborts the
/// task driving the socket, so an early `?` or a cancelled future cannot
/// leak the connection.
pub struct PgClient {
  client: Client,
  driver: JoinHandle<()>,
}

impl PgClient {
  /// Connect to the store described by `config`.
  pub async fn connect(config: &ConnectorConfig) -> Result<Self> {
    let tls = super::tls::make_tls_connector()?;
    let (client, connection) = config
      .to_pg_config()
      .connect(tls)
      .await
      .map_err(|e| DiscoveryError::ConnectFailed(Box::new(e)))?;

    let host = config.host.clone();
    let driver = tokio::spawn(async move {
      if let Err(e) = connection.await {
        warn!(host = %host, error = %e, "store connection terminated with error");
      }
    });

    debug!(
        store = %config.display_name(),
        ssl_mode = config.ssl_mode.as_str(),
        "connected to backing store"
    );

    Ok(Self { client, driver })
  }

  /// Returns a reference to the underlying tokio-postgres client.
  pub fn inner(&self) -> &Client {
    &self.client
  }

  /// Verify the connection answers before running real queries.
  pub async fn ping(&self) -> Result<()> {
    self
      .client
      .simple_query("SELECT 1")
      .await
      .map_err(|e| DiscoveryError::ConnectFailed(Box::new(e)))?;
    Ok(())
  }
}

impl Drop for PgClient {
  fn drop(&mut self) {
    self.driver.abort();
  }
}

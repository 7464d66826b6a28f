use rustls::{ClientConfig, RootCertStore};
use shared::error::{DiscoveryError, Result};
use std::sync::Arc;
use tokio_postgres_rustls::MakeRustlsConnect;

/// Build the TLS connector used for every store connection.
///
/// The driver only negotiates TLS when the configured `ssl_mode` asks for
/// it, so the same connector serves `disable`, `prefer` and `require`.
/// Server certificates are verified against the webpki root set.
pub fn make_tls_connector() -> Result<MakeRustlsConnect> {
  let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

  let provider = Arc::new(rustls::crypto::ring::default_provider());
  let config = ClientConfig::builder_with_provider(provider)
    .with_safe_default_protocol_versions()
    .map_err(|e| DiscoveryError::Tls(e.to_string()))?
    .with_root_certificates(roots)
    .with_no_client_auth();

  Ok(MakeRustlsConnect::new(config))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn connector_builds_with_default_roots() {
    assert!(make_tls_connector().is_ok());
  }
}

use crate::error::{DiscoveryError, Result};
use std::net::Ipv6Addr;

/// One endpoint row read from the metrics-target table.
///
/// Construction goes through [`EndpointRecord::new`], which rejects host/port
/// pairs that cannot form a `host:port` address. Holding a record therefore
/// means holding a usable address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointRecord {
    host: String,
    port: String,
    path: String,
    labels: String,
}

impl EndpointRecord {
    /// Validate and build a record. Host and port are trimmed first.
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        path: impl Into<String>,
        labels: impl Into<String>,
    ) -> std::result::Result<Self, String> {
        let host = host.into().trim().to_string();
        let port = port.into().trim().to_string();
        validate_host(&host)?;
        validate_port(&port)?;

        Ok(Self {
            host,
            port,
            path: path.into().trim().to_string(),
            labels: labels.into(),
        })
    }

    /// Build a record from nullable column values of row `row`.
    ///
    /// `path` and `labels` are optional; a NULL in either is treated as an
    /// empty string. A NULL host or port rejects the row.
    pub fn from_columns(
        row: usize,
        host: Option<String>,
        port: Option<String>,
        path: Option<String>,
        labels: Option<String>,
    ) -> Result<Self> {
        let host = host.ok_or_else(|| DiscoveryError::row_decode(row, "host is NULL"))?;
        let port = port.ok_or_else(|| DiscoveryError::row_decode(row, "port is NULL"))?;

        Self::new(
            host,
            port,
            path.unwrap_or_default(),
            labels.unwrap_or_default(),
        )
        .map_err(|reason| DiscoveryError::row_decode(row, reason))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Metrics path column; empty means "use the configured default".
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw comma-separated `key=value` custom label list.
    pub fn labels(&self) -> &str {
        &self.labels
    }

    /// The scrape address, exactly `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn validate_host(host: &str) -> std::result::Result<(), String> {
    if host.is_empty() {
        return Err("host is empty".to_string());
    }
    if host.chars().any(|c| c.is_whitespace() || c == '/' || c == ',') {
        return Err(format!("host '{host}' contains an invalid character"));
    }

    // IPv6 literals must be bracketed so that `host:port` stays unambiguous.
    if let Some(inner) = host.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| format!("host '{host}' has an unterminated IPv6 bracket"))?;
        inner
            .parse::<Ipv6Addr>()
            .map_err(|_| format!("host '{host}' is not a valid IPv6 literal"))?;
        return Ok(());
    }
    if host.contains(':') {
        return Err(format!(
            "host '{host}' contains ':' (IPv6 literals must be bracketed)"
        ));
    }

    Ok(())
}

fn validate_port(port: &str) -> std::result::Result<(), String> {
    if port.is_empty() {
        return Err("port is empty".to_string());
    }
    if port
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, ':' | '/' | ','))
    {
        return Err(format!("port '{port}' contains an invalid character"));
    }
    Ok(())
}

/// One row of the alternate, Consul-shaped query.
#[derive(Clone, PartialEq, Eq)]
pub struct ConsulServiceRecord {
    /// Consul agent address.
    pub server: String,
    pub services: Vec<String>,
    pub tags: Vec<String>,
    pub datacenter: String,
    /// ACL token. Kept out of `Debug` output.
    pub token: String,
}

impl ConsulServiceRecord {
    /// Build a record from nullable column values. Only `server` is required.
    pub fn from_columns(
        row: usize,
        server: Option<String>,
        services: Option<Vec<String>>,
        tags: Option<Vec<String>>,
        datacenter: Option<String>,
        token: Option<String>,
    ) -> Result<Self> {
        let server = server
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DiscoveryError::row_decode(row, "server is NULL or empty"))?;

        Ok(Self {
            server,
            services: services.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
            datacenter: datacenter.unwrap_or_default(),
            token: token.unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for ConsulServiceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsulServiceRecord")
            .field("server", &self.server)
            .field("services", &self.services)
            .field("tags", &self.tags)
            .field("datacenter", &self.datacenter)
            .field("token", &"***")
            .finish()
    }
}

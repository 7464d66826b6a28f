use thiserror::Error;

/// Top-level error type for the discovery adapter.
///
/// Variants follow the subsystem boundaries of a refresh cycle. Store and
/// driver errors are attached as `#[source]` so that `anyhow` chains keep
/// the full cause.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    // ── Connector ──────────────────────────────────────────────
    #[error("connector: failed to connect to the backing store")]
    ConnectFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("connector: TLS setup failed: {0}")]
    Tls(String),

    // ── Query ──────────────────────────────────────────────────
    #[error("query: filter query failed")]
    QueryFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("query: row {row} rejected: {reason}")]
    RowDecode { row: usize, reason: String },

    #[error("query: cycle cancelled before the store answered")]
    Cancelled,

    // ── Labels ─────────────────────────────────────────────────
    #[error("labels: malformed custom label '{pair}': {reason}")]
    LabelParse { pair: String, reason: String },

    // ── Config ─────────────────────────────────────────────────
    #[error("config: failed to load configuration")]
    ConfigLoadFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("config: invalid value for '{key}': {reason}")]
    ConfigInvalid { key: String, reason: String },

    // ── Generic ────────────────────────────────────────────────
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DiscoveryError {
    pub fn row_decode(row: usize, reason: impl Into<String>) -> Self {
        Self::RowDecode {
            row,
            reason: reason.into(),
        }
    }

    pub fn label_parse(pair: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LabelParse {
            pair: pair.into(),
            reason: reason.into(),
        }
    }

    pub fn config_invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Short, stable tag used as the `error` metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectFailed(_) => "connection",
            Self::Tls(_) => "tls",
            Self::QueryFailed(_) => "query",
            Self::RowDecode { .. } => "row_decode",
            Self::Cancelled => "cancelled",
            Self::LabelParse { .. } => "label_parse",
            Self::ConfigLoadFailed(_) | Self::ConfigInvalid { .. } => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// This error followed by every `source()` cause, joined with `": "`.
    /// Variant messages omit the driver detail, which lives in the source.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            rendered.push_str(": ");
            rendered.push_str(&err.to_string());
            cause = err.source();
        }
        rendered
    }

    /// Whether the error only costs one row or one label pair, leaving the
    /// rest of the cycle intact.
    pub fn is_recoverable_locally(&self) -> bool {
        matches!(self, Self::RowDecode { .. } | Self::LabelParse { .. })
    }
}

use crate::error::Result;
use crate::target::EndpointRecord;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Rows decoded by one query, plus how many were dropped on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    /// Decoded records in row-return order.
    pub records: Vec<T>,
    /// Rows that could not be decoded and were skipped.
    pub skipped: usize,
}

impl<T> Fetched<T> {
    pub fn new(records: Vec<T>, skipped: usize) -> Self {
        Self { records, skipped }
    }
}

impl<T> Default for Fetched<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 0)
    }
}

pub type FetchedEndpoints = Fetched<EndpointRecord>;

/// Something that can be asked for the current endpoint rows.
///
/// The refresher only talks to this trait; the PostgreSQL executor is one
/// implementation, tests provide scripted ones.
#[async_trait]
pub trait EndpointSource: Send + Sync {
    /// Fetch every endpoint matching this source's filter.
    ///
    /// Implementations must release any connection they opened before
    /// returning, and return `DiscoveryError::Cancelled` promptly once
    /// `cancel` fires.
    async fn fetch_endpoints(&self, cancel: &CancellationToken) -> Result<FetchedEndpoints>;

    /// Human-readable description for logs (no secrets).
    fn describe(&self) -> String;
}

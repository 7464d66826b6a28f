pub mod client;
pub mod config;
pub mod tls;

pub use client::PgClient;
pub use config::ConnectorConfig;

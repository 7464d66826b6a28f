//! PostgreSQL backing store for dbsd: scoped connections and the
//! shard/class filtered endpoint queries.

pub mod connector;
pub mod query;

pub use connector::{ConnectorConfig, PgClient};
pub use query::{PgQueryExecutor, QueryFilter};

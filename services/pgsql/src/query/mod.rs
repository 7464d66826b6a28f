pub mod decode;
pub mod executor;
pub mod statements;

pub use executor::{PgQueryExecutor, QueryFilter};

pub mod types;

pub use types::DiscoveryError;

/// Shorthand Result type used throughout dbsd.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

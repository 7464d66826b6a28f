pub mod endpoint;

pub use endpoint::HealthEndpoint;

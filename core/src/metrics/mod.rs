pub mod registry;

pub use registry::DiscoveryMetrics;

pub mod daemon;
pub mod discovery;
pub mod metrics;

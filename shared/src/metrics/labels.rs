// Prometheus metric label names.

/// Label for the discovery source name (the target group `source`).
pub const LABEL_SOURCE: &str = "source";

/// Label for the error category, see `DiscoveryError::kind`.
pub const LABEL_ERROR: &str = "error";

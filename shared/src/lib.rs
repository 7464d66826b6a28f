//! Types shared by every dbsd crate: configuration, errors, the target
//! model, and the endpoint source seam.

pub mod config;
pub mod error;
pub mod metrics;
pub mod source;
pub mod target;

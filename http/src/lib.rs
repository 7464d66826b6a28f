//! Outward surfaces of the daemon: the `/metrics` + `/healthz` listener and
//! the `file_sd` writer.

pub mod egress;
pub mod health;
pub mod server;

pub use egress::FileSdWriter;
pub use health::HealthEndpoint;
pub use server::{router, serve, HttpState};

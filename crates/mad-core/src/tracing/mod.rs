//! Logging for mad: `tracing` events filtered per crate through `MAD_LOG`.

pub mod metrics;
pub mod setup;

pub use setup::{init_tracing, LOG_ENV};

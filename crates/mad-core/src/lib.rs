//! # mad-core
//!
//! Shared foundation for the mad file catalog: error enums, layered
//! configuration, the keyword schema, tracing setup, document types and
//! the `DocumentStore` trait every storage backend implements.

pub mod config;
pub mod errors;
pub mod keywords;
pub mod tracing;
pub mod traits;
pub mod types;

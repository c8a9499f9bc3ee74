//! # mad-engine
//!
//! The file identity engine, the directory scanner with its batched
//! writer, and the provenance relation engine.

pub mod batch;
pub mod context;
pub mod counters;
pub mod hasher;
pub mod identity;
pub mod paths;
pub mod relation;
pub mod scanner;
pub mod stat;

pub use batch::BatchSession;
pub use context::Context;
pub use identity::{LoadHook, TrackedFile};
pub use relation::Relation;
pub use scanner::Scanner;

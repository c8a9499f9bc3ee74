//! Query modules for each collection.

pub mod documents;
pub mod identity;
pub mod relations;

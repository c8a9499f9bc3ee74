//! Trait seams between the engines and their collaborators.

pub mod document_store;

pub use document_store::DocumentStore;

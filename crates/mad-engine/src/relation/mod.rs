//! Provenance relations: a script bound to the content hashes of the files
//! it read and wrote, and the "already done?" decision over them.

pub mod io_spec;
pub mod provenance;
pub mod signals;
pub mod types;

pub use io_spec::IoSpec;
pub use provenance::Relation;
pub use signals::{CheckOutcome, Observation, Signal};
pub use types::{IoCategory, IoEntry, RelationRecord, RelationState, EXECUTABLE_GROUP};

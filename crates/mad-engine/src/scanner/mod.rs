//! Directory scanner: diff the live tree against the catalog and drive the
//! identity engine over what changed.

pub mod ignores;
pub mod incremental;
pub mod scan;
pub mod types;
pub mod walker;

pub use ignores::IgnorePatterns;
pub use scan::Scanner;
pub use types::{ScanOptions, ScanReport, ScanStats};

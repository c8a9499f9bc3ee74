//! Error handling for mad.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod identity_error;
pub mod keyword_error;
pub mod mad_error;
pub mod relation_error;
pub mod scan_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::MadErrorCode;
pub use identity_error::IdentityError;
pub use keyword_error::KeywordError;
pub use mad_error::MadError;
pub use relation_error::RelationError;
pub use scan_error::ScanError;
pub use storage_error::StorageError;

//! Top-level error aggregating every subsystem.

use super::error_code::MadErrorCode;
use super::{
    ConfigError, IdentityError, KeywordError, RelationError, ScanError, StorageError,
};

/// What a top-level caller receives; it reports `tagged_string()` and
/// exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum MadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Keyword error: {0}")]
    Keyword(#[from] KeywordError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Relation error: {0}")]
    Relation(#[from] RelationError),
}

impl MadErrorCode for MadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Keyword(e) => e.error_code(),
            Self::Identity(e) => e.error_code(),
            Self::Scan(e) => e.error_code(),
            Self::Relation(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn tagged_string_carries_subsystem_code() {
        let err: MadError = RelationError::InputChanged {
            path: PathBuf::from("/data/a.txt"),
            declared: "aa".into(),
            current: "bb".into(),
        }
        .into();
        assert!(err.tagged_string().starts_with("[INPUT_CHANGED]"));
    }

    #[test]
    fn io_kinds_map_to_identity_variants() {
        let nf = IdentityError::from_io(
            PathBuf::from("/x"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(nf, IdentityError::NotFound { .. }));
        assert!(nf.is_skippable());

        let pd = IdentityError::from_io(
            PathBuf::from("/x"),
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert_eq!(pd.error_code(), "PERMISSION_DENIED");
    }

    #[test]
    fn batch_write_failure_is_store_write_error() {
        let err = StorageError::WriteFailed {
            collection: "identity".into(),
            message: "constraint".into(),
        };
        assert_eq!(err.error_code(), "STORE_WRITE_ERROR");
    }
}

//! Keyword schema errors.

use super::error_code::{self, MadErrorCode};

/// Errors raised while resolving or applying a metadata keyword.
#[derive(Debug, thiserror::Error)]
pub enum KeywordError {
    #[error("Bad key: {key}")]
    BadKey { key: String },

    #[error("Alias cycle while resolving {key}")]
    AliasCycle { key: String },

    #[error("Invalid value {value:?} for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl MadErrorCode for KeywordError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => error_code::INVALID_VALUE,
            _ => error_code::BAD_KEY,
        }
    }
}

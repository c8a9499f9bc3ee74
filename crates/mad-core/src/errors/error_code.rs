//! MadErrorCode trait for reporting at the top-level caller.

/// Trait for converting mad errors to stable error codes.
/// Every error enum implements this so the caller can report a
/// structured code before exiting non-zero.
pub trait MadErrorCode {
    /// Returns the error code string (e.g., "NOT_FOUND").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted report string: `[ERROR_CODE] message`.
    fn tagged_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const NOT_FOUND: &str = "NOT_FOUND";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const HASHING_IO_ERROR: &str = "HASHING_IO_ERROR";
pub const STAT_ERROR: &str = "STAT_ERROR";
pub const INPUT_CHANGED: &str = "INPUT_CHANGED";
pub const BAD_KEY: &str = "BAD_KEY";
pub const INVALID_VALUE: &str = "INVALID_VALUE";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const STORE_WRITE_ERROR: &str = "STORE_WRITE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const RELATION_ERROR: &str = "RELATION_ERROR";
pub const HOOK_ERROR: &str = "HOOK_ERROR";

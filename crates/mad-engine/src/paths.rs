//! Path normalization shared by the engines.

use std::io;
use std::path::{Path, PathBuf};

/// Expand a leading `~` to the home directory.
pub fn expand_user(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match mad_core::config::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Expand `~` and make the path absolute against the current directory.
/// Symlinks are not resolved.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(expand_user(path))
}

/// The string form stored in documents.
pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

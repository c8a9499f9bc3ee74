//! Gitignore-style exclusion for scans.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use mad_core::errors::ScanError;

/// Per-root ignore file, read alongside the global one.
pub const ROOT_IGNORE_FILE: &str = ".madignore";

/// Compiled ignore patterns for one scan root.
pub struct IgnorePatterns {
    gitignore: Gitignore,
}

impl IgnorePatterns {
    /// Combine `extra` patterns, the global ignore file and the root's own
    /// `.madignore`. A missing file is skipped; an unreadable one is logged.
    pub fn new(root: &Path, extra: &[String], global_file: Option<&Path>) -> Result<Self, ScanError> {
        let mut builder = GitignoreBuilder::new(root);

        for pattern in extra {
            builder
                .add_line(None, pattern)
                .map_err(|e| ScanError::IgnorePattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
        }

        let root_file = root.join(ROOT_IGNORE_FILE);
        for file in global_file.into_iter().chain([root_file.as_path()]) {
            if !file.is_file() {
                continue;
            }
            if let Some(err) = builder.add(file) {
                tracing::warn!(file = %file.display(), error = %err, "ignore file partially read");
            }
        }

        let gitignore = builder.build().map_err(|e| ScanError::IgnorePattern {
            pattern: "<combined>".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { gitignore })
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.gitignore.matched(path, is_dir).is_ignore()
    }

    pub fn len(&self) -> usize {
        self.gitignore.num_ignores() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

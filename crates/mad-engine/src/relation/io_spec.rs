//! `group::filename` IO specifications.

use std::path::PathBuf;

/// A parsed IO argument. Without a `group::` prefix the group defaults to
/// the IO category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoSpec {
    pub group: Option<String>,
    pub filename: PathBuf,
}

impl IoSpec {
    pub fn parse(spec: &str) -> Self {
        match spec.split_once("::") {
            Some((group, filename)) if !group.is_empty() => Self {
                group: Some(group.to_string()),
                filename: PathBuf::from(filename),
            },
            Some((_, filename)) => Self {
                group: None,
                filename: PathBuf::from(filename),
            },
            None => Self {
                group: None,
                filename: PathBuf::from(spec),
            },
        }
    }
}

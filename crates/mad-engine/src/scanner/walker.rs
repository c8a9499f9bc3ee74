//! Filesystem discovery.

use std::path::Path;
use std::sync::Arc;

use ignore::WalkBuilder;

use super::ignores::IgnorePatterns;
use super::types::{DiscoveredFile, StatKey};
use crate::paths;
use crate::stat::mtime_parts;

/// Regular files under a root plus the number of entries that could not
/// be read.
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<DiscoveredFile>,
    pub errors: usize,
}

/// Walk `root` without following symlinks, pruning ignored entries.
/// Hidden files and VCS ignore files get no special treatment.
pub fn discover(root: &Path, ignores: Arc<IgnorePatterns>) -> Discovery {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !ignores.is_ignored(entry.path(), is_dir)
        })
        .build();

    let mut discovery = Discovery::default();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "walk error");
                discovery.errors += 1;
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => {
                let (mtime_secs, mtime_nanos) = mtime_parts(&meta);
                discovery.files.push(DiscoveredFile {
                    path: paths::path_string(entry.path()),
                    key: StatKey {
                        mtime_secs,
                        mtime_nanos,
                        size: meta.len(),
                    },
                });
            }
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "cannot stat");
                discovery.errors += 1;
            }
        }
    }
    discovery
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_regular_files_and_prunes_ignored_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("keep/deep")).unwrap();
        fs::create_dir_all(tmp.path().join("skip")).unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join(".hidden"), "h").unwrap();
        fs::write(tmp.path().join("keep/deep/b.txt"), "bb").unwrap();
        fs::write(tmp.path().join("skip/c.txt"), "c").unwrap();

        let ignores = IgnorePatterns::new(tmp.path(), &["skip/".into()], None).unwrap();
        let found = discover(tmp.path(), Arc::new(ignores));

        let mut names: Vec<_> = found
            .files
            .iter()
            .map(|f| f.path.strip_prefix(&paths::path_string(tmp.path())).unwrap_or(&f.path).to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["/.hidden", "/a.txt", "/keep/deep/b.txt"]);
        assert_eq!(found.errors, 0);

        let b = found.files.iter().find(|f| f.path.ends_with("b.txt")).unwrap();
        assert_eq!(b.key.size, 2);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("real.txt"), "r").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real.txt"), tmp.path().join("link.txt"))
            .unwrap();
        let ignores = IgnorePatterns::new(tmp.path(), &[], None).unwrap();
        let found = discover(tmp.path(), Arc::new(ignores));
        assert_eq!(found.files.len(), 1);
        assert!(found.files[0].path.ends_with("real.txt"));
    }
}

//! Stat-triple diff between the catalog and the live tree.

use mad_core::types::{Document, FxHashMap, FxHashSet, ID_FIELD};
use serde_json::Value;

use super::types::{CachedEntry, DiscoveredFile, ScanDiff, StatKey};
use crate::identity::fields::FILENAME;
use crate::stat::{MTIME_NANOS, MTIME_SECS, SIZE};

/// Fields the scanner projects out of identity records.
pub const CACHED_FIELDS: [&str; 4] = [FILENAME, MTIME_SECS, MTIME_NANOS, SIZE];

/// Parse a projected identity record. Records without a filename or id are
/// unusable and yield `None`.
pub fn cached_entry(doc: &Document) -> Option<(String, CachedEntry)> {
    let id = doc.get(ID_FIELD)?.as_str()?.to_string();
    let path = doc.get(FILENAME)?.as_str()?.to_string();
    let key = (|| {
        Some(StatKey {
            mtime_secs: doc.get(MTIME_SECS).and_then(Value::as_i64)?,
            mtime_nanos: u32::try_from(doc.get(MTIME_NANOS).and_then(Value::as_u64)?).ok()?,
            size: doc.get(SIZE).and_then(Value::as_u64)?,
        })
    })();
    Some((path, CachedEntry { id, key }))
}

/// `changed = live - cached` on the full triple (every live path when
/// `refresh`), `deleted = cached - live` by path.
pub fn compute_diff(
    cached: &FxHashMap<String, CachedEntry>,
    live: &[DiscoveredFile],
    refresh: bool,
) -> ScanDiff {
    let mut diff = ScanDiff::default();
    let mut live_paths: FxHashSet<&str> = FxHashSet::default();

    for file in live {
        live_paths.insert(file.path.as_str());
        let fresh = cached
            .get(&file.path)
            .and_then(|c| c.key)
            .is_some_and(|key| key == file.key);
        if fresh && !refresh {
            diff.unchanged += 1;
        } else {
            diff.changed.push(file.path.clone());
        }
    }

    for (path, entry) in cached {
        if !live_paths.contains(path.as_str()) {
            diff.deleted_paths.push(path.clone());
            diff.deleted_ids.push(entry.id.clone());
        }
    }

    diff.changed.sort();
    diff.deleted_paths.sort();
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(mtime_secs: i64, size: u64) -> StatKey {
        StatKey {
            mtime_secs,
            mtime_nanos: 0,
            size,
        }
    }

    fn live(path: &str, k: StatKey) -> DiscoveredFile {
        DiscoveredFile {
            path: path.to_string(),
            key: k,
        }
    }

    fn cache(entries: &[(&str, &str, Option<StatKey>)]) -> FxHashMap<String, CachedEntry> {
        entries
            .iter()
            .map(|(p, id, k)| {
                (
                    p.to_string(),
                    CachedEntry {
                        id: id.to_string(),
                        key: *k,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn classifies_new_changed_unchanged_and_deleted() {
        let cached = cache(&[
            ("/r/same", "i1", Some(key(10, 1))),
            ("/r/touched", "i2", Some(key(10, 1))),
            ("/r/gone", "i3", Some(key(10, 1))),
        ]);
        let files = vec![
            live("/r/same", key(10, 1)),
            live("/r/touched", key(11, 1)),
            live("/r/new", key(5, 5)),
        ];
        let diff = compute_diff(&cached, &files, false);
        assert_eq!(diff.changed, vec!["/r/new", "/r/touched"]);
        assert_eq!(diff.unchanged, 1);
        assert_eq!(diff.deleted_paths, vec!["/r/gone"]);
        assert_eq!(diff.deleted_ids, vec!["i3"]);
    }

    #[test]
    fn changed_files_are_not_deleted() {
        let cached = cache(&[("/r/a", "i1", Some(key(1, 1)))]);
        let diff = compute_diff(&cached, &[live("/r/a", key(2, 2))], false);
        assert_eq!(diff.changed, vec!["/r/a"]);
        assert!(diff.deleted_ids.is_empty());
    }

    #[test]
    fn refresh_touches_everything() {
        let cached = cache(&[("/r/a", "i1", Some(key(1, 1)))]);
        let diff = compute_diff(&cached, &[live("/r/a", key(1, 1))], true);
        assert_eq!(diff.changed, vec!["/r/a"]);
        assert_eq!(diff.unchanged, 0);
    }

    #[test]
    fn records_without_stat_count_as_changed() {
        let cached = cache(&[("/r/a", "i1", None)]);
        let diff = compute_diff(&cached, &[live("/r/a", key(1, 1))], false);
        assert_eq!(diff.changed, vec!["/r/a"]);
    }

    #[test]
    fn parses_projected_records() {
        let doc = json!({"_id": "x", "filename": "/r/a", "mtime_secs": 3, "mtime_nanos": 4, "size": 5});
        let (path, entry) = cached_entry(doc.as_object().unwrap()).unwrap();
        assert_eq!(path, "/r/a");
        assert_eq!(entry.id, "x");
        assert_eq!(
            entry.key,
            Some(StatKey {
                mtime_secs: 3,
                mtime_nanos: 4,
                size: 5
            })
        );

        let partial = json!({"_id": "y", "filename": "/r/b"});
        assert_eq!(cached_entry(partial.as_object().unwrap()).unwrap().1.key, None);
        assert!(cached_entry(json!({"_id": "z"}).as_object().unwrap()).is_none());
    }
}

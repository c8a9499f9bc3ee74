//! Filesystem stat snapshot mirrored into identity records.

use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::sync::{LazyLock, Mutex};
use std::time::UNIX_EPOCH;

use mad_core::types::{Document, FxHashMap};
use serde_json::Value;

/// Reported when a uid or gid has no name on this host.
pub const UNKNOWN_NAME: &str = "__unknown__";

pub const SIZE: &str = "size";
pub const LINK_COUNT: &str = "link_count";
pub const MTIME_SECS: &str = "mtime_secs";
pub const MTIME_NANOS: &str = "mtime_nanos";
pub const OWNER_UID: &str = "owner_uid";
pub const OWNER_GID: &str = "owner_gid";
pub const OWNER_NAME: &str = "owner_name";
pub const GROUP_NAME: &str = "group_name";
pub const MODE: &str = "mode";

/// The stat fields kept on every identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSnapshot {
    pub size: u64,
    pub link_count: u64,
    pub mtime_secs: i64,
    pub mtime_nanos: u32,
    pub owner_uid: u32,
    pub owner_gid: u32,
    pub owner_name: String,
    pub group_name: String,
    pub mode: u32,
}

impl StatSnapshot {
    /// Stat `path`, following symlinks.
    pub fn capture(path: &Path) -> io::Result<Self> {
        Ok(Self::from_metadata(&std::fs::metadata(path)?))
    }

    #[cfg(unix)]
    pub fn from_metadata(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        let (mtime_secs, mtime_nanos) = mtime_parts(meta);
        Self {
            size: meta.size(),
            link_count: meta.nlink(),
            mtime_secs,
            mtime_nanos,
            owner_uid: meta.uid(),
            owner_gid: meta.gid(),
            owner_name: user_name(meta.uid()),
            group_name: group_name(meta.gid()),
            mode: meta.mode(),
        }
    }

    #[cfg(not(unix))]
    pub fn from_metadata(meta: &Metadata) -> Self {
        let (mtime_secs, mtime_nanos) = mtime_parts(meta);
        Self {
            size: meta.len(),
            link_count: 1,
            mtime_secs,
            mtime_nanos,
            owner_uid: 0,
            owner_gid: 0,
            owner_name: UNKNOWN_NAME.to_string(),
            group_name: UNKNOWN_NAME.to_string(),
            mode: if meta.permissions().readonly() { 0o444 } else { 0o644 },
        }
    }

    /// The snapshot as `(field, value)` pairs in record order.
    pub fn fields(&self) -> [(&'static str, Value); 9] {
        [
            (SIZE, self.size.into()),
            (LINK_COUNT, self.link_count.into()),
            (MTIME_SECS, self.mtime_secs.into()),
            (MTIME_NANOS, self.mtime_nanos.into()),
            (OWNER_UID, self.owner_uid.into()),
            (OWNER_GID, self.owner_gid.into()),
            (OWNER_NAME, self.owner_name.clone().into()),
            (GROUP_NAME, self.group_name.clone().into()),
            (MODE, self.mode.into()),
        ]
    }

    /// Copy every differing field into `doc`. Returns true on any change.
    pub fn apply_to(&self, doc: &mut Document) -> bool {
        let mut changed = false;
        for (key, value) in self.fields() {
            if doc.get(key) != Some(&value) {
                doc.insert(key.to_string(), value);
                changed = true;
            }
        }
        changed
    }
}

/// Modification time split into whole seconds and nanoseconds since the
/// epoch. The scanner's change detection uses the same split.
pub fn mtime_parts(meta: &Metadata) -> (i64, u32) {
    match meta.modified() {
        Ok(t) => match t.duration_since(UNIX_EPOCH) {
            Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
            Err(before) => {
                let d = before.duration();
                if d.subsec_nanos() == 0 {
                    (-(d.as_secs() as i64), 0)
                } else {
                    (-(d.as_secs() as i64) - 1, 1_000_000_000 - d.subsec_nanos())
                }
            }
        },
        Err(_) => (0, 0),
    }
}

static USER_NAMES: LazyLock<Mutex<FxHashMap<u32, String>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));
static GROUP_NAMES: LazyLock<Mutex<FxHashMap<u32, String>>> =
    LazyLock::new(|| Mutex::new(FxHashMap::default()));

fn cached(cache: &Mutex<FxHashMap<u32, String>>, id: u32, lookup: fn(u32) -> Option<String>) -> String {
    let mut map = cache.lock().unwrap_or_else(|e| e.into_inner());
    map.entry(id)
        .or_insert_with(|| lookup(id).unwrap_or_else(|| UNKNOWN_NAME.to_string()))
        .clone()
}

/// Name of `uid`, or [`UNKNOWN_NAME`].
pub fn user_name(uid: u32) -> String {
    cached(&USER_NAMES, uid, lookup_user)
}

/// Name of `gid`, or [`UNKNOWN_NAME`].
pub fn group_name(gid: u32) -> String {
    cached(&GROUP_NAMES, gid, lookup_group)
}

#[cfg(unix)]
fn lookup_user(uid: u32) -> Option<String> {
    use std::ffi::CStr;
    use std::{mem, ptr};

    let mut buf = vec![0 as libc::c_char; 1024];
    let mut passwd = unsafe { mem::zeroed::<libc::passwd>() };
    let mut result = ptr::null_mut::<libc::passwd>();

    loop {
        let r = unsafe {
            libc::getpwuid_r(uid, &mut passwd, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if r != libc::ERANGE {
            break;
        }
        let newsize = buf.len().checked_mul(2)?;
        buf.resize(newsize, 0);
    }

    if result.is_null() || passwd.pw_name.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(passwd.pw_name) };
    Some(name.to_string_lossy().into_owned())
}

#[cfg(unix)]
fn lookup_group(gid: u32) -> Option<String> {
    use std::ffi::CStr;
    use std::{mem, ptr};

    let mut buf = vec![0 as libc::c_char; 1024];
    let mut group = unsafe { mem::zeroed::<libc::group>() };
    let mut result = ptr::null_mut::<libc::group>();

    loop {
        let r = unsafe {
            libc::getgrgid_r(gid, &mut group, buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if r != libc::ERANGE {
            break;
        }
        let newsize = buf.len().checked_mul(2)?;
        buf.resize(newsize, 0);
    }

    if result.is_null() || group.gr_name.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr(group.gr_name) };
    Some(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn lookup_user(_uid: u32) -> Option<String> {
    None
}

#[cfg(not(unix))]
fn lookup_group(_gid: u32) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn capture_reports_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"12345").unwrap();
        let snap = StatSnapshot::capture(file.path()).unwrap();
        assert_eq!(snap.size, 5);
        assert!(snap.link_count >= 1);
    }

    #[test]
    fn apply_to_reports_changes_once() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let snap = StatSnapshot::capture(file.path()).unwrap();
        let mut doc = Document::new();
        assert!(snap.apply_to(&mut doc));
        assert!(!snap.apply_to(&mut doc));
        assert_eq!(doc.get(SIZE), Some(&Value::from(0u64)));
    }

    #[test]
    fn unknown_ids_fall_back() {
        assert_eq!(user_name(u32::MAX - 7), UNKNOWN_NAME);
        assert_eq!(group_name(u32::MAX - 7), UNKNOWN_NAME);
    }
}

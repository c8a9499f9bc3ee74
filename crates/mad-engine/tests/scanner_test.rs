//! Scanner tests: idempotence, deletion symmetry, refresh, ignores and
//! per-file failure tolerance.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mad_core::errors::ScanError;
use mad_core::keywords::KeywordSchema;
use mad_core::traits::DocumentStore;
use mad_core::types::{Collection, Filter};
use mad_engine::hasher::QUICK_SENTINEL;
use mad_engine::scanner::{ScanOptions, Scanner};
use mad_engine::{Context, TrackedFile};
use mad_storage::SqliteStore;
use serde_json::json;

fn context() -> Context {
    mad_core::tracing::init_tracing();
    let store = SqliteStore::open_in_memory().unwrap();
    Context::new(Arc::new(store), "scanhost", KeywordSchema::default())
}

fn options() -> ScanOptions {
    ScanOptions {
        threads: Some(2),
        ..Default::default()
    }
}

fn populate(root: &Path) {
    fs::create_dir_all(root.join("sub/deeper")).unwrap();
    fs::write(root.join("a.txt"), "alpha").unwrap();
    fs::write(root.join("sub/b.txt"), "beta").unwrap();
    fs::write(root.join("sub/deeper/c.txt"), "gamma").unwrap();
}

fn identity_count(ctx: &Context) -> usize {
    ctx.store()
        .find(Collection::Identity, &Filter::All, None)
        .unwrap()
        .len()
}

#[test]
fn second_scan_is_a_no_op() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let scanner = Scanner::new(&ctx, options());

    let first = scanner.scan(dir.path()).unwrap();
    assert_eq!(first.stats.in_db, 0);
    assert_eq!(first.stats.on_fs, 3);
    assert_eq!(first.stats.changed, 3);
    assert_eq!(first.stats.processed, 3);
    assert_eq!(identity_count(&ctx), 3);

    let second = scanner.scan(dir.path()).unwrap();
    assert_eq!(second.stats.in_db, 3);
    assert_eq!(second.stats.changed, 0);
    assert_eq!(second.stats.deleted, 0);
    assert_eq!(second.stats.identity_written, 0);
}

#[test]
fn modified_file_is_rescanned() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let scanner = Scanner::new(&ctx, options());
    scanner.scan(dir.path()).unwrap();

    fs::write(dir.path().join("sub/b.txt"), "beta, but longer").unwrap();
    let report = scanner.scan(dir.path()).unwrap();
    assert_eq!(report.stats.changed, 1);
    assert!(report.changed[0].ends_with("sub/b.txt"));
}

#[test]
fn deleted_file_loses_identity_but_not_shared_content() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one.txt"), "shared").unwrap();
    fs::write(dir.path().join("two.txt"), "shared").unwrap();
    let scanner = Scanner::new(&ctx, options());
    scanner.scan(dir.path()).unwrap();

    let one = TrackedFile::open(&ctx, &dir.path().join("one.txt"), false, None).unwrap();
    let hash = one.strong_hash().to_string();
    let gone_id = one.id().to_string();
    drop(one);
    ctx.store()
        .upsert(
            Collection::Content,
            &hash,
            json!({"project": "p"}).as_object().unwrap(),
        )
        .unwrap();
    let two = TrackedFile::open(&ctx, &dir.path().join("two.txt"), false, None).unwrap();
    assert_eq!(two.get("project"), Some(&json!("p")));
    drop(two);

    fs::remove_file(dir.path().join("one.txt")).unwrap();
    let report = scanner.scan(dir.path()).unwrap();
    assert_eq!(report.stats.deleted, 1);
    assert!(report.deleted[0].ends_with("one.txt"));
    assert!(ctx
        .store()
        .find_one(Collection::Identity, &gone_id)
        .unwrap()
        .is_none());
    assert!(ctx
        .store()
        .find_one(Collection::Content, &hash)
        .unwrap()
        .is_some());
    assert_eq!(identity_count(&ctx), 1);
}

#[test]
fn refresh_touches_every_file() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    Scanner::new(&ctx, options()).scan(dir.path()).unwrap();

    let refresh = ScanOptions {
        refresh: true,
        ..options()
    };
    let report = Scanner::new(&ctx, refresh).scan(dir.path()).unwrap();
    assert_eq!(report.stats.changed, 3);
    assert_eq!(report.stats.processed, 3);
    assert_eq!(report.stats.deleted, 0);
}

#[test]
fn quick_scan_then_refreshing_full_scan_fills_hashes() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let quick = ScanOptions {
        quick: true,
        ..options()
    };
    Scanner::new(&ctx, quick).scan(dir.path()).unwrap();
    let docs = ctx.store().find(Collection::Identity, &Filter::All, None).unwrap();
    assert!(docs.iter().all(|d| d["strong_hash"] == json!(QUICK_SENTINEL)));

    let full = ScanOptions {
        refresh: true,
        ..options()
    };
    Scanner::new(&ctx, full).scan(dir.path()).unwrap();
    let docs = ctx.store().find(Collection::Identity, &Filter::All, None).unwrap();
    assert_eq!(docs.len(), 3);
    assert!(docs.iter().all(|d| d["strong_hash"] != json!(QUICK_SENTINEL)));
}

#[test]
fn quick_scan_of_touched_file_keeps_real_hash() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let scanner = Scanner::new(&ctx, options());
    scanner.scan(dir.path()).unwrap();

    let path = dir.path().join("a.txt");
    let original = TrackedFile::open(&ctx, &path, false, None)
        .unwrap()
        .strong_hash()
        .to_string();
    let later = std::time::SystemTime::now() + std::time::Duration::from_secs(100);
    fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(later)
        .unwrap();

    let quick = ScanOptions {
        quick: true,
        ..options()
    };
    let report = Scanner::new(&ctx, quick).scan(dir.path()).unwrap();
    assert_eq!(report.stats.changed, 1);

    let report = scanner.scan(dir.path()).unwrap();
    assert_eq!(report.stats.changed, 0);
    let file = TrackedFile::open(&ctx, &path, false, None).unwrap();
    assert_eq!(file.strong_hash(), original);
    assert_ne!(file.strong_hash(), QUICK_SENTINEL);
}

#[test]
fn ignored_files_are_not_recorded() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    fs::write(dir.path().join("noise.log"), "log").unwrap();
    fs::create_dir(dir.path().join("cache")).unwrap();
    fs::write(dir.path().join("cache/blob"), "cached").unwrap();

    let opts = ScanOptions {
        extra_ignore: vec!["*.log".into(), "cache/".into()],
        ..options()
    };
    let report = Scanner::new(&ctx, opts).scan(dir.path()).unwrap();
    assert_eq!(report.stats.on_fs, 3);
    assert!(report.changed.iter().all(|p| !p.ends_with(".log")));
}

#[test]
fn sibling_directories_are_not_confused() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("data")).unwrap();
    fs::create_dir(dir.path().join("data2")).unwrap();
    fs::write(dir.path().join("data/x"), "x").unwrap();
    fs::write(dir.path().join("data2/y"), "y").unwrap();
    let scanner = Scanner::new(&ctx, options());

    scanner.scan(&dir.path().join("data2")).unwrap();
    let report = scanner.scan(&dir.path().join("data")).unwrap();
    assert_eq!(report.stats.in_db, 0);
    assert_eq!(report.stats.deleted, 0);
    assert_eq!(identity_count(&ctx), 2);
}

#[test]
fn empty_tree_scans_cleanly() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    let report = Scanner::new(&ctx, options()).scan(dir.path()).unwrap();
    assert_eq!(report.stats.changed, 0);
    assert_eq!(report.stats.identity_written, 0);
    assert_eq!(report.stats.content_written, 0);
}

#[test]
fn root_must_be_a_directory() {
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain");
    fs::write(&file, "x").unwrap();
    let err = Scanner::new(&ctx, options()).scan(&file).unwrap_err();
    assert!(matches!(err, ScanError::RootNotDirectory { .. }));
}

#[cfg(unix)]
#[test]
fn unreadable_files_are_counted_and_skipped() {
    use std::os::unix::fs::PermissionsExt;

    if unsafe { libc::geteuid() } == 0 {
        return;
    }
    let ctx = context();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let locked = dir.path().join("locked.txt");
    fs::write(&locked, "secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let report = Scanner::new(&ctx, options()).scan(dir.path()).unwrap();
    assert_eq!(report.stats.no_access, 1);
    assert_eq!(report.stats.processed, 3);
    assert_eq!(identity_count(&ctx), 3);
}

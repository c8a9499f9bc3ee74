//! Tests for layered configuration loading.

use std::path::PathBuf;
use std::sync::Mutex;

use mad_core::config::{CliOverrides, MadConfig};
use mad_core::errors::ConfigError;
use mad_core::keywords::{Category, KeywordSchema, Shape, ValueType};

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_KEYS: [&str; 5] = [
    "MAD_HOSTNAME",
    "MAD_STORE_PATH",
    "MAD_SCAN_THREADS",
    "MAD_SCAN_QUICK",
    "MAD_SCAN_REFRESH",
];

/// Clear `MAD_*` variables and point `HOME` at an empty directory so the
/// user layer is under test control.
fn isolate(home: &std::path::Path) {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", home);
}

fn write_project(dir: &std::path::Path, body: &str) {
    std::fs::write(dir.join("mad.toml"), body).unwrap();
}

#[test]
fn layers_resolve_in_priority_order() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate(home.path());

    std::fs::create_dir(home.path().join(".mad")).unwrap();
    std::fs::write(
        home.path().join(".mad/config.toml"),
        "[host]\nhostname = \"user-host\"\n\n[scan]\nthreads = 2\nquick = true\n",
    )
    .unwrap();

    let root = tempfile::tempdir().unwrap();
    write_project(root.path(), "[scan]\nthreads = 4\n");
    std::env::set_var("MAD_SCAN_QUICK", "false");

    let cli = CliOverrides {
        refresh: Some(true),
        ..Default::default()
    };
    let config = MadConfig::load(root.path(), Some(&cli)).unwrap();

    assert_eq!(config.host.hostname.as_deref(), Some("user-host"));
    assert_eq!(config.scan.threads, Some(4));
    assert!(!config.scan.effective_quick());
    assert!(config.scan.effective_refresh());

    isolate(home.path());
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate(home.path());

    let root = tempfile::tempdir().unwrap();
    let config = MadConfig::load(root.path(), None).unwrap();
    assert!(config.host.hostname.is_none());
    assert!(config.keywords.is_empty());
    assert!(!config.scan.effective_quick());
    assert_eq!(
        config.store.effective_path(),
        Some(home.path().join(".mad/catalog.db"))
    );
    assert_eq!(
        config.scan.effective_ignore_file(),
        Some(home.path().join(".madignore"))
    );
}

#[test]
fn env_overrides_project_and_cli_overrides_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate(home.path());

    let root = tempfile::tempdir().unwrap();
    write_project(
        root.path(),
        "[host]\nhostname = \"project-host\"\n\n[store]\npath = \"/srv/project.db\"\n",
    );
    std::env::set_var("MAD_HOSTNAME", "env-host");
    std::env::set_var("MAD_STORE_PATH", "/srv/env.db");
    std::env::set_var("MAD_SCAN_THREADS", "3");

    let config = MadConfig::load(root.path(), None).unwrap();
    assert_eq!(config.host.hostname.as_deref(), Some("env-host"));
    assert_eq!(config.store.path, Some(PathBuf::from("/srv/env.db")));
    assert_eq!(config.scan.threads, Some(3));

    let cli = CliOverrides {
        hostname: Some("cli-host".into()),
        scan_threads: Some(8),
        ..Default::default()
    };
    let config = MadConfig::load(root.path(), Some(&cli)).unwrap();
    assert_eq!(config.host.hostname.as_deref(), Some("cli-host"));
    assert_eq!(config.scan.threads, Some(8));

    isolate(home.path());
}

#[test]
fn unparsable_env_values_are_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate(home.path());

    let root = tempfile::tempdir().unwrap();
    std::env::set_var("MAD_SCAN_THREADS", "many");
    std::env::set_var("MAD_SCAN_REFRESH", "yes please");
    let config = MadConfig::load(root.path(), None).unwrap();
    assert_eq!(config.scan.threads, None);
    assert_eq!(config.scan.refresh, None);

    isolate(home.path());
}

#[test]
fn malformed_project_file_is_a_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempfile::tempdir().unwrap();
    isolate(home.path());

    let root = tempfile::tempdir().unwrap();
    write_project(root.path(), "[scan\nthreads = 1");
    let err = MadConfig::load(root.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn validation_rejects_bad_values() {
    let cases = [
        ("[host]\nhostname = \"  \"\n", "host.hostname"),
        ("[scan]\nthreads = 0\n", "scan.threads"),
        ("[store]\nread_pool_size = 0\n", "store.read_pool_size"),
        ("[keywords.p]\nalias = \"project\"\n", "keywords.p.alias"),
    ];
    for (toml, field) in cases {
        match MadConfig::from_toml(toml) {
            Err(ConfigError::ValidationFailed { field: got, .. }) => assert_eq!(got, field),
            other => panic!("{field}: expected validation failure, got {other:?}"),
        }
    }
}

#[test]
fn alias_cycles_are_rejected() {
    let toml = r#"
[keywords.a]
alias = "b"

[keywords.b]
alias = "a"
"#;
    match MadConfig::from_toml(toml) {
        Err(ConfigError::ValidationFailed { message, .. }) => assert_eq!(message, "alias cycle"),
        other => panic!("expected alias cycle, got {other:?}"),
    }
}

#[test]
fn keyword_tables_build_a_schema() {
    let toml = r#"
[keywords.project]
help = "Project the file belongs to"

[keywords.proj]
alias = "project"

[keywords.tag]
shape = "set"
cat = ["transient"]

[keywords.reads]
type = "int"
cat = ["core"]
"#;
    let config = MadConfig::from_toml(toml).unwrap();
    let schema = KeywordSchema::new(config.keywords.clone());

    let project = schema.resolve("proj").unwrap();
    assert_eq!(project.canonical, "project");
    assert_eq!(schema.help("project"), Some("Project the file belongs to"));

    let tag = schema.resolve("tag").unwrap();
    assert_eq!(tag.shape, Shape::AppendSet);
    assert!(tag.categories.contains(Category::Transient));
    assert!(!tag.categories.contains(Category::Core));

    let reads = schema.resolve("reads").unwrap();
    assert_eq!(reads.value_type, ValueType::Int);

    let mut canonical: Vec<_> = schema.canonical_keys().collect();
    canonical.sort_unstable();
    assert_eq!(canonical, vec!["project", "reads", "tag"]);
}

#[test]
fn config_serializes_back_to_toml() {
    let config = MadConfig::from_toml("[scan]\nthreads = 6\nextra_ignore = [\"*.tmp\"]\n").unwrap();
    let text = config.to_toml().unwrap();
    let again = MadConfig::from_toml(&text).unwrap();
    assert_eq!(again.scan.threads, Some(6));
    assert_eq!(again.scan.extra_ignore, vec!["*.tmp".to_string()]);
}

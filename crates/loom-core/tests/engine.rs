//! End-to-end engine scenarios over real temp directories.

use loom_common_config::Store;
use loom_core::ops::{add, init, remove, remove_all, weave};
use loom_core::{Decision, ErrorKind, LoomError, Manifest};
use loom_test_utils::{assert_err, assert_ok, ProjectFixture, ScriptedDecider, StoreFixture};

fn catalog(stores: &[&StoreFixture]) -> Vec<Store> {
    stores.iter().map(|s| s.store()).collect()
}

#[test]
fn test_happy_add() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("logging-module", "README.md", "# logging")
        .thread_file("logging-module", "src/utils/logger.go", "package utils");
    let project = ProjectFixture::new();
    let mut decider = ScriptedDecider::silent();

    let report = assert_ok!(add(
        project.root(),
        "logging-module",
        &catalog(&[&store]),
        &mut decider
    ));

    assert_eq!(report.thread.source, "myStore");
    assert_eq!(report.thread.created, vec!["README.md", "src/utils/logger.go"]);
    assert!(decider.prompts.is_empty());
    assert_eq!(project.read("src/utils/logger.go"), "package utils");

    let manifest = project.manifest();
    assert_eq!(manifest.threads.len(), 1);
    assert_eq!(manifest.threads[0].source, "myStore");
    assert_eq!(manifest.is_owned("README.md"), Some("logging-module"));
    assert_eq!(manifest.is_owned("src/utils/logger.go"), Some("logging-module"));
}

#[test]
fn test_add_from_project_store() {
    let project = ProjectFixture::new();
    project.project_thread_file("local", "hello.txt", "hi");
    let mut decider = ScriptedDecider::silent();

    let report = assert_ok!(add(project.root(), "local", &Vec::<Store>::new(), &mut decider));
    assert_eq!(report.thread.source, "project:.loom/local");
    assert_eq!(project.read("hello.txt"), "hi");
}

#[test]
fn test_add_with_explicit_store() {
    let first = StoreFixture::new("first");
    let second = StoreFixture::new("second");
    first.thread_file("api", "which.txt", "first");
    second.thread_file("api", "which.txt", "second");
    let project = ProjectFixture::new();

    assert_ok!(add(
        project.root(),
        "second/api",
        &catalog(&[&first, &second]),
        &mut ScriptedDecider::silent()
    ));
    assert_eq!(project.read("which.txt"), "second");
    assert_eq!(project.manifest().threads[0].source, "second");
}

#[test]
fn test_conflict_decline_leaves_file_alone() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("api", "config.toml", "from thread")
        .thread_file("api", "other.txt", "other");
    let project = ProjectFixture::new();
    project.file("config.toml", "user edits");
    let mut decider = ScriptedDecider::new([Decision::No]);

    let report = assert_ok!(add(project.root(), "api", &catalog(&[&store]), &mut decider));

    assert_eq!(report.thread.declined, vec!["config.toml"]);
    assert_eq!(project.read("config.toml"), "user edits");
    assert_eq!(decider.prompts.len(), 1);
    assert_eq!(
        decider.prompts[0].context(),
        "File 'config.toml' exists but is not currently owned by any Loom thread."
    );

    let manifest = project.manifest();
    assert_eq!(manifest.is_owned("config.toml"), None);
    assert_eq!(manifest.is_owned("other.txt"), Some("api"));
}

#[test]
fn test_conflict_skip_behaves_like_decline() {
    let store = StoreFixture::new("myStore");
    store.thread_file("api", "a.txt", "thread");
    let project = ProjectFixture::new();
    project.file("a.txt", "mine");

    let mut decider = ScriptedDecider::new([Decision::Skip]);
    assert_ok!(add(project.root(), "api", &catalog(&[&store]), &mut decider));
    assert_eq!(project.read("a.txt"), "mine");
    assert!(project.manifest().thread("api").unwrap().files.is_empty());
}

#[test]
fn test_adopt_unowned_file() {
    let store = StoreFixture::new("myStore");
    store.thread_file("api", "a.txt", "thread");
    let project = ProjectFixture::new();
    project.file("a.txt", "mine");

    let mut decider = ScriptedDecider::new([Decision::Yes]);
    let report = assert_ok!(add(project.root(), "api", &catalog(&[&store]), &mut decider));
    assert_eq!(report.thread.adopted, vec!["a.txt"]);
    assert_eq!(project.read("a.txt"), "thread");
    assert_eq!(project.manifest().is_owned("a.txt"), Some("api"));
}

#[test]
fn test_transfer_between_threads() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("a", "shared/x.txt", "from a")
        .thread_file("a", "a-only.txt", "a")
        .thread_file("b", "shared/x.txt", "from b");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));

    let mut decider = ScriptedDecider::new([Decision::Yes]);
    let report = assert_ok!(add(project.root(), "b", &stores, &mut decider));

    assert_eq!(
        decider.prompts[0].context(),
        "File 'shared/x.txt' is currently owned by thread 'a'."
    );
    assert_eq!(report.thread.transferred.len(), 1);
    assert_eq!(report.thread.transferred[0].from, "a");
    assert_eq!(project.read("shared/x.txt"), "from b");

    let manifest = project.manifest();
    assert_eq!(manifest.is_owned("shared/x.txt"), Some("b"));
    assert_eq!(manifest.is_owned("a-only.txt"), Some("a"));
    assert!(!manifest.thread("a").unwrap().files.contains_path("shared/x.txt"));
    assert!(manifest.ownership_conflicts().is_empty());
}

#[test]
fn test_readd_replaces_record_in_place() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("a", "one.txt", "1")
        .thread_file("b", "two.txt", "2");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));
    assert_ok!(add(project.root(), "b", &stores, &mut ScriptedDecider::silent()));

    std::fs::remove_file(store.path().join("a/_thread/one.txt")).unwrap();
    store.thread_file("a", "three.txt", "3");
    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));

    let manifest = project.manifest();
    let names: Vec<_> = manifest.threads.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(manifest.thread("a").unwrap().files.paths(), vec!["three.txt"]);
}

#[test]
fn test_malformed_store_entry() {
    let store = StoreFixture::new("myStore");
    project_file_in(store.path(), "broken/_thread", "this is a file, not a directory");
    let project = ProjectFixture::new();

    let err = assert_err!(add(
        project.root(),
        "broken",
        &catalog(&[&store]),
        &mut ScriptedDecider::silent()
    ));
    assert_eq!(err.kind(), ErrorKind::Malformed);
    let expected = format!(
        "thread path '{}' in store 'myStore' is a file, not a directory",
        store.path().join("broken").join("_thread").display()
    );
    assert_eq!(err.to_string(), expected);
    assert!(!project.exists("_thread"));
    assert!(!project.exists("loom.yaml"));
}

fn project_file_in(base: &std::path::Path, rel: &str, content: &str) {
    loom_test_utils::write_file(base, rel, content);
}

#[test]
fn test_not_found_messages() {
    let store = StoreFixture::new("myStore");
    store.empty_thread("exists");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);
    let mut decider = ScriptedDecider::silent();

    let err = assert_err!(add(project.root(), "nope", &stores, &mut decider));
    assert_eq!(
        err.to_string(),
        "thread 'nope' not found in project's .loom folder or any configured local PC stores"
    );

    let err = assert_err!(add(project.root(), "myStore/nope", &stores, &mut decider));
    assert_eq!(err.to_string(), "thread 'nope' not found in specified store 'myStore'");

    let err = assert_err!(add(project.root(), "otherStore/exists", &stores, &mut decider));
    assert_eq!(
        err.to_string(),
        "specified store 'otherStore' not found in global configuration"
    );
}

#[test]
fn test_decider_failure_aborts_without_saving() {
    let store = StoreFixture::new("myStore");
    store.thread_file("api", "a.txt", "thread");
    let project = ProjectFixture::new();
    project.file("a.txt", "mine");

    let err = assert_err!(add(
        project.root(),
        "api",
        &catalog(&[&store]),
        &mut ScriptedDecider::silent()
    ));
    assert!(matches!(err, LoomError::ConflictAborted { .. }));
    assert_eq!(err.kind(), ErrorKind::ConflictAborted);
    assert!(!project.exists("loom.yaml"));
    assert_eq!(project.read("a.txt"), "mine");
}

#[test]
fn test_weave_is_idempotent() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("api", "src/lib.rs", "pub fn api() {}")
        .thread_file("api", "README.md", "api");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "api", &stores, &mut ScriptedDecider::silent()));
    project.file("src/lib.rs", "local edit");

    assert_ok!(weave(project.root(), None, &stores, &mut ScriptedDecider::silent()));
    let first = project.manifest();
    let first_bytes = project.read("src/lib.rs");

    let report = assert_ok!(weave(project.root(), None, &stores, &mut ScriptedDecider::silent()));
    assert_eq!(project.manifest(), first);
    assert_eq!(project.read("src/lib.rs"), first_bytes);
    assert_eq!(first_bytes, "pub fn api() {}");
    assert_eq!(report.threads[0].reapplied.len(), 2);
}

#[test]
fn test_full_weave_picks_up_new_files() {
    let store = StoreFixture::new("myStore");
    store.thread_file("api", "a.txt", "a");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "api", &stores, &mut ScriptedDecider::silent()));
    store.thread_file("api", "b.txt", "b");

    assert_ok!(weave(project.root(), None, &stores, &mut ScriptedDecider::silent()));
    assert_eq!(project.read("b.txt"), "b");
    assert_eq!(project.manifest().is_owned("b.txt"), Some("api"));
}

#[test]
fn test_targeted_weave_scope() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("a", "a.txt", "a")
        .thread_file("b", "b.txt", "b");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));
    assert_ok!(add(project.root(), "b", &stores, &mut ScriptedDecider::silent()));

    project.file("a.txt", "edited a").file("b.txt", "edited b");
    store.thread_file("a", "new.txt", "new");
    let before = project.manifest();

    assert_ok!(weave(project.root(), Some("a"), &stores, &mut ScriptedDecider::silent()));

    assert_eq!(project.read("a.txt"), "a");
    assert_eq!(project.read("b.txt"), "edited b");
    assert!(!project.exists("new.txt"));
    assert_eq!(project.manifest(), before);
}

#[test]
fn test_targeted_weave_unknown_thread() {
    let store = StoreFixture::new("myStore");
    store.thread_file("a", "a.txt", "a");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);
    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));
    project.file("a.txt", "edited");

    let err = assert_err!(weave(project.root(), Some("zzz"), &stores, &mut ScriptedDecider::silent()));
    assert_eq!(err.to_string(), "thread 'zzz' not found in loom.yaml");
    assert_eq!(project.read("a.txt"), "edited");
}

#[test]
fn test_weave_requires_manifest() {
    let project = ProjectFixture::new();
    let err = assert_err!(weave(project.root(), None, &Vec::<Store>::new(), &mut ScriptedDecider::silent()));
    assert!(matches!(err, LoomError::ManifestNotFound { .. }));
}

#[test]
fn test_weave_skips_thread_with_missing_source() {
    let project = ProjectFixture::new();
    project.project_thread_file("gone", "g.txt", "g");
    let stores = Vec::<Store>::new();
    assert_ok!(add(project.root(), "gone", &stores, &mut ScriptedDecider::silent()));
    std::fs::remove_dir_all(project.root().join(".loom")).unwrap();
    let before = project.manifest();

    let report = assert_ok!(weave(project.root(), None, &stores, &mut ScriptedDecider::silent()));
    assert_eq!(report.missing_sources, vec!["gone"]);
    assert_eq!(project.manifest(), before);
}

#[test]
fn test_weave_all_prompts_for_foreign_files() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("a", "x.txt", "a")
        .thread_file("b", "x.txt", "b");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));
    assert_ok!(add(project.root(), "b", &stores, &mut ScriptedDecider::new([Decision::Yes])));

    // "a" comes first and finds x.txt owned by "b".
    let mut decider = ScriptedDecider::new([Decision::No]);
    assert_ok!(weave(project.root(), None, &stores, &mut decider));
    assert_eq!(decider.prompts.len(), 1);
    assert_eq!(decider.prompts[0].owner.as_deref(), Some("b"));
    assert_eq!(project.read("x.txt"), "b");

    let manifest = project.manifest();
    assert_eq!(manifest.is_owned("x.txt"), Some("b"));
    assert!(manifest.ownership_conflicts().is_empty());
}

#[test]
fn test_remove_and_remove_all() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("a", "a/deep/a.txt", "a")
        .thread_file("b", "b.txt", "b");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);
    assert_ok!(init(project.root()));
    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));
    assert_ok!(add(project.root(), "b", &stores, &mut ScriptedDecider::silent()));

    let report = assert_ok!(remove(project.root(), "a"));
    assert_eq!(report.removed_files, vec!["a/deep/a.txt"]);
    assert!(!project.exists("a"));
    assert_eq!(project.manifest().threads.len(), 1);

    let report = assert_ok!(remove_all(project.root()));
    assert!(!report.nothing_to_do);
    assert!(!project.exists("b.txt"));
    assert!(project.root().exists());
    assert_eq!(project.manifest(), Manifest::default());

    let report = assert_ok!(remove_all(project.root()));
    assert!(report.nothing_to_do);
}

#[cfg(unix)]
#[test]
fn test_file_mode_is_preserved() {
    use std::os::unix::fs::PermissionsExt;

    let store = StoreFixture::new("myStore");
    store.thread_file("tools", "run.sh", "#!/bin/sh\n");
    let script = store.path().join("tools/_thread/run.sh");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    let project = ProjectFixture::new();

    assert_ok!(add(project.root(), "tools", &catalog(&[&store]), &mut ScriptedDecider::silent()));
    let mode = std::fs::metadata(project.root().join("run.sh")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[cfg(unix)]
#[test]
fn test_read_only_file_is_reapplied() {
    use std::os::unix::fs::PermissionsExt;

    let store = StoreFixture::new("myStore");
    store.thread_file("docs", "LICENSE", "v1");
    let license = store.path().join("docs/_thread/LICENSE");
    std::fs::set_permissions(&license, std::fs::Permissions::from_mode(0o444)).unwrap();
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "docs", &stores, &mut ScriptedDecider::silent()));
    std::fs::set_permissions(&license, std::fs::Permissions::from_mode(0o644)).unwrap();
    std::fs::write(&license, "v2").unwrap();
    std::fs::set_permissions(&license, std::fs::Permissions::from_mode(0o444)).unwrap();

    let report = assert_ok!(weave(project.root(), None, &stores, &mut ScriptedDecider::silent()));
    assert_eq!(report.threads[0].reapplied, vec!["LICENSE"]);
    assert_eq!(project.read("LICENSE"), "v2");
    let mode = std::fs::metadata(project.root().join("LICENSE")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o444);
}

#[cfg(unix)]
#[test]
fn test_backslash_file_name_transfers_between_threads() {
    let store = StoreFixture::new("myStore");
    store
        .thread_file("a", "a\\b.txt", "from a")
        .thread_file("b", "a\\b.txt", "from b");
    let project = ProjectFixture::new();
    let stores = catalog(&[&store]);

    assert_ok!(add(project.root(), "a", &stores, &mut ScriptedDecider::silent()));
    assert_eq!(project.read("a\\b.txt"), "from a");
    assert!(!project.root().join("a").exists());

    let mut decider = ScriptedDecider::new([Decision::Yes]);
    let report = assert_ok!(add(project.root(), "b", &stores, &mut decider));
    assert_eq!(report.thread.transferred.len(), 1);
    assert_eq!(project.read("a\\b.txt"), "from b");

    let manifest = project.manifest();
    assert_eq!(manifest.owner_of("./", "a\\b.txt"), Some("b"));
    assert!(manifest.thread("a").unwrap().files.is_empty());
    assert!(manifest.ownership_conflicts().is_empty());
}

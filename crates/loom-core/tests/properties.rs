//! Ownership invariants under random add/weave/remove sequences.

use loom_core::ops::{add, remove, weave};
use loom_core::{Decision, Manifest};
use loom_test_utils::{ProjectFixture, ScriptedDecider, StoreFixture};
use proptest::prelude::*;

const POOL: &[&str] = &["README.md", "src/main.rs", "src/lib.rs", "docs/guide.md", "a/b/c.txt"];
const THREADS: &[&str] = &["alpha", "beta", "gamma"];

#[derive(Debug, Clone)]
enum Step {
    Add(usize),
    WeaveAll,
    WeaveOne(usize),
    Remove(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0..THREADS.len()).prop_map(Step::Add),
        1 => Just(Step::WeaveAll),
        1 => (0..THREADS.len()).prop_map(Step::WeaveOne),
        1 => (0..THREADS.len()).prop_map(Step::Remove),
    ]
}

fn decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Yes), Just(Decision::No), Just(Decision::Skip)]
}

fn assert_invariants(manifest: &Manifest, project: &ProjectFixture) {
    assert!(
        manifest.ownership_conflicts().is_empty(),
        "a file has more than one owner: {:?}",
        manifest.ownership_conflicts()
    );
    for thread in &manifest.threads {
        for path in thread.files.paths() {
            assert!(project.exists(&path), "owned file {path} is missing");
            assert_eq!(manifest.is_owned(&path), Some(thread.name.as_str()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ownership_stays_exclusive(
        layout in proptest::collection::vec(proptest::collection::vec(any::<bool>(), POOL.len()), THREADS.len()),
        steps in proptest::collection::vec(step(), 1..12),
        answers in proptest::collection::vec(decision(), 64),
    ) {
        let store = StoreFixture::new("pool");
        for (thread, picks) in THREADS.iter().zip(&layout) {
            store.empty_thread(thread);
            for (file, picked) in POOL.iter().zip(picks) {
                if *picked {
                    store.thread_file(thread, file, &format!("{thread}:{file}"));
                }
            }
        }
        let stores = vec![store.store()];
        let project = ProjectFixture::new();
        let mut decider = ScriptedDecider::new(answers);

        for step in steps {
            let result = match step {
                Step::Add(i) => add(project.root(), THREADS[i], &stores, &mut decider).map(|_| ()),
                Step::WeaveAll => weave(project.root(), None, &stores, &mut decider).map(|_| ()),
                Step::WeaveOne(i) => weave(project.root(), Some(THREADS[i]), &stores, &mut decider).map(|_| ()),
                Step::Remove(i) => remove(project.root(), THREADS[i]).map(|_| ()),
            };
            // Weaving or removing an absent thread is a legitimate error.
            if result.is_err() {
                continue;
            }
            assert_invariants(&project.manifest(), &project);
        }
    }
}

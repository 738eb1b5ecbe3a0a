//! Integration tests for the merge engine.

use strongbox::merge::{merge, MergeReport, Resolution};
use strongbox::vault::{SecretEntry, SecretStore};

fn store(entries: &[(&str, &str)]) -> SecretStore {
    let mut s = SecretStore::new();
    for (name, value) in entries {
        s.insert(SecretEntry::new(*name, *value, "")).unwrap();
    }
    s
}

fn snapshot(s: &SecretStore) -> Vec<(String, String)> {
    s.entries()
        .iter()
        .map(|e| (e.name.clone(), e.value.clone()))
        .collect()
}

#[test]
fn use_imported_overwrites_and_appends() {
    let local = store(&[("a", "1"), ("b", "2")]);
    let imported = store(&[("b", "X"), ("c", "3")]);

    let mut always_imported = |_: &SecretEntry, _: &SecretEntry| Resolution::UseImported;
    let outcome = merge(&local, &imported, &mut always_imported).unwrap();

    assert_eq!(
        snapshot(&outcome.store),
        [
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "X".to_string()),
            ("c".to_string(), "3".to_string()),
        ]
    );
    assert_eq!(
        outcome.report,
        MergeReport {
            imported: 2,
            overwritten: 1,
            skipped: 0,
            kept_local: 0,
        }
    );
}

#[test]
fn keep_local_leaves_conflicts_alone() {
    let local = store(&[("a", "1"), ("b", "2")]);
    let imported = store(&[("b", "X"), ("c", "3")]);

    let mut keep_local = |_: &SecretEntry, _: &SecretEntry| Resolution::KeepLocal;
    let outcome = merge(&local, &imported, &mut keep_local).unwrap();

    assert_eq!(
        snapshot(&outcome.store),
        [
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ]
    );
    assert_eq!(outcome.report.imported, 1);
    assert_eq!(outcome.report.overwritten, 0);
    assert_eq!(outcome.report.skipped, 1);
}

#[test]
fn merge_does_not_touch_inputs() {
    let local = store(&[("a", "1")]);
    let imported = store(&[("a", "2"), ("b", "3")]);
    let before = snapshot(&local);

    let mut use_imported = |_: &SecretEntry, _: &SecretEntry| Resolution::UseImported;
    merge(&local, &imported, &mut use_imported).unwrap();

    assert_eq!(snapshot(&local), before);
    assert_eq!(imported.len(), 2);
}

#[test]
fn same_resolver_gives_same_result() {
    let local = store(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let imported = store(&[("c", "z"), ("d", "4"), ("a", "y")]);

    let run = || {
        let mut by_name = |l: &SecretEntry, _: &SecretEntry| {
            if l.name == "a" {
                Resolution::UseImported
            } else {
                Resolution::Skip
            }
        };
        snapshot(&merge(&local, &imported, &mut by_name).unwrap().store)
    };

    assert_eq!(run(), run());
}

#[test]
fn merge_with_empty_local_imports_everything() {
    let local = SecretStore::new();
    let imported = store(&[("a", "1"), ("b", "2")]);

    let mut never_called = |_: &SecretEntry, _: &SecretEntry| -> Resolution {
        panic!("no conflicts expected")
    };
    let outcome = merge(&local, &imported, &mut never_called).unwrap();

    assert_eq!(outcome.store.len(), 2);
    assert_eq!(outcome.report.imported, 2);
}

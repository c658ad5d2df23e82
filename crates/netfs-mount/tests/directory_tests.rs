//! Directory enumeration tests.
//!
//! Run: `cargo nextest run -p netfs-mount directory_tests`

mod common;

use common::*;
use netfs_core::{EntryKind, Method, MAX_ENTRIES};
use netfs_mount::DirectoryOperations;

#[test]
fn test_empty_directory_lists_dot_entries_only() {
    let mount = TestMount::new();
    let dir = mount.fs.mkdir(mount.root(), b"empty").unwrap();

    let records = mount.list(dir.ino);
    assert_eq!(
        records,
        vec![
            (b".".to_vec(), dir.ino, EntryKind::Directory),
            (b"..".to_vec(), mount.root(), EntryKind::Directory),
        ]
    );
}

#[test]
fn test_root_parent_is_root() {
    let mount = TestMount::new();
    let records = mount.list(mount.root());
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].1, mount.root());
}

#[test]
fn test_k_entries_yield_two_plus_k_records() {
    for k in 0..=MAX_ENTRIES {
        let mount = TestMount::new();
        let mut expected = vec![b".".to_vec(), b"..".to_vec()];
        for i in 0..k {
            let name = format!("entry-{i:02}").into_bytes();
            if i % 3 == 0 {
                mount.fs.mkdir(mount.root(), &name).unwrap();
            } else {
                mount.fs.create(mount.root(), &name).unwrap();
            }
            expected.push(name);
        }
        assert_eq!(mount.list_names(mount.root()), expected, "k = {k}");
    }
}

#[test]
fn test_entry_kinds_and_ids() {
    let mount = TestMount::new();
    let dir = mount.fs.mkdir(mount.root(), b"d").unwrap();
    let file = mount.fs.create(mount.root(), b"f").unwrap();

    let records = mount.list(mount.root());
    assert_eq!(records[2], (b"d".to_vec(), dir.ino, EntryKind::Directory));
    assert_eq!(records[3], (b"f".to_vec(), file.ino, EntryKind::File));
}

#[test]
fn test_nested_parent_entry() {
    let mount = TestMount::new();
    let outer = mount.fs.mkdir(mount.root(), b"outer").unwrap();
    let inner = mount.fs.mkdir(outer.ino, b"inner").unwrap();

    let records = mount.list(inner.ino);
    assert_eq!(records[0].1, inner.ino);
    assert_eq!(records[1].1, outer.ino);
}

#[test]
fn test_resumed_enumeration_covers_all_entries() {
    let mount = TestMount::new();
    for i in 0..5 {
        mount.fs.create(mount.root(), format!("f{i}").as_bytes()).unwrap();
    }
    mount.remote.clear_calls();

    let mut pos = 0;
    let mut names = Vec::new();
    let mut calls = 0;
    loop {
        let mut budget = 2;
        let emitted = mount
            .fs
            .readdir(mount.root(), &mut pos, &mut |record| {
                if budget == 0 {
                    return false;
                }
                budget -= 1;
                names.push(record.name.to_vec());
                true
            })
            .unwrap();
        calls += 1;
        if emitted == 0 {
            break;
        }
    }

    let expected: Vec<Vec<u8>> = [".", "..", "f0", "f1", "f2", "f3", "f4"]
        .iter()
        .map(|n| n.as_bytes().to_vec())
        .collect();
    assert_eq!(names, expected);
    assert_eq!(pos, 7);
    // Every call lists once, including the last one that finds nothing left.
    assert_eq!(calls, 5);
    assert_eq!(mount.remote.call_count(Method::List), 5);
}

#[test]
fn test_readdir_on_file_fails() {
    let mount = TestMount::new();
    let file = mount.fs.create(mount.root(), b"f").unwrap();
    let mut pos = 0;
    assert_errno(
        mount.fs.readdir(file.ino, &mut pos, &mut |_| true),
        libc::ENOTDIR,
    );
}

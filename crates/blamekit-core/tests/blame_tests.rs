//! End-to-end blame tests over in-memory histories.

use blamekit_core::{
    blame, blame_with, AbortHandle, BinaryPolicy, BlameOptions, BlameResult, CachedStore, Commit,
    Error, MemoryStore, MergeStrategy, ObjectId, ObjectStore, Signature,
};
use chrono::{FixedOffset, TimeZone};
use std::collections::{BTreeMap, HashSet};

fn sig(name: &str, secs: i64) -> Signature {
    let tz = FixedOffset::east_opt(3600).unwrap();
    Signature::new(name, format!("{}@example.com", name), tz.timestamp_opt(secs, 0).unwrap())
}

fn origins(result: &BlameResult) -> Vec<ObjectId> {
    result.lines.iter().map(|l| l.origin).collect()
}

fn blame_at(store: &MemoryStore, id: ObjectId, path: &str) -> BlameResult {
    let commit = store.resolve_commit(&id).unwrap();
    blame(store, &commit, path).unwrap()
}

fn is_ancestor(store: &MemoryStore, ancestor: ObjectId, of: ObjectId) -> bool {
    let mut stack = vec![of];
    let mut seen = HashSet::new();
    while let Some(id) = stack.pop() {
        if id == ancestor {
            return true;
        }
        if seen.insert(id) {
            stack.extend(store.get(&id).unwrap().parents.iter().copied());
        }
    }
    false
}

/// A small history: root adds a file, two edits follow.
fn linear_history(store: &mut MemoryStore) -> [ObjectId; 3] {
    let c1 = store
        .commit("Add greeting")
        .author(sig("alice", 1_000))
        .file("hello.txt", "hello\nworld\n")
        .create()
        .unwrap();
    let c2 = store
        .commit("Append farewell")
        .parent(c1)
        .author(sig("bob", 2_000))
        .file("hello.txt", "hello\nworld\ngoodbye\n")
        .create()
        .unwrap();
    let c3 = store
        .commit("Shout\n\nLouder is better.")
        .parent(c2)
        .author(sig("carol", 3_000))
        .file("hello.txt", "HELLO\nworld\ngoodbye\n")
        .create()
        .unwrap();
    [c1, c2, c3]
}

#[test]
fn test_linear_attribution() {
    let mut store = MemoryStore::new();
    let [c1, c2, c3] = linear_history(&mut store);

    let result = blame_at(&store, c3, "hello.txt");
    assert_eq!(result.revision, c3);
    assert_eq!(result.path, "hello.txt");
    assert_eq!(origins(&result), vec![c3, c1, c2]);

    let texts: Vec<&str> = result.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["HELLO", "world", "goodbye"]);
}

#[test]
fn test_line_carries_origin_details() {
    let mut store = MemoryStore::new();
    let [_, _, c3] = linear_history(&mut store);

    let result = blame_at(&store, c3, "hello.txt");
    let line = &result.lines[0];
    assert_eq!(line.author_name, "carol");
    assert_eq!(line.author_email, "carol@example.com");
    assert_eq!(line.author_time.timestamp(), 3_000);
    assert_eq!(line.author_time.offset().local_minus_utc(), 3600);
    assert_eq!(line.message, "Shout\n\nLouder is better.");
    assert_eq!(line.author(), "carol <carol@example.com>");
}

#[test]
fn test_blame_is_idempotent() {
    let mut store = MemoryStore::new();
    let [_, _, c3] = linear_history(&mut store);

    let first = blame_at(&store, c3, "hello.txt");
    let second = blame_at(&store, c3, "hello.txt");
    assert_eq!(first, second);
}

#[test]
fn test_every_origin_is_an_ancestor() {
    let mut store = MemoryStore::new();
    let [_, _, c3] = linear_history(&mut store);

    let result = blame_at(&store, c3, "hello.txt");
    assert_eq!(result.lines.len(), 3);
    for line in &result.lines {
        assert!(is_ancestor(&store, line.origin, c3));
    }
}

#[test]
fn test_single_commit_file() {
    let mut store = MemoryStore::new();
    let c1 = store
        .commit("Initial import")
        .author(sig("alice", 10))
        .file("README", "one\ntwo\nthree\n")
        .create()
        .unwrap();

    let result = blame_at(&store, c1, "README");
    assert_eq!(origins(&result), vec![c1; 3]);
}

#[test]
fn test_empty_file_has_no_lines() {
    let mut store = MemoryStore::new();
    let c1 = store.commit("empty").file("empty.txt", "").create().unwrap();

    let result = blame_at(&store, c1, "empty.txt");
    assert!(result.lines.is_empty());
    assert!(result.hunks().is_empty());
    assert!(result.primary_author().is_none());
}

#[test]
fn test_whole_file_replaced() {
    let mut store = MemoryStore::new();
    let c1 = store
        .commit("v1")
        .author(sig("alice", 10))
        .file("f", "a\nb\nc\n")
        .create()
        .unwrap();
    let c2 = store
        .commit("v2")
        .parent(c1)
        .author(sig("bob", 20))
        .file("f", "x\ny\nz\n")
        .create()
        .unwrap();

    let result = blame_at(&store, c2, "f");
    assert_eq!(origins(&result), vec![c2; 3]);
}

#[test]
fn test_file_untouched_since_introduction() {
    let license: String = (1..=22).map(|i| format!("license line {}\n", i)).collect();

    let mut store = MemoryStore::new();
    let mut tip = store
        .commit("Add LICENSE")
        .author(sig("alice", 100))
        .file("LICENSE", &license)
        .file("main.go", "package main\n")
        .create()
        .unwrap();
    let introduced = tip;
    for i in 0..5 {
        tip = store
            .commit(format!("Work {}", i))
            .parent(tip)
            .author(sig("bob", 200 + i))
            .file("main.go", format!("package main\n// step {}\n", i))
            .create()
            .unwrap();
    }

    let result = blame_at(&store, tip, "LICENSE");
    assert_eq!(result.lines.len(), 22);
    assert_eq!(origins(&result), vec![introduced; 22]);
    assert_eq!(result.hunks().len(), 1);
}

#[test]
fn test_file_added_at_revision() {
    let mut store = MemoryStore::new();
    let c1 = store
        .commit("Initial")
        .author(sig("alice", 10))
        .file("main.go", "package main\n")
        .create()
        .unwrap();
    let c2 = store
        .commit("Vendor foo")
        .parent(c1)
        .author(sig("bob", 20))
        .file("vendor/foo.go", "package foo\n\nfunc Foo() {}\n")
        .create()
        .unwrap();

    let result = blame_at(&store, c2, "vendor/foo.go");
    assert_eq!(origins(&result), vec![c2; 3]);
}

#[test]
fn test_insertion_in_the_middle() {
    let mut store = MemoryStore::new();
    let c1 = store
        .commit("base")
        .author(sig("alice", 10))
        .file("f", "fn a() {}\nfn b() {}\nfn c() {}\n")
        .create()
        .unwrap();
    let c2 = store
        .commit("insert")
        .parent(c1)
        .author(sig("bob", 20))
        .file("f", "fn a() {}\nfn b() {}\n// note\nfn inserted() {}\nfn c() {}\n")
        .create()
        .unwrap();

    let result = blame_at(&store, c2, "f");
    assert_eq!(origins(&result), vec![c1, c1, c2, c2, c1]);

    let hunks = result.hunks();
    assert_eq!(hunks.len(), 3);
    assert_eq!((hunks[1].start, hunks[1].len), (3, 2));
}

#[test]
fn test_line_moved_to_top_keeps_other_origins() {
    let mut store = MemoryStore::new();
    let c1 = store
        .commit("Skeleton")
        .author(sig("alice", 100))
        .file("main.rs", "}\n\n}\n\nfn main() {\n")
        .create()
        .unwrap();
    let c2 = store
        .commit("Move main up")
        .parent(c1)
        .author(sig("bob", 200))
        .file("main.rs", "fn main() {\n}\n\n}\n\n")
        .create()
        .unwrap();

    let result = blame_at(&store, c2, "main.rs");
    assert_eq!(origins(&result), vec![c2, c1, c1, c1, c1]);
}

#[test]
fn test_path_deleted_and_readded() {
    let mut store = MemoryStore::new();
    let c1 = store
        .commit("add")
        .author(sig("alice", 10))
        .file("f", "same\n")
        .create()
        .unwrap();
    let c2 = store
        .commit("delete")
        .parent(c1)
        .author(sig("bob", 20))
        .remove("f")
        .create()
        .unwrap();
    let c3 = store
        .commit("restore")
        .parent(c2)
        .author(sig("carol", 30))
        .file("f", "same\n")
        .create()
        .unwrap();

    // The file did not exist at c3's parent, so c3 introduced it.
    let result = blame_at(&store, c3, "f");
    assert_eq!(origins(&result), vec![c3]);
}

/// base has "shared"; both branches keep it, each adds a line.
fn merge_history(store: &mut MemoryStore) -> (ObjectId, ObjectId, ObjectId, ObjectId) {
    let base = store
        .commit("base")
        .author(sig("alice", 10))
        .file("f", "shared\n")
        .create()
        .unwrap();
    let left = store
        .commit("left")
        .parent(base)
        .author(sig("bob", 20))
        .file("f", "shared\nleft\n")
        .create()
        .unwrap();
    let right = store
        .commit("right")
        .parent(base)
        .author(sig("carol", 30))
        .file("f", "shared\nright\n")
        .create()
        .unwrap();
    let merge = store
        .commit("merge")
        .parent(left)
        .parent(right)
        .author(sig("dave", 40))
        .file("f", "shared\nleft\nright\n")
        .create()
        .unwrap();
    (base, left, right, merge)
}

#[test]
fn test_merge_attributes_branch_lines() {
    let mut store = MemoryStore::new();
    let (base, left, right, merge) = merge_history(&mut store);

    for strategy in [MergeStrategy::Priority, MergeStrategy::FirstParent] {
        let commit = store.resolve_commit(&merge).unwrap();
        let options = BlameOptions::default().with_merge_strategy(strategy);
        let result = blame_with(&store, &commit, "f", &options).unwrap();
        assert_eq!(origins(&result), vec![base, left, right]);
    }
}

#[test]
fn test_merge_line_goes_to_first_parent_holding_it() {
    // Both branches add the same line independently; it is credited to
    // whichever parent is offered it first.
    let mut store = MemoryStore::new();
    let base = store
        .commit("base")
        .author(sig("alice", 10))
        .file("f", "a\n")
        .create()
        .unwrap();
    let older = store
        .commit("older branch")
        .parent(base)
        .author(sig("bob", 20))
        .file("f", "a\ndup\n")
        .create()
        .unwrap();
    let newer = store
        .commit("newer branch")
        .parent(base)
        .author(sig("carol", 30))
        .file("f", "a\ndup\n")
        .create()
        .unwrap();
    let merge = store
        .commit("merge")
        .parent(older)
        .parent(newer)
        .author(sig("dave", 40))
        .file("f", "a\ndup\n")
        .create()
        .unwrap();
    let commit = store.resolve_commit(&merge).unwrap();

    let priority = blame(&store, &commit, "f").unwrap();
    assert_eq!(origins(&priority), vec![base, newer]);

    let options = BlameOptions::default().with_merge_strategy(MergeStrategy::FirstParent);
    let first_parent = blame_with(&store, &commit, "f", &options).unwrap();
    assert_eq!(origins(&first_parent), vec![base, older]);
}

#[test]
fn test_missing_path_at_start() {
    let mut store = MemoryStore::new();
    let [_, _, c3] = linear_history(&mut store);
    let commit = store.resolve_commit(&c3).unwrap();

    let err = blame(&store, &commit, "nope.txt").unwrap_err();
    assert!(matches!(err, Error::PathNotFound { ref path, commit } if path == "nope.txt" && commit == c3));
}

#[test]
fn test_dangling_parent_fails() {
    let ghost = ObjectId::from_content(b"gone");
    let tip = Commit {
        id: ObjectId::from_content(b"tip"),
        parents: vec![ghost],
        author: sig("alice", 10),
        committer: sig("alice", 10),
        message: "shallow".to_string(),
    };
    let mut snapshot = BTreeMap::new();
    snapshot.insert("f".to_string(), b"a\n".to_vec());

    let mut store = MemoryStore::new();
    store.insert_raw(tip.clone(), snapshot);

    let err = blame(&store, &tip, "f").unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(id) if id == ghost));
}

#[test]
fn test_abort_stops_blame() {
    let mut store = MemoryStore::new();
    let [_, _, c3] = linear_history(&mut store);
    let commit = store.resolve_commit(&c3).unwrap();

    let handle = AbortHandle::new();
    let options = BlameOptions::default().with_abort(handle.clone());
    assert!(blame_with(&store, &commit, "hello.txt", &options).is_ok());

    handle.abort();
    let err = blame_with(&store, &commit, "hello.txt", &options).unwrap_err();
    assert!(matches!(err, Error::Aborted));
}

#[test]
fn test_cached_store_gives_same_result() {
    let mut store = MemoryStore::new();
    let [_, _, c3] = linear_history(&mut store);
    let expected = blame_at(&store, c3, "hello.txt");

    let cached = CachedStore::new(&store);
    let commit = cached.resolve_commit(&c3).unwrap();
    assert_eq!(blame(&cached, &commit, "hello.txt").unwrap(), expected);
    assert!(!cached.is_empty());
    assert_eq!(blame(&cached, &commit, "hello.txt").unwrap(), expected);
}

#[test]
fn test_binary_content_policies() {
    let blob = [0x89u8, b'P', b'N', b'G', 0x00, b'\n', 0x01, 0x02];

    let mut lossy = MemoryStore::new();
    let id = lossy
        .commit("image")
        .author(sig("alice", 10))
        .file("logo.png", blob)
        .create()
        .unwrap();
    let result = blame_at(&lossy, id, "logo.png");
    assert_eq!(origins(&result), vec![id; 2]);

    let mut strict = MemoryStore::new().with_binary_policy(BinaryPolicy::Reject);
    let id = strict.commit("image").file("logo.png", blob).create().unwrap();
    let commit = strict.resolve_commit(&id).unwrap();
    let err = blame(&strict, &commit, "logo.png").unwrap_err();
    assert!(matches!(err, Error::MalformedContent(_)));
}

#[test]
fn test_primary_author_and_shares() {
    let mut store = MemoryStore::new();
    let [_, _, c3] = linear_history(&mut store);
    let result = blame_at(&store, c3, "hello.txt");

    // one line each; carol's line comes first in the file
    assert_eq!(result.primary_author().unwrap().author_name, "carol");
    let shares = result.authors();
    assert_eq!(shares.len(), 3);
    assert!(shares.iter().all(|s| s.lines == 1));
    assert_eq!(shares[0].name, "alice");
}

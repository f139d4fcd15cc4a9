//! # Tree Property Tests
//!
//! Structural invariants under bulk load: whatever order keys arrive in, a
//! scan yields them ascending, the separator keys match their subtree
//! maxima, parent pointers are consistent, and the leaf chain covers every
//! leaf exactly once. `BTree::check_integrity` asserts all of that; these
//! tests drive it through workloads large enough to force leaf splits, root
//! splits, and internal splits at several depths.

use tempfile::tempdir;

use adabase::btree::InsertOutcome;
use adabase::database::Database;
use adabase::record::Row;

fn row(key: u32) -> Row {
    Row::new(key, format!("user{}", key), format!("u{}@x", key))
}

fn scan_ids(db: &mut Database) -> Vec<u32> {
    let mut tree = db.tree();
    let mut cursor = tree.start().unwrap();
    let mut ids = Vec::new();
    while !cursor.end_of_table {
        ids.push(cursor.row(&mut tree).unwrap().id);
        cursor.advance(&mut tree).unwrap();
    }
    ids
}

/// Deterministic permutation of 1..=n (multiplier coprime to n + 1 when
/// n + 1 is prime).
fn permuted(n: u32, multiplier: u32) -> Vec<u32> {
    (1..=n).map(|i| (i as u64 * multiplier as u64 % (n as u64 + 1)) as u32).collect()
}

#[test]
fn ascending_bulk_load_stays_consistent() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path().join("test.db")).unwrap();

    let mut tree = db.tree();
    for key in 1..=500u32 {
        assert_eq!(tree.insert(&row(key)).unwrap(), InsertOutcome::Inserted);
    }
    tree.check_integrity().unwrap();

    assert_eq!(scan_ids(&mut db), (1..=500).collect::<Vec<u32>>());
}

#[test]
fn descending_bulk_load_stays_consistent() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path().join("test.db")).unwrap();

    let mut tree = db.tree();
    for key in (1..=500u32).rev() {
        assert_eq!(tree.insert(&row(key)).unwrap(), InsertOutcome::Inserted);
    }
    tree.check_integrity().unwrap();

    assert_eq!(scan_ids(&mut db), (1..=500).collect::<Vec<u32>>());
}

#[test]
fn shuffled_bulk_load_stays_consistent() {
    // 1009 is prime, so both multipliers generate permutations of 1..=1008
    for multiplier in [541u32, 877] {
        let dir = tempdir().unwrap();
        let mut db = Database::open(dir.path().join("test.db")).unwrap();

        let keys = permuted(1008, multiplier);
        let mut tree = db.tree();
        for &key in &keys {
            assert_eq!(tree.insert(&row(key)).unwrap(), InsertOutcome::Inserted);
        }
        tree.check_integrity().unwrap();

        assert_eq!(scan_ids(&mut db), (1..=1008).collect::<Vec<u32>>());
    }
}

#[test]
fn integrity_holds_after_every_single_insert() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path().join("test.db")).unwrap();

    let keys = permuted(210, 101);
    for &key in &keys {
        let mut tree = db.tree();
        tree.insert(&row(key)).unwrap();
        tree.check_integrity().unwrap();
    }
}

#[test]
fn duplicates_are_rejected_at_every_depth() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path().join("test.db")).unwrap();

    let mut tree = db.tree();
    for key in 1..=300u32 {
        tree.insert(&row(key)).unwrap();
    }
    for key in [1u32, 150, 300, 77] {
        assert_eq!(
            tree.insert(&row(key)).unwrap(),
            InsertOutcome::DuplicateKey
        );
    }
    tree.check_integrity().unwrap();

    assert_eq!(scan_ids(&mut db).len(), 300);
}

#[test]
fn persistence_survives_interleaved_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    // three batches with a close + reopen between each
    for batch in 0..3u32 {
        let mut db = Database::open(&path).unwrap();
        let mut tree = db.tree();
        for i in 1..=60u32 {
            let key = batch * 60 + i;
            assert_eq!(tree.insert(&row(key)).unwrap(), InsertOutcome::Inserted);
        }
        tree.check_integrity().unwrap();
        db.close().unwrap();
    }

    let mut db = Database::open(&path).unwrap();
    db.tree().check_integrity().unwrap();
    assert_eq!(scan_ids(&mut db), (1..=180).collect::<Vec<u32>>());
}

#[test]
fn close_and_reopen_renders_identically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let before = {
        let mut db = Database::open(&path).unwrap();
        let mut tree = db.tree();
        for &key in &permuted(96, 29) {
            tree.insert(&row(key)).unwrap();
        }
        let rendering = db.render_tree().unwrap();
        db.close().unwrap();
        rendering
    };

    let mut db = Database::open(&path).unwrap();
    assert_eq!(db.render_tree().unwrap(), before);
}

#[test]
fn find_lands_on_every_present_key() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(dir.path().join("test.db")).unwrap();

    let mut tree = db.tree();
    for key in (2..=400u32).step_by(2) {
        tree.insert(&row(key)).unwrap();
    }

    for key in (2..=400u32).step_by(2) {
        let cursor = tree.find(key).unwrap();
        let found = cursor.row(&mut tree).unwrap();
        assert_eq!(found.id, key);
    }

    // absent keys position the cursor at the next larger key
    let cursor = tree.find(3).unwrap();
    assert_eq!(cursor.row(&mut tree).unwrap().id, 4);
}

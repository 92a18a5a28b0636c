mod common;

use common::{p, synthetic, Fixture};
use searchcore::persist::load_index_descriptor;
use searchcore::{CachedArtifactStore, DirRemote, IndexStore, PostingEntry};
use std::sync::Arc;
use tempfile::tempdir;

fn open(f: &Fixture) -> (IndexStore, Arc<CachedArtifactStore>) {
    let store = Arc::new(CachedArtifactStore::new(Box::new(DirRemote::new(f.remote_dir())), Some(f.cache_dir().as_path())));
    let index = IndexStore::new(load_index_descriptor(&f.paths()).unwrap(), store.clone());
    (index, store)
}

#[test]
fn postings_round_trip_across_blocks() {
    let dir = tempdir().unwrap();
    let long: Vec<PostingEntry> = (0..25).map(|d| p(d * 3, 1 + d % 4)).collect();
    let f = Fixture::new(dir.path())
        .term("short", vec![p(1, 1)])
        .term("long", long.clone())
        .write();
    let (index, _) = open(&f);

    let desc = load_index_descriptor(&f.paths()).unwrap();
    // 150 bytes starting 6 bytes into a 12-byte block
    assert_eq!(desc.terms["long"].location.len(), 13);
    assert_eq!(index.postings_for("long").unwrap(), long);
    assert_eq!(index.postings_for("short").unwrap(), vec![p(1, 1)]);
}

#[test]
fn entries_straddling_blocks_decode() {
    let dir = tempdir().unwrap();
    let mut f = Fixture::new(dir.path());
    f.block_size = 10;
    let entries = vec![p(100, 2), p(200, 3), p(300, 4)];
    let f = f.term("odd", entries.clone()).write();
    let (index, _) = open(&f);
    assert_eq!(index.postings_for("odd").unwrap(), entries);
}

#[test]
fn df_matches_decoded_length_for_every_term() {
    let dir = tempdir().unwrap();
    let f = synthetic(dir.path(), 120, 9);
    let (index, _) = open(&f);
    let desc = load_index_descriptor(&f.paths()).unwrap();
    assert_eq!(index.vocabulary_size(), 9);
    for term in desc.terms.keys() {
        assert_eq!(index.postings_for(term).unwrap().len(), index.document_frequency(term) as usize);
    }
}

#[test]
fn absent_terms_are_empty_and_zero() {
    let dir = tempdir().unwrap();
    let f = Fixture::new(dir.path()).term("present", vec![p(1, 1)]).write();
    let (index, store) = open(&f);
    for term in ["absent", "", "Present"] {
        assert!(index.postings_for(term).unwrap().is_empty());
        assert_eq!(index.document_frequency(term), 0);
        assert!(!index.contains(term));
    }
    assert_eq!(store.stats().remote_fetches, 0);
}

#[test]
fn repeated_reads_hit_the_cache() {
    let dir = tempdir().unwrap();
    let f = Fixture::new(dir.path()).term("t", vec![p(1, 1), p(2, 2), p(3, 3)]).write();
    let (index, store) = open(&f);
    let first = index.postings_for("t").unwrap();
    let fetched = store.stats().remote_fetches;
    assert_eq!(fetched, 2);
    for _ in 0..5 {
        assert_eq!(index.postings_for("t").unwrap(), first);
    }
    assert_eq!(store.stats().remote_fetches, fetched);

    // the write-through copy serves a fresh store even with the remote gone
    std::fs::remove_dir_all(f.remote_dir()).unwrap();
    let (index, store) = open(&f);
    assert_eq!(index.postings_for("t").unwrap(), first);
    assert_eq!(store.stats().remote_fetches, 0);
    assert_eq!(store.stats().disk_hits, 2);
}

mod common;

use common::pets;
use searchcore::{ArtifactConfig, Error, RankingConfig, SearchEngine};
use tempfile::tempdir;

#[test]
fn search_returns_titles_best_first() {
    let dir = tempdir().unwrap();
    let f = pets(dir.path());
    let cfg = ArtifactConfig::local(f.cache_dir(), f.remote_dir());
    let engine = SearchEngine::open(&cfg, RankingConfig { use_pagerank: false, ..Default::default() }).unwrap();

    let hits = engine.search("The CAT");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].doc_id, 1);
    assert_eq!(hits[0].title, "Cats of the world");
    assert_eq!(hits[1].title, "Cats and dogs");
    assert!(hits[0].score > hits[1].score);
}

#[test]
fn stop_words_only_query_is_empty() {
    let dir = tempdir().unwrap();
    let f = pets(dir.path());
    let cfg = ArtifactConfig::local(f.cache_dir(), f.remote_dir());
    let engine = SearchEngine::open(&cfg, RankingConfig::default()).unwrap();
    assert!(engine.search("the and of").is_empty());
    assert!(engine.search("").is_empty());
}

#[test]
fn respects_configured_max_results() {
    let dir = tempdir().unwrap();
    let f = pets(dir.path());
    let cfg = ArtifactConfig::local(f.cache_dir(), f.remote_dir());
    let engine = SearchEngine::open(&cfg, RankingConfig { max_results: 1, ..Default::default() }).unwrap();
    assert_eq!(engine.search("cat dog").len(), 1);
}

#[test]
fn missing_metadata_refuses_to_start() {
    let dir = tempdir().unwrap();
    let f = pets(dir.path());
    std::fs::remove_file(f.paths().titles()).unwrap();
    let cfg = ArtifactConfig::local(f.cache_dir(), f.remote_dir());
    let err = SearchEngine::open(&cfg, RankingConfig::default()).err().unwrap();
    assert!(matches!(err, Error::MetadataLoad { .. }));
}

#[test]
fn missing_source_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let f = pets(dir.path());
    let mut cfg = ArtifactConfig::local(f.cache_dir(), f.remote_dir());
    cfg.block_dir = None;
    let err = SearchEngine::open(&cfg, RankingConfig::default()).err().unwrap();
    assert!(matches!(err, Error::Configuration(_)));
}

#![allow(dead_code)]

use searchcore::persist::{save_corpus_stats, save_doc_len, save_index_descriptor, save_pagerank, save_titles, CachePaths};
use searchcore::writer::BlockWriter;
use searchcore::{CorpusStats, DocId, IndexDescriptor, PostingEntry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub fn p(doc_id: DocId, tf: u32) -> PostingEntry {
    PostingEntry { doc_id, tf }
}

pub fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// A corpus on disk: blocks under `{root}/remote`, descriptor and metadata
/// under `{root}/cache`.
pub struct Fixture {
    pub root: PathBuf,
    pub postings: Vec<(String, Vec<PostingEntry>)>,
    pub doc_len: HashMap<DocId, u32>,
    pub titles: HashMap<DocId, String>,
    pub pagerank: HashMap<DocId, f64>,
    pub stats: Option<CorpusStats>,
    pub block_size: u64,
}

impl Fixture {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            postings: Vec::new(),
            doc_len: HashMap::new(),
            titles: HashMap::new(),
            pagerank: HashMap::new(),
            stats: None,
            block_size: 12,
        }
    }

    pub fn remote_dir(&self) -> PathBuf { self.root.join("remote") }

    pub fn cache_dir(&self) -> PathBuf { self.root.join("cache") }

    pub fn paths(&self) -> CachePaths { CachePaths::new(self.cache_dir()) }

    pub fn term(mut self, term: &str, entries: Vec<PostingEntry>) -> Self {
        self.postings.push((term.to_string(), entries));
        self
    }

    pub fn doc(mut self, doc_id: DocId, len: u32, title: &str) -> Self {
        self.doc_len.insert(doc_id, len);
        self.titles.insert(doc_id, title.to_string());
        self
    }

    pub fn pagerank(mut self, doc_id: DocId, pr: f64) -> Self {
        self.pagerank.insert(doc_id, pr);
        self
    }

    pub fn stats(mut self, document_count: u64, avgdl: f64) -> Self {
        self.stats = Some(CorpusStats { document_count, avgdl });
        self
    }

    pub fn write(self) -> Self {
        let mut writer = BlockWriter::new(self.remote_dir(), "postings", self.block_size).unwrap();
        let mut desc = IndexDescriptor::new();
        for (term, entries) in &self.postings {
            writer.add_term(&mut desc, term, entries).unwrap();
        }
        writer.finish().unwrap();

        let paths = self.paths();
        save_index_descriptor(&paths, &desc).unwrap();
        save_titles(&paths, &self.titles).unwrap();
        save_doc_len(&paths, &self.doc_len).unwrap();
        save_pagerank(&paths, &self.pagerank).unwrap();
        if let Some(stats) = &self.stats {
            save_corpus_stats(&paths, stats).unwrap();
        }
        self
    }
}

/// N=3, avgdl=10: "cat" -> [(1,2), (2,1)], "dog" -> [(2,3), (3,1)].
pub fn pets(root: &Path) -> Fixture {
    Fixture::new(root)
        .doc(1, 8, "Cats of the world")
        .doc(2, 12, "Cats and dogs")
        .doc(3, 10, "Dog training")
        .stats(3, 10.0)
        .term("cat", vec![p(1, 2), p(2, 1)])
        .term("dog", vec![p(2, 3), p(3, 1)])
        .write()
}

/// Deterministic pseudo-random corpus large enough to exercise the pool.
pub fn synthetic(root: &Path, docs: u32, vocab: usize) -> Fixture {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut f = Fixture::new(root);
    f.block_size = 600;
    for d in 0..docs {
        let len = 5 + (next() % 200) as u32;
        f = f.doc(d, len, &format!("Document {d}")).pagerank(d, (next() % 1000) as f64 / 1000.0);
    }
    for t in 0..vocab {
        let mut entries = Vec::new();
        for d in 0..docs {
            if next() % 3 == 0 {
                entries.push(p(d, 1 + (next() % 9) as u32));
            }
        }
        f = f.term(&format!("term{t}"), entries);
    }
    f.write()
}

use crate::index::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Returned by [`MetadataStore::length`] for documents without a recorded
/// length. Such documents cannot be length-normalized and are not scored.
pub const UNKNOWN_LENGTH: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    #[serde(rename = "N")]
    pub document_count: u64,
    pub avgdl: f64,
}

impl CorpusStats {
    /// Derive N and avgdl from a length table.
    pub fn from_lengths(doc_len: &HashMap<DocId, u32>) -> Self {
        let n = doc_len.len() as u64;
        let total: u64 = doc_len.values().map(|&l| l as u64).sum();
        let avgdl = if n > 0 { total as f64 / n as f64 } else { 0.0 };
        Self { document_count: n, avgdl }
    }
}

/// Corpus-wide and per-document tables, fully in memory and read-only after
/// construction.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    stats: CorpusStats,
    doc_len: HashMap<DocId, u32>,
    titles: HashMap<DocId, String>,
    pagerank: HashMap<DocId, f64>,
    pageviews: HashMap<DocId, u64>,
}

impl MetadataStore {
    /// `stats` falls back to values derived from `doc_len` when absent.
    pub fn new(
        doc_len: HashMap<DocId, u32>,
        titles: HashMap<DocId, String>,
        pagerank: HashMap<DocId, f64>,
        pageviews: HashMap<DocId, u64>,
        stats: Option<CorpusStats>,
    ) -> Self {
        let stats = stats.unwrap_or_else(|| CorpusStats::from_lengths(&doc_len));
        Self { stats, doc_len, titles, pagerank, pageviews }
    }

    pub fn corpus_stats(&self) -> CorpusStats { self.stats }

    pub fn document_count(&self) -> u64 { self.stats.document_count }

    pub fn length(&self, doc_id: DocId) -> u32 {
        self.doc_len.get(&doc_id).copied().unwrap_or(UNKNOWN_LENGTH)
    }

    pub fn title(&self, doc_id: DocId) -> &str {
        self.titles.get(&doc_id).map_or("", String::as_str)
    }

    pub fn pagerank(&self, doc_id: DocId) -> f64 {
        self.pagerank.get(&doc_id).copied().unwrap_or(0.0)
    }

    pub fn pageviews(&self, doc_id: DocId) -> u64 {
        self.pageviews.get(&doc_id).copied().unwrap_or(0)
    }
}

//! BM25 ranking over lazily fetched posting lists.
//!
//! Each distinct query term is one unit of work: fetch its postings, then
//! compute its per-document BM25 contribution. Units run either inline or on
//! a bounded rayon pool, and their partial results are always merged on the
//! calling thread in query-term order. Floating-point sums therefore happen
//! in the same order whatever the worker count, so sequential and parallel
//! runs return bit-identical rankings.

use crate::blend::BlendPolicy;
use crate::config::RankingConfig;
use crate::error::{Error, Result};
use crate::index::{DocId, IndexStore};
use crate::metadata::{CorpusStats, MetadataStore, UNKNOWN_LENGTH};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub doc_id: DocId,
    pub score: f64,
}

/// `ln(1 + (N - df + 0.5) / (df + 0.5))`. Positive while df <= N; goes
/// negative once df exceeds N + 0.5 (stale corpus stats).
pub fn idf(doc_count: u64, df: u32) -> f64 {
    let (n, df) = (doc_count as f64, df as f64);
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

/// Per-term BM25 weight with the idf folded in.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Weight {
    idf: f64,
    k1: f64,
    b: f64,
    avgdl: f64,
}

impl Bm25Weight {
    pub fn new(idf: f64, k1: f64, b: f64, avgdl: f64) -> Self {
        Self { idf, k1, b, avgdl }
    }

    #[inline]
    pub fn score(&self, len: u32, tf: u32) -> f64 {
        let tf = tf as f64;
        let norm = if self.avgdl > 0.0 {
            1.0 - self.b + self.b * len as f64 / self.avgdl
        } else {
            1.0
        };
        let denom = tf + self.k1 * norm;
        let denom = if denom != 0.0 { denom } else { 1.0 };
        self.idf * (tf * (self.k1 + 1.0)) / denom
    }
}

/// One term's contributions, in posting-list order.
type TermScores = Vec<(DocId, f64)>;

pub struct Ranker {
    index: Arc<IndexStore>,
    meta: Arc<MetadataStore>,
    k1: f64,
    b: f64,
    blend: Box<dyn BlendPolicy>,
    pool: rayon::ThreadPool,
}

impl Ranker {
    pub fn new(index: Arc<IndexStore>, meta: Arc<MetadataStore>, cfg: &RankingConfig) -> Result<Self> {
        cfg.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(cfg.max_workers)
            .thread_name(|i| format!("bm25-term-{i}"))
            .build()
            .map_err(|e| Error::Configuration(format!("worker pool: {e}")))?;
        Ok(Self { index, meta, k1: cfg.k1, b: cfg.b, blend: cfg.blend.policy(), pool })
    }

    /// Swap in a different PageRank blend.
    pub fn with_blend(mut self, policy: Box<dyn BlendPolicy>) -> Self {
        self.blend = policy;
        self
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Top `max_results` documents for `query_terms`, best first, ties by
    /// ascending doc id. Terms that cannot be read are logged and skipped.
    pub fn rank(
        &self,
        query_terms: &[String],
        max_results: usize,
        use_pagerank: bool,
        alpha: f64,
        parallel: bool,
    ) -> Vec<ScoredResult> {
        if max_results == 0 {
            return Vec::new();
        }
        let mut ranked = self.rank_all(query_terms, use_pagerank, alpha, parallel);
        ranked.truncate(max_results);
        ranked
    }

    /// Every matching document, fully sorted.
    pub fn rank_all(&self, query_terms: &[String], use_pagerank: bool, alpha: f64, parallel: bool) -> Vec<ScoredResult> {
        let terms = distinct(query_terms);
        if terms.is_empty() {
            return Vec::new();
        }
        let stats = self.meta.corpus_stats();
        let partials: Vec<TermScores> = if parallel && terms.len() > 1 {
            self.pool.install(|| terms.par_iter().map(|t| self.score_term(t, stats)).collect())
        } else {
            terms.iter().map(|t| self.score_term(t, stats)).collect()
        };

        let mut totals: HashMap<DocId, f64> = HashMap::new();
        for partial in partials {
            for (doc_id, s) in partial {
                *totals.entry(doc_id).or_insert(0.0) += s;
            }
        }

        let mut ranked: Vec<ScoredResult> =
            totals.into_iter().map(|(doc_id, score)| ScoredResult { doc_id, score }).collect();
        if use_pagerank {
            self.blend.blend(&mut ranked, &self.meta, alpha);
        }
        sort_ranked(&mut ranked);
        ranked
    }

    fn score_term(&self, term: &str, stats: CorpusStats) -> TermScores {
        let df = self.index.document_frequency(term);
        if df == 0 {
            return Vec::new();
        }
        let start = Instant::now();
        let postings = match self.index.postings_for(term) {
            Ok(p) => p,
            Err(e) => {
                warn!(term, error = %e, "skipping term");
                return Vec::new();
            }
        };
        let weight = Bm25Weight::new(idf(stats.document_count, df), self.k1, self.b, stats.avgdl);
        let scores: TermScores = postings
            .iter()
            .filter_map(|p| {
                let len = self.meta.length(p.doc_id);
                (len != UNKNOWN_LENGTH).then(|| (p.doc_id, weight.score(len, p.tf)))
            })
            .collect();
        debug!(term, df, scored = scores.len(), elapsed = ?start.elapsed(), "scored term");
        scores
    }
}

/// First occurrence of each term, in query order.
fn distinct(terms: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    terms.iter().map(String::as_str).filter(|t| seen.insert(*t)).collect()
}

/// Descending score, ascending doc id on ties.
pub fn sort_ranked(results: &mut [ScoredResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
}

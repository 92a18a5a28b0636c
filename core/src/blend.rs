//! Combining BM25 totals with the static PageRank signal.

use crate::metadata::MetadataStore;
use crate::ranking::ScoredResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub trait BlendPolicy: Send + Sync {
    /// Rewrite each candidate's score in place.
    fn blend(&self, candidates: &mut [ScoredResult], meta: &MetadataStore, alpha: f64);
}

/// `bm25 + alpha * pagerank`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Additive;

impl BlendPolicy for Additive {
    fn blend(&self, candidates: &mut [ScoredResult], meta: &MetadataStore, alpha: f64) {
        for c in candidates {
            c.score += alpha * meta.pagerank(c.doc_id);
        }
    }
}

/// Both signals min-max scaled to `[0, 1]` over the candidate set, then
/// `(1 - alpha) * bm25 + alpha * pagerank`. A constant signal scales to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxNormalized;

struct Range {
    lo: f64,
    hi: f64,
}

impl Range {
    fn of(values: &[f64]) -> Self {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self { lo, hi }
    }

    fn scale(&self, v: f64) -> f64 {
        if self.hi > self.lo { (v - self.lo) / (self.hi - self.lo) } else { 0.0 }
    }
}

impl BlendPolicy for MinMaxNormalized {
    fn blend(&self, candidates: &mut [ScoredResult], meta: &MetadataStore, alpha: f64) {
        if candidates.is_empty() {
            return;
        }
        let bm25: Vec<f64> = candidates.iter().map(|c| c.score).collect();
        let pr: Vec<f64> = candidates.iter().map(|c| meta.pagerank(c.doc_id)).collect();
        let (bm25_range, pr_range) = (Range::of(&bm25), Range::of(&pr));
        for (c, (bm, pr)) in candidates.iter_mut().zip(bm25.into_iter().zip(pr)) {
            c.score = (1.0 - alpha) * bm25_range.scale(bm) + alpha * pr_range.scale(pr);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendKind {
    #[default]
    Additive,
    MinMax,
}

impl BlendKind {
    pub fn policy(self) -> Box<dyn BlendPolicy> {
        match self {
            BlendKind::Additive => Box::new(Additive),
            BlendKind::MinMax => Box::new(MinMaxNormalized),
        }
    }
}

impl FromStr for BlendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "additive" => Ok(BlendKind::Additive),
            "min_max" | "min-max" | "minmax" => Ok(BlendKind::MinMax),
            other => Err(format!("unknown blend policy {other:?}")),
        }
    }
}

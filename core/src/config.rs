use crate::blend::BlendKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scoring knobs. Defaults are the values the engine was tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub k1: f64,
    pub b: f64,
    /// PageRank blend weight.
    pub alpha: f64,
    pub max_results: usize,
    pub use_pagerank: bool,
    pub parallel: bool,
    pub max_workers: usize,
    pub blend: BlendKind,
    /// Stem query terms; must match how the index was built.
    pub stem: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            alpha: 0.15,
            max_results: 100,
            use_pagerank: true,
            parallel: true,
            max_workers: 5,
            blend: BlendKind::Additive,
            stem: false,
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k1.is_nan() || self.k1 < 0.0 {
            return Err(Error::Configuration(format!("k1 must be >= 0, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::Configuration(format!("b must be in [0, 1], got {}", self.b)));
        }
        if self.alpha.is_nan() || self.alpha < 0.0 {
            return Err(Error::Configuration(format!("alpha must be >= 0, got {}", self.alpha)));
        }
        if self.max_workers == 0 {
            return Err(Error::Configuration("max_workers must be at least 1".into()));
        }
        Ok(())
    }
}

/// Where the index artifacts live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Local cache holding `postings_cache/`, `meta_cache/` and fetched blocks.
    pub cache_dir: PathBuf,
    pub bucket: Option<String>,
    #[serde(default = "default_postings_prefix")]
    pub postings_prefix: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Read blocks from this directory instead of the object store.
    #[serde(default)]
    pub block_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_postings_prefix() -> String { "postings_gcp".into() }
fn default_endpoint() -> String { "https://storage.googleapis.com".into() }
fn default_timeout_secs() -> u64 { 10 }

impl ArtifactConfig {
    pub fn local<P: Into<PathBuf>>(cache_dir: P, block_dir: P) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            bucket: None,
            postings_prefix: default_postings_prefix(),
            endpoint: default_endpoint(),
            block_dir: Some(block_dir.into()),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(Error::Configuration("cache_dir is empty".into()));
        }
        let has_bucket = self.bucket.as_deref().is_some_and(|b| !b.trim().is_empty());
        if self.block_dir.is_none() && !has_bucket {
            return Err(Error::Configuration("either a bucket or a block_dir is required".into()));
        }
        Ok(())
    }
}

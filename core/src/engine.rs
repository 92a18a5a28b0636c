use crate::artifact::{ArtifactStore, CachedArtifactStore};
use crate::config::{ArtifactConfig, RankingConfig};
use crate::error::Result;
use crate::index::{DocId, IndexStore};
use crate::metadata::MetadataStore;
use crate::persist::{load_index_descriptor, load_metadata, CachePaths};
use crate::ranking::Ranker;
use crate::tokenizer::tokenize_with;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub score: f64,
}

/// Everything a process needs to answer queries. Built once at startup; all
/// tables are read-only afterwards and shared across concurrent queries.
pub struct SearchEngine {
    meta: Arc<MetadataStore>,
    ranker: Ranker,
    config: RankingConfig,
}

impl SearchEngine {
    /// Load the index descriptor and metadata from the cache directory and
    /// wire block reads through a cached artifact store. Any failure here is
    /// fatal for the instance.
    pub fn open(artifacts: &ArtifactConfig, config: RankingConfig) -> Result<Self> {
        let store = Arc::new(CachedArtifactStore::from_config(artifacts)?);
        Self::open_with_store(&CachePaths::new(&artifacts.cache_dir), store, config)
    }

    pub fn open_with_store(paths: &CachePaths, store: Arc<dyn ArtifactStore>, config: RankingConfig) -> Result<Self> {
        let start = Instant::now();
        let descriptor = load_index_descriptor(paths)?;
        let meta = Arc::new(load_metadata(paths)?);
        let index = Arc::new(IndexStore::new(descriptor, store));
        let engine = Self::from_parts(index, meta, config)?;
        info!(elapsed = ?start.elapsed(), workers = engine.ranker.workers(), "engine ready");
        Ok(engine)
    }

    fn from_parts(index: Arc<IndexStore>, meta: Arc<MetadataStore>, config: RankingConfig) -> Result<Self> {
        let ranker = Ranker::new(index, meta.clone(), &config)?;
        Ok(Self { meta, ranker, config })
    }

    pub fn ranker(&self) -> &Ranker { &self.ranker }

    /// Tokenize `query`, rank with the configured defaults and attach titles.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let start = Instant::now();
        let terms = tokenize_with(query, self.config.stem);
        if terms.is_empty() {
            return Vec::new();
        }
        let c = &self.config;
        let ranked = self.ranker.rank(&terms, c.max_results, c.use_pagerank, c.alpha, c.parallel);
        let hits: Vec<SearchHit> = ranked
            .into_iter()
            .map(|r| SearchHit { doc_id: r.doc_id, title: self.meta.title(r.doc_id).to_string(), score: r.score })
            .collect();
        debug!(query, terms = terms.len(), hits = hits.len(), elapsed = ?start.elapsed(), "search");
        hits
    }
}

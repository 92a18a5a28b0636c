use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use searchcore::{ArtifactConfig, BlendKind, RankingConfig, SearchEngine, SearchHit};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "bm25-search")]
#[command(about = "Rank documents for a query with BM25 and optional PageRank blending")]
pub struct Args {
    /// Query text; tokenized the same way the index was built
    #[arg(required = true)]
    pub query: Vec<String>,
    /// Local artifact cache (postings_cache/, meta_cache/, fetched blocks)
    #[arg(long, env = "CACHE_DIR")]
    pub cache_dir: PathBuf,
    /// Object-store bucket holding posting blocks
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket: Option<String>,
    #[arg(long, env = "POSTINGS_PREFIX", default_value = "postings_gcp")]
    pub postings_prefix: String,
    #[arg(long, env = "STORAGE_ENDPOINT", default_value = "https://storage.googleapis.com")]
    pub endpoint: String,
    /// Read posting blocks from a directory instead of the bucket
    #[arg(long, env = "BLOCK_DIR")]
    pub block_dir: Option<PathBuf>,
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
    #[arg(long, env = "BM25_K1", default_value_t = 1.2)]
    pub k1: f64,
    #[arg(long, env = "BM25_B", default_value_t = 0.75)]
    pub b: f64,
    /// PageRank blend weight
    #[arg(long, env = "PAGERANK_ALPHA", default_value_t = 0.15)]
    pub alpha: f64,
    /// `additive` or `min_max`
    #[arg(long, env = "BLEND", value_parser = BlendKind::from_str, default_value = "additive")]
    pub blend: BlendKind,
    /// Blend PageRank into the BM25 scores
    #[arg(long, env = "USE_PAGERANK", value_parser = BoolishValueParser::new(), action = ArgAction::Set, default_value_t = true)]
    pub pagerank: bool,
    /// Same as `--pagerank false`
    #[arg(long, default_value_t = false)]
    pub no_pagerank: bool,
    #[arg(long, short = 'k', env = "MAX_RESULTS", default_value_t = 100)]
    pub max_results: usize,
    /// Score terms on the worker pool
    #[arg(long, env = "PARALLEL_BM25", value_parser = BoolishValueParser::new(), action = ArgAction::Set, default_value_t = true)]
    pub parallel: bool,
    /// Same as `--parallel false`
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
    #[arg(long, env = "MAX_WORKERS", default_value_t = 5)]
    pub max_workers: usize,
    /// Stem query terms (only for indexes built with stemming)
    #[arg(long, env = "STEM_QUERY", value_parser = BoolishValueParser::new(), action = ArgAction::Set, default_value_t = false)]
    pub stem: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl Args {
    pub fn artifact_config(&self) -> ArtifactConfig {
        ArtifactConfig {
            cache_dir: self.cache_dir.clone(),
            bucket: self.bucket.clone(),
            postings_prefix: self.postings_prefix.clone(),
            endpoint: self.endpoint.clone(),
            block_dir: self.block_dir.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn ranking_config(&self) -> RankingConfig {
        RankingConfig {
            k1: self.k1,
            b: self.b,
            alpha: self.alpha,
            max_results: self.max_results,
            use_pagerank: self.pagerank && !self.no_pagerank,
            parallel: self.parallel && !self.sequential,
            max_workers: self.max_workers,
            blend: self.blend,
            stem: self.stem,
        }
    }

    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Serialize)]
pub struct SearchResponse<'a> {
    pub query: &'a str,
    pub took_s: f64,
    pub results: &'a [SearchHit],
}

/// Load the engine, failing fast on bad configuration or unreadable metadata.
pub fn build_engine(args: &Args) -> Result<SearchEngine> {
    let engine = SearchEngine::open(&args.artifact_config(), args.ranking_config())
        .with_context(|| format!("opening index at {}", args.cache_dir.display()))?;
    Ok(engine)
}

pub fn render(query: &str, hits: &[SearchHit], took_s: f64, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(&SearchResponse { query, took_s, results: hits })?),
        Format::Text => {
            let mut out = String::new();
            for (rank, hit) in hits.iter().enumerate() {
                writeln!(out, "{:>3}. {:>10} {:.4}  {}", rank + 1, hit.doc_id, hit.score, hit.title)?;
            }
            Ok(out)
        }
    }
}

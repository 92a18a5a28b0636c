use crate::error::{Error, Result};
use crate::index::{DocId, IndexDescriptor};
use crate::metadata::{CorpusStats, MetadataStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Layout of the local artifact cache.
///
/// ```text
/// {root}/postings_cache/index.bin
/// {root}/meta_cache/{titles,doc_len,pagerank,pageviews}.bin
/// {root}/meta_cache/corpus_stats.json
/// {root}/blocks/...            (ranges fetched at query time)
/// ```
pub struct CachePaths {
    pub root: PathBuf,
}

impl CachePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn postings_dir(&self) -> PathBuf { self.root.join("postings_cache") }
    fn meta_dir(&self) -> PathBuf { self.root.join("meta_cache") }
    pub fn index(&self) -> PathBuf { self.postings_dir().join("index.bin") }
    pub fn titles(&self) -> PathBuf { self.meta_dir().join("titles.bin") }
    pub fn doc_len(&self) -> PathBuf { self.meta_dir().join("doc_len.bin") }
    pub fn pagerank(&self) -> PathBuf { self.meta_dir().join("pagerank.bin") }
    pub fn pageviews(&self) -> PathBuf { self.meta_dir().join("pageviews.bin") }
    pub fn corpus_stats(&self) -> PathBuf { self.meta_dir().join("corpus_stats.json") }
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

fn load_required<T: DeserializeOwned>(table: &str, path: &Path) -> Result<T> {
    let buf = read_file(path).map_err(|e| Error::metadata(table, format!("{}: {e}", path.display())))?;
    bincode::deserialize(&buf).map_err(|e| Error::metadata(table, e))
}

/// `None` when the file does not exist; any other failure is fatal.
fn load_optional<T: DeserializeOwned>(table: &str, path: &Path) -> Result<Option<T>> {
    match read_file(path) {
        Ok(buf) => bincode::deserialize(&buf).map(Some).map_err(|e| Error::metadata(table, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::metadata(table, format!("{}: {e}", path.display()))),
    }
}

pub fn save_index_descriptor(paths: &CachePaths, desc: &IndexDescriptor) -> anyhow::Result<()> {
    write_bincode(&paths.index(), desc)
}

pub fn load_index_descriptor(paths: &CachePaths) -> Result<IndexDescriptor> {
    let desc: IndexDescriptor = load_required("index descriptor", &paths.index())?;
    info!(terms = desc.len(), "loaded index descriptor");
    Ok(desc)
}

pub fn save_titles(paths: &CachePaths, titles: &HashMap<DocId, String>) -> anyhow::Result<()> {
    write_bincode(&paths.titles(), titles)
}

pub fn save_doc_len(paths: &CachePaths, doc_len: &HashMap<DocId, u32>) -> anyhow::Result<()> {
    write_bincode(&paths.doc_len(), doc_len)
}

pub fn save_pagerank(paths: &CachePaths, pagerank: &HashMap<DocId, f64>) -> anyhow::Result<()> {
    write_bincode(&paths.pagerank(), pagerank)
}

pub fn save_pageviews(paths: &CachePaths, pageviews: &HashMap<DocId, u64>) -> anyhow::Result<()> {
    write_bincode(&paths.pageviews(), pageviews)
}

pub fn save_corpus_stats(paths: &CachePaths, stats: &CorpusStats) -> anyhow::Result<()> {
    let path = paths.corpus_stats();
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(stats)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

fn load_corpus_stats(paths: &CachePaths) -> Result<Option<CorpusStats>> {
    let path = paths.corpus_stats();
    match read_file(&path) {
        Ok(buf) => serde_json::from_slice(&buf).map(Some).map_err(|e| Error::metadata("corpus stats", e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::metadata("corpus stats", format!("{}: {e}", path.display()))),
    }
}

/// Load every metadata table. Titles and lengths are required; PageRank,
/// page views and corpus stats may be absent but must parse when present.
pub fn load_metadata(paths: &CachePaths) -> Result<MetadataStore> {
    let titles: HashMap<DocId, String> = load_required("titles", &paths.titles())?;
    let doc_len: HashMap<DocId, u32> = load_required("doc_len", &paths.doc_len())?;
    let pagerank: Option<HashMap<DocId, f64>> = load_optional("pagerank", &paths.pagerank())?;
    let pageviews: Option<HashMap<DocId, u64>> = load_optional("pageviews", &paths.pageviews())?;
    let stats = load_corpus_stats(paths)?;
    let meta = MetadataStore::new(
        doc_len,
        titles,
        pagerank.unwrap_or_default(),
        pageviews.unwrap_or_default(),
        stats,
    );
    let stats = meta.corpus_stats();
    info!(n = stats.document_count, avgdl = stats.avgdl, "loaded metadata");
    Ok(meta)
}

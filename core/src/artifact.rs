//! Byte-range access to posting blocks.
//!
//! [`CachedArtifactStore`] sits in front of a [`RemoteSource`] and keeps two
//! tiers: an in-process map of fetched ranges and a write-through directory
//! on local disk. Each `(block_id, offset, length)` key is fetched remotely at
//! most once per process; callers that arrive while a fetch is running wait
//! for it and receive the same bytes (or the same error).

use crate::config::ArtifactConfig;
use crate::error::{Error, Result};
use crate::index::Segment;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

pub type Bytes = Arc<[u8]>;

pub trait ArtifactStore: Send + Sync {
    fn fetch(&self, segment: &Segment) -> Result<Bytes>;
}

/// Where block bytes live when they are not cached locally.
pub trait RemoteSource: Send + Sync {
    fn read_range(&self, block_id: &str, offset: u64, length: u64) -> Result<Vec<u8>>;
}

fn unavailable(block_id: &str, offset: u64, length: u64, reason: impl ToString) -> Error {
    Error::ArtifactUnavailable {
        block_id: block_id.to_string(),
        offset,
        length,
        reason: reason.to_string(),
    }
}

/// Object store reachable over HTTP, e.g. `https://storage.googleapis.com`.
/// Blocks are addressed as `{endpoint}/{bucket}/{prefix}/{block_id}`.
pub struct HttpRemote {
    client: reqwest::blocking::Client,
    base: String,
}

impl HttpRemote {
    pub fn new(endpoint: &str, bucket: &str, prefix: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("http client: {e}")))?;
        let mut base = format!("{}/{}", endpoint.trim_end_matches('/'), bucket.trim_matches('/'));
        let prefix = prefix.trim_matches('/');
        if !prefix.is_empty() {
            base.push('/');
            base.push_str(prefix);
        }
        Ok(Self { client, base })
    }
}

impl RemoteSource for HttpRemote {
    fn read_range(&self, block_id: &str, offset: u64, length: u64) -> Result<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }
        let url = format!("{}/{}", self.base, block_id);
        let end = offset + length - 1;
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::RANGE, format!("bytes={offset}-{end}"))
            .send()
            .map_err(|e| unavailable(block_id, offset, length, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(unavailable(block_id, offset, length, format!("HTTP {status} from {url}")));
        }
        let body = resp.bytes().map_err(|e| unavailable(block_id, offset, length, e))?;
        if status == reqwest::StatusCode::PARTIAL_CONTENT {
            return Ok(body.to_vec());
        }
        // Range ignored, whole object returned.
        let (start, stop) = (offset as usize, (offset + length) as usize);
        if body.len() < stop {
            return Err(unavailable(block_id, offset, length, "object shorter than requested range"));
        }
        Ok(body[start..stop].to_vec())
    }
}

/// Blocks stored as plain files under a directory (a mounted bucket, or a
/// locally built index).
pub struct DirRemote {
    root: PathBuf,
}

impl DirRemote {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
}

impl RemoteSource for DirRemote {
    fn read_range(&self, block_id: &str, offset: u64, length: u64) -> Result<Vec<u8>> {
        let read = || -> std::io::Result<Vec<u8>> {
            let mut f = File::open(self.root.join(block_id))?;
            f.seek(SeekFrom::Start(offset))?;
            let mut buf = vec![0u8; length as usize];
            f.read_exact(&mut buf)?;
            Ok(buf)
        };
        read().map_err(|e| unavailable(block_id, offset, length, e))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub remote_fetches: u64,
    pub disk_hits: u64,
    pub memory_hits: u64,
}

type Slot = Arc<OnceLock<Result<Bytes>>>;

pub struct CachedArtifactStore {
    remote: Box<dyn RemoteSource>,
    disk_root: Option<PathBuf>,
    slots: RwLock<HashMap<Segment, Slot>>,
    remote_fetches: AtomicU64,
    disk_hits: AtomicU64,
    memory_hits: AtomicU64,
}

impl CachedArtifactStore {
    /// `cache_dir` enables the on-disk tier; ranges are kept under
    /// `{cache_dir}/blocks/`.
    pub fn new(remote: Box<dyn RemoteSource>, cache_dir: Option<&Path>) -> Self {
        Self {
            remote,
            disk_root: cache_dir.map(|d| d.join("blocks")),
            slots: RwLock::new(HashMap::new()),
            remote_fetches: AtomicU64::new(0),
            disk_hits: AtomicU64::new(0),
            memory_hits: AtomicU64::new(0),
        }
    }

    pub fn from_config(cfg: &ArtifactConfig) -> Result<Self> {
        cfg.validate()?;
        let remote: Box<dyn RemoteSource> = match (&cfg.block_dir, &cfg.bucket) {
            (Some(dir), _) => Box::new(DirRemote::new(dir)),
            (None, Some(bucket)) => Box::new(HttpRemote::new(
                &cfg.endpoint,
                bucket,
                &cfg.postings_prefix,
                Duration::from_secs(cfg.timeout_secs),
            )?),
            (None, None) => return Err(Error::Configuration("no block source configured".into())),
        };
        Ok(Self::new(remote, Some(cfg.cache_dir.as_path())))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
        }
    }

    /// Number of ranges currently held in memory.
    pub fn resident(&self) -> usize {
        self.slots.read().len()
    }

    fn slot(&self, segment: &Segment) -> Slot {
        if let Some(slot) = self.slots.read().get(segment) {
            return slot.clone();
        }
        self.slots.write().entry(segment.clone()).or_default().clone()
    }

    fn disk_path(&self, segment: &Segment) -> Option<PathBuf> {
        let root = self.disk_root.as_ref()?;
        Some(root.join(cache_dir_name(&segment.block_id)).join(format!("{}-{}.bin", segment.offset, segment.length)))
    }

    fn load(&self, segment: &Segment) -> Result<Bytes> {
        let path = self.disk_path(segment);
        if let Some(path) = &path {
            if let Ok(bytes) = fs::read(path) {
                if bytes.len() as u64 == segment.length {
                    self.disk_hits.fetch_add(1, Ordering::Relaxed);
                    debug!(block = %segment.block_id, offset = segment.offset, "disk cache hit");
                    return Ok(bytes.into());
                }
                warn!(path = %path.display(), "ignoring truncated cache file");
            }
        }

        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
        let bytes = self.remote.read_range(&segment.block_id, segment.offset, segment.length)?;
        if bytes.len() as u64 != segment.length {
            return Err(unavailable(
                &segment.block_id,
                segment.offset,
                segment.length,
                format!("short read: got {} bytes", bytes.len()),
            ));
        }
        if let Some(path) = &path {
            if let Err(e) = write_once(path, &bytes) {
                warn!(path = %path.display(), error = %e, "failed to write cache file");
            }
        }
        Ok(bytes.into())
    }
}

impl ArtifactStore for CachedArtifactStore {
    fn fetch(&self, segment: &Segment) -> Result<Bytes> {
        let slot = self.slot(segment);
        let mut loaded_here = false;
        let result = slot
            .get_or_init(|| {
                loaded_here = true;
                self.load(segment)
            })
            .clone();
        if !loaded_here {
            self.memory_hits.fetch_add(1, Ordering::Relaxed);
        } else if result.is_err() {
            // Waiters already joined this attempt; later callers get a fresh one.
            let mut slots = self.slots.write();
            if slots.get(segment).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                slots.remove(segment);
            }
        }
        result
    }
}

/// One path component per block id, distinct for distinct ids. `%` and the
/// path separators are percent-escaped, as is a leading `.` so `.`/`..` can
/// never resolve outside the cache root.
fn cache_dir_name(block_id: &str) -> String {
    if block_id.is_empty() {
        return "%".into();
    }
    let mut out = String::with_capacity(block_id.len());
    for (i, c) in block_id.chars().enumerate() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            '.' if i == 0 => out.push_str("%2E"),
            c => out.push(c),
        }
    }
    out
}

/// Write through a temp file and rename so a concurrent reader (in this or
/// another process) never observes a partial file. The first writer wins.
fn write_once(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e.error),
    }
}

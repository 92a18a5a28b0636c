//! Build-side writer for posting blocks.
//!
//! Not used on the query path. It writes the layout documented in
//! [`crate::codec`] so fixtures, benchmarks and external tooling can produce
//! blocks that the reader accepts byte for byte.

use crate::codec;
use crate::index::{IndexDescriptor, PostingEntry, PostingLocation, Segment, TermEntry};
use anyhow::{bail, Result};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Largest block the build pipeline emits; a multiple of the entry width.
pub const DEFAULT_BLOCK_SIZE: u64 = 1_999_998;

/// Appends postings to numbered block files `{name}_{nnn}.bin`, starting a
/// new block whenever the current one is full.
pub struct BlockWriter {
    dir: PathBuf,
    name: String,
    block_size: u64,
    current: Option<(String, BufWriter<File>)>,
    used: u64,
    blocks: Vec<String>,
}

impl BlockWriter {
    pub fn new<P: AsRef<Path>>(dir: P, name: &str, block_size: u64) -> Result<Self> {
        if block_size == 0 {
            bail!("block size must be positive");
        }
        create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            name: name.to_string(),
            block_size,
            current: None,
            used: 0,
            blocks: Vec::new(),
        })
    }

    fn roll(&mut self) -> Result<()> {
        if let Some((_, mut w)) = self.current.take() {
            w.flush()?;
        }
        let block_id = format!("{}_{:03}.bin", self.name, self.blocks.len());
        let f = File::create(self.dir.join(&block_id))?;
        self.blocks.push(block_id.clone());
        self.current = Some((block_id, BufWriter::new(f)));
        self.used = 0;
        Ok(())
    }

    /// Write raw bytes and return where they landed.
    pub fn append(&mut self, mut bytes: &[u8]) -> Result<PostingLocation> {
        let mut location = Vec::new();
        while !bytes.is_empty() {
            if self.current.is_none() || self.used == self.block_size {
                self.roll()?;
            }
            let take = (self.block_size - self.used).min(bytes.len() as u64);
            let Some((block_id, w)) = self.current.as_mut() else {
                bail!("no open block");
            };
            w.write_all(&bytes[..take as usize])?;
            location.push(Segment { block_id: block_id.clone(), offset: self.used, length: take });
            self.used += take;
            bytes = &bytes[take as usize..];
        }
        Ok(location)
    }

    pub fn write_postings(&mut self, entries: &[PostingEntry]) -> Result<PostingLocation> {
        self.append(&codec::encode(entries))
    }

    /// Write `entries` and record the term in `desc` with df = entry count.
    pub fn add_term(&mut self, desc: &mut IndexDescriptor, term: &str, entries: &[PostingEntry]) -> Result<()> {
        let location = self.write_postings(entries)?;
        desc.insert(term, TermEntry { df: entries.len() as u32, location });
        Ok(())
    }

    /// Flush and return the names of every block written.
    pub fn finish(mut self) -> Result<Vec<String>> {
        if let Some((_, mut w)) = self.current.take() {
            w.flush()?;
        }
        Ok(self.blocks)
    }
}

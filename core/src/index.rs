use crate::artifact::ArtifactStore;
use crate::codec;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingEntry {
    pub doc_id: DocId,
    pub tf: u32,
}

/// One contiguous byte range of a term's postings inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub block_id: String,
    pub offset: u64,
    pub length: u64,
}

/// Segments in read order. More than one only when the postings crossed a
/// block boundary at build time.
pub type PostingLocation = Vec<Segment>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub df: u32,
    pub location: PostingLocation,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub terms: HashMap<String, TermEntry>,
}

impl IndexDescriptor {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, term: impl Into<String>, entry: TermEntry) {
        self.terms.insert(term.into(), entry);
    }

    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

/// Resolves terms to posting lists. Holds no cache of its own; repeated
/// reads are served by the artifact store.
pub struct IndexStore {
    descriptor: IndexDescriptor,
    artifacts: Arc<dyn ArtifactStore>,
}

impl IndexStore {
    pub fn new(descriptor: IndexDescriptor, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self { descriptor, artifacts }
    }

    /// 0 for terms not in the index. No I/O.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.descriptor.terms.get(term).map_or(0, |e| e.df)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.descriptor.terms.contains_key(term)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.descriptor.len()
    }

    /// Posting list for `term`, empty when the term is not indexed.
    pub fn postings_for(&self, term: &str) -> Result<Vec<PostingEntry>> {
        let Some(entry) = self.descriptor.terms.get(term) else {
            return Ok(Vec::new());
        };
        let parts = entry
            .location
            .iter()
            .map(|seg| self.artifacts.fetch(seg))
            .collect::<Result<Vec<_>>>()?;
        let postings = codec::decode_segments(&parts)?;
        if postings.len() != entry.df as usize {
            warn!(term, df = entry.df, decoded = postings.len(), "posting list length disagrees with df");
        }
        Ok(postings)
    }
}

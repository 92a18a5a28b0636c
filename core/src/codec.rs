//! Fixed-width binary postings format.
//!
//! A posting list is a packed run of 6-byte entries:
//!
//! ```text
//! +----------------------------+-----------------------+
//! | document_id: u32 (BE, 4 B) | term_freq: u16 (BE, 2 B) |
//! +----------------------------+-----------------------+
//! ```
//!
//! Entries are concatenated with no header or padding. A term's bytes may be
//! split across several blocks; the reader concatenates the segments in
//! location order before calling [`decode`].

use crate::error::{Error, Result};
use crate::index::PostingEntry;

pub const DOC_ID_WIDTH: usize = 4;
pub const TF_WIDTH: usize = 2;
pub const ENTRY_WIDTH: usize = DOC_ID_WIDTH + TF_WIDTH;

/// Decode a contiguous byte run into posting entries, preserving order.
pub fn decode(bytes: &[u8]) -> Result<Vec<PostingEntry>> {
    if bytes.len() % ENTRY_WIDTH != 0 {
        return Err(Error::MalformedPostings { len: bytes.len(), width: ENTRY_WIDTH });
    }
    let entries = bytes
        .chunks_exact(ENTRY_WIDTH)
        .map(|chunk| {
            let doc_id = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let tf = u16::from_be_bytes([chunk[4], chunk[5]]);
            PostingEntry { doc_id, tf: tf as u32 }
        })
        .collect();
    Ok(entries)
}

/// Decode the concatenation of several segments without first copying them
/// into one buffer when they already line up on entry boundaries.
pub fn decode_segments<B: AsRef<[u8]>>(segments: &[B]) -> Result<Vec<PostingEntry>> {
    if segments.iter().all(|s| s.as_ref().len() % ENTRY_WIDTH == 0) {
        let mut out = Vec::with_capacity(segments.iter().map(|s| s.as_ref().len() / ENTRY_WIDTH).sum());
        for seg in segments {
            out.extend(decode(seg.as_ref())?);
        }
        return Ok(out);
    }
    // an entry straddles a block boundary
    let joined: Vec<u8> = segments.iter().flat_map(|s| s.as_ref().iter().copied()).collect();
    decode(&joined)
}

/// Encode entries in the layout [`decode`] reads. Build-side only.
///
/// Term frequencies above `u16::MAX` are saturated, matching what a
/// fixed-width writer has to do.
pub fn encode(entries: &[PostingEntry]) -> Vec<u8> {
    let mut out = Vec::with_capacity(entries.len() * ENTRY_WIDTH);
    for e in entries {
        out.extend_from_slice(&e.doc_id.to_be_bytes());
        let tf = e.tf.min(u16::MAX as u32) as u16;
        out.extend_from_slice(&tf.to_be_bytes());
    }
    out
}

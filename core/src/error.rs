use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the query path and by startup loading.
///
/// Per-term kinds (`ArtifactUnavailable`, `MalformedPostings`) are contained
/// by the ranker; `MetadataLoad` and `Configuration` are only produced while
/// an engine is being opened and should stop the process.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("artifact {block_id}[{offset}..+{length}] unavailable: {reason}")]
    ArtifactUnavailable {
        block_id: String,
        offset: u64,
        length: u64,
        reason: String,
    },

    #[error("malformed postings: {len} bytes is not a multiple of the {width}-byte entry width")]
    MalformedPostings { len: usize, width: usize },

    #[error("failed to load {table}: {reason}")]
    MetadataLoad { table: String, reason: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn metadata(table: impl Into<String>, reason: impl ToString) -> Self {
        Error::MetadataLoad { table: table.into(), reason: reason.to_string() }
    }
}

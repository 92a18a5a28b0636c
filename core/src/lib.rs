pub mod artifact;
pub mod blend;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod metadata;
pub mod persist;
pub mod ranking;
pub mod tokenizer;
pub mod writer;

pub use artifact::{ArtifactStore, CachedArtifactStore, DirRemote, HttpRemote, RemoteSource};
pub use blend::{Additive, BlendKind, BlendPolicy, MinMaxNormalized};
pub use config::{ArtifactConfig, RankingConfig};
pub use engine::{SearchEngine, SearchHit};
pub use error::{Error, Result};
pub use index::{DocId, IndexDescriptor, IndexStore, PostingEntry, PostingLocation, Segment, TermEntry};
pub use metadata::{CorpusStats, MetadataStore, UNKNOWN_LENGTH};
pub use ranking::{Ranker, ScoredResult};

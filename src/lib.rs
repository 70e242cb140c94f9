//! graphwalk: DeepWalk random-walk corpora with on-disk checkpoint reuse
//!
//! Walks are generated per node, written to an append-only JSON-lines corpus,
//! and reused by later runs whose walk length and walk count fit inside an
//! existing corpus. Training is delegated to an external skip-gram trainer
//! through [`trainer::SequenceTrainer`].

pub mod cache;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod trainer;
pub mod walker;

// Re-export commonly used items for convenience
pub use cache::{CacheEntry, CacheResolver};
pub use config::{ConfigLoader, GapPolicy, PipelineConfig};
pub use corpus::{CorpusReader, CorpusStore, CorpusWriter, WalkSource};
pub use embedding::Embedding;
pub use errors::PipelineError;
pub use graph::{Adjacency, NodeId, WalkGraph};
pub use pipeline::{EmbeddingPipeline, TrainingCorpus};
pub use trainer::{SequenceTrainer, TokenVectors, TrainingParams};
pub use walker::{RandomWalker, Walk, WalkParams, WalkSink};

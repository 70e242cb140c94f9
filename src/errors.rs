use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::graph::NodeId;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),
    #[error("Cache resolution error: {0}")]
    Cache(#[from] CacheError),
    #[error("Walk generation error: {0}")]
    Walk(#[from] WalkError),
    #[error("Trainer error: {0}")]
    Trainer(#[from] TrainerError),
    #[error("Vector lookup error: {0}")]
    Lookup(#[from] LookupError),
    #[error("Embedding covers {rows} of {expected} nodes ({} missing)", .missing.len())]
    IncompleteEmbedding {
        rows: usize,
        expected: usize,
        missing: Vec<NodeId>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize walk: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Malformed walk at {}:{line}: {source}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed manifest '{}': {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "Corpus stored at ({stored_length}, {stored_number}) cannot serve a request for ({requested_length}, {requested_number})"
    )]
    Incompatible {
        stored_length: usize,
        stored_number: usize,
        requested_length: usize,
        requested_number: usize,
    },
    #[error("Cannot tell how '{}' was generated: no manifest and no _<length>_<number> suffix", .0.display())]
    UnknownParameters(PathBuf),
    #[error("Corpus file '{}' already exists", .0.display())]
    AlreadyExists(PathBuf),
}

impl CorpusError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        CorpusError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to scan cache root '{}': {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Invalid walk parameters: {0}")]
    InvalidParams(String),
    #[error("Failed to build walker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to flush walk batch: {0}")]
    Sink(#[from] CorpusError),
}

/// Failure reported by an external trainer implementation.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("Training corpus could not be read: {0}")]
    Corpus(#[from] CorpusError),
    #[error("Invalid training parameters: {0}")]
    InvalidParams(String),
    #[error("Trainer failed: {0}")]
    Backend(String),
}

/// Outcome of asking a trained model for a token's vector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The token never reached the trainer's minimum count.
    #[error("Token '{0}' has no vector")]
    NotInVocabulary(String),
    #[error("Vector lookup failed for '{token}': {reason}")]
    Backend { token: String, reason: String },
}

/// Shorthand for building a `ConfigError::Invalid`.
pub fn invalid_config(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

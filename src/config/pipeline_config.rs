use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{invalid_config, ConfigError};
use crate::trainer::TrainingParams;
use crate::walker::WalkParams;

pub const DEFAULT_CACHE_PREFIX: &str = "prewalking_deepwalk";

/// Where generated corpora are kept for reuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Parent directory of corpus directories; no caching when unset.
    pub root: Option<PathBuf>,
    /// Leading part of every corpus directory name.
    pub prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            prefix: DEFAULT_CACHE_PREFIX.to_string(),
        }
    }
}

impl CacheConfig {
    /// Per-user cache location, e.g. `~/.cache/graphwalk/walks` on Linux.
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("graphwalk")
            .join("walks")
    }
}

/// What `fit` does when some nodes get no embedding row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Return the truncated matrix and report the missing nodes.
    #[default]
    Truncate,
    /// Fail with `PipelineError::IncompleteEmbedding`.
    Fail,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub walk: WalkParams,
    pub training: TrainingParams,
    pub cache: CacheConfig,
    pub gap_policy: GapPolicy,
}

impl PipelineConfig {
    /// Configuration for the given walk shape, everything else default.
    pub fn new(walk_length: usize, walk_number: usize) -> Self {
        Self {
            walk: WalkParams::new(walk_length, walk_number),
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache.root = Some(root.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.walk.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.walk
            .validate()
            .map_err(|e| invalid_config("walk", e.to_string()))?;

        let training = &self.training;
        for (field, value) in [
            ("training.dimensions", training.dimensions),
            ("training.window_size", training.window_size),
            ("training.epochs", training.epochs),
            ("training.workers", training.workers),
        ] {
            if value == 0 {
                return Err(invalid_config(field, "must be at least 1"));
            }
        }
        if !(training.learning_rate.is_finite() && training.learning_rate > 0.0) {
            return Err(invalid_config(
                "training.learning_rate",
                format!("must be a positive number, got {}", training.learning_rate),
            ));
        }

        let prefix = &self.cache.prefix;
        if prefix.is_empty() {
            return Err(invalid_config("cache.prefix", "must not be empty"));
        }
        if prefix.contains(['/', '\\']) {
            return Err(invalid_config(
                "cache.prefix",
                format!("'{prefix}' must not contain path separators"),
            ));
        }
        Ok(())
    }
}

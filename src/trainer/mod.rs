//! Boundary to the external sequence-embedding trainer
//!
//! Training itself (windowing, negative sampling, gradient updates) lives
//! outside this crate. The pipeline hands a [`WalkSource`] and the
//! hyperparameters over unchanged and reads vectors back by token.

use serde::{Deserialize, Serialize};

use crate::corpus::WalkSource;
use crate::errors::{LookupError, TrainerError};

/// Hyperparameters passed through to the trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Embedding dimensionality.
    pub dimensions: usize,
    /// Context window on each side of a token.
    pub window_size: usize,
    /// Initial learning rate.
    pub learning_rate: f32,
    pub epochs: usize,
    /// Trainer-side worker threads.
    pub workers: usize,
    /// Tokens seen fewer times than this get no vector.
    pub min_count: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            dimensions: 128,
            window_size: 5,
            learning_rate: 0.05,
            epochs: 1,
            workers: 4,
            min_count: 1,
        }
    }
}

/// Trained token → vector lookup.
pub trait TokenVectors {
    /// Length of every vector.
    fn dimensions(&self) -> usize;

    /// The vector of `token`.
    ///
    /// Tokens below the minimum count return
    /// [`LookupError::NotInVocabulary`]; anything else is a backend failure.
    fn vector(&self, token: &str) -> Result<&[f32], LookupError>;
}

/// A skip-gram style trainer over token sequences.
///
/// Implementations may iterate the corpus once per epoch; every call to
/// [`WalkSource::walks`] starts a fresh pass.
pub trait SequenceTrainer {
    type Model: TokenVectors;

    fn train(
        &self,
        corpus: &dyn WalkSource,
        params: &TrainingParams,
    ) -> Result<Self::Model, TrainerError>;
}

impl<T: SequenceTrainer + ?Sized> SequenceTrainer for &T {
    type Model = T::Model;

    fn train(
        &self,
        corpus: &dyn WalkSource,
        params: &TrainingParams,
    ) -> Result<Self::Model, TrainerError> {
        (**self).train(corpus, params)
    }
}

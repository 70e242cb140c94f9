//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use graphwalk::errors::{LookupError, TrainerError};
use graphwalk::{NodeId, SequenceTrainer, TokenVectors, TrainingParams, Walk, WalkSource};

/// Stand-in trainer: a token's vector is its per-epoch occurrence count.
#[derive(Default)]
pub struct CountingTrainer {
    passes: AtomicUsize,
    walks_seen: AtomicUsize,
}

impl CountingTrainer {
    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    pub fn walks_seen(&self) -> usize {
        self.walks_seen.load(Ordering::SeqCst)
    }
}

pub struct CountVectors {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl TokenVectors for CountVectors {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn vector(&self, token: &str) -> Result<&[f32], LookupError> {
        self.vectors
            .get(token)
            .map(Vec::as_slice)
            .ok_or_else(|| LookupError::NotInVocabulary(token.to_string()))
    }
}

impl SequenceTrainer for CountingTrainer {
    type Model = CountVectors;

    fn train(
        &self,
        corpus: &dyn WalkSource,
        params: &TrainingParams,
    ) -> Result<CountVectors, TrainerError> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..params.epochs {
            self.passes.fetch_add(1, Ordering::SeqCst);
            for walk in corpus.walks()? {
                let walk = walk?;
                self.walks_seen.fetch_add(1, Ordering::SeqCst);
                for token in walk {
                    *counts.entry(token).or_default() += 1;
                }
            }
        }

        let vectors = counts
            .into_iter()
            .map(|(token, count)| (token, count / params.epochs))
            .filter(|(_, count)| *count >= params.min_count)
            .map(|(token, count)| (token, vec![count as f32; params.dimensions]))
            .collect();
        Ok(CountVectors {
            dimensions: params.dimensions,
            vectors,
        })
    }
}

/// Undirected path 0 - 1 - ... - (n - 1) as an adjacency table.
pub fn path_table(n: usize) -> Vec<Vec<NodeId>> {
    (0..n)
        .map(|i| {
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push(i - 1);
            }
            if i + 1 < n {
                neighbors.push(i + 1);
            }
            neighbors
        })
        .collect()
}

pub fn collect_walks(source: &dyn WalkSource) -> Vec<Walk> {
    source
        .walks()
        .expect("open corpus pass")
        .collect::<Result<_, _>>()
        .expect("read corpus")
}

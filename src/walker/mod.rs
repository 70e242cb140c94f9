//! First-order truncated random walks
//!
//! Walks are generated node by node in the graph's iteration order. Each source
//! node contributes `walk_number` consecutive walks, and every `dump_size`
//! source nodes the accumulated batch is handed to the configured sink. Within
//! a batch the per-node work runs on a rayon pool; every node draws from its
//! own RNG stream derived from the base seed and the node's position, so a
//! fixed seed produces the same corpus for any worker count.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{CorpusError, WalkError};
use crate::graph::{Adjacency, NodeId, WalkGraph};

/// A single walk, node ids rendered as strings for token-based trainers.
pub type Walk = Vec<String>;

const STREAM_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Destination for flushed walk batches.
pub trait WalkSink {
    fn flush_batch(&mut self, batch: &[Walk]) -> Result<(), CorpusError>;
}

/// Walker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkParams {
    /// Nodes per walk, source included.
    pub walk_length: usize,
    /// Walks started from every node.
    pub walk_number: usize,
    /// Source nodes processed between two sink flushes.
    pub dump_size: usize,
    /// Threads used to generate a batch.
    pub workers: usize,
    /// Base seed; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            walk_length: 80,
            walk_number: 10,
            dump_size: 100_000,
            workers: num_cpus::get(),
            seed: None,
        }
    }
}

impl WalkParams {
    pub fn new(walk_length: usize, walk_number: usize) -> Self {
        Self {
            walk_length,
            walk_number,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), WalkError> {
        let checks = [
            ("walk_length", self.walk_length),
            ("walk_number", self.walk_number),
            ("dump_size", self.dump_size),
            ("workers", self.workers),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(WalkError::InvalidParams(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

/// Samples fixed-length first-order random walks from every node.
#[derive(Debug, Clone)]
pub struct RandomWalker {
    params: WalkParams,
    seed: u64,
}

impl RandomWalker {
    pub fn new(params: WalkParams) -> Result<Self, WalkError> {
        params.validate()?;
        let seed = params.seed.unwrap_or_else(rand::random);
        if params.seed.is_none() {
            tracing::info!(seed, "No walk seed configured, drew one from entropy");
        }
        Ok(Self { params, seed })
    }

    pub fn params(&self) -> &WalkParams {
        &self.params
    }

    /// The base seed actually in use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// One truncated walk from `source`.
    ///
    /// A node without neighbours ends the walk early; the walk never restarts.
    pub fn do_walk<R: Rng + ?Sized>(
        &self,
        adjacency: &Adjacency,
        source: NodeId,
        rng: &mut R,
    ) -> Walk {
        let mut walk = Vec::with_capacity(self.params.walk_length);
        walk.push(source);
        for _ in 1..self.params.walk_length {
            let current = walk[walk.len() - 1];
            match adjacency.neighbors(current).choose(rng) {
                Some(&next) => walk.push(next),
                None => break,
            }
        }
        walk.into_iter().map(|node| node.to_string()).collect()
    }

    /// All `walk_number` walks of one source node, from that node's own stream.
    pub fn walks_from(&self, adjacency: &Adjacency, position: usize, source: NodeId) -> Vec<Walk> {
        let mut rng = SmallRng::seed_from_u64(self.node_seed(position));
        (0..self.params.walk_number)
            .map(|_| self.do_walk(adjacency, source, &mut rng))
            .collect()
    }

    /// Walks from every node of `graph`.
    ///
    /// With a sink, batches are flushed every `dump_size` source nodes plus a
    /// final partial batch, and the returned vector is empty. Without one, the
    /// whole corpus is returned in node order.
    pub fn do_walks<G: WalkGraph + ?Sized>(
        &self,
        graph: &G,
        mut sink: Option<&mut dyn WalkSink>,
    ) -> Result<Vec<Walk>, WalkError> {
        let adjacency = Adjacency::from_graph(graph);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.params.workers)
            .thread_name(|idx| format!("walker-{idx}"))
            .build()?;

        tracing::info!(
            nodes = adjacency.len(),
            walk_length = self.params.walk_length,
            walk_number = self.params.walk_number,
            workers = self.params.workers,
            "Generating walks"
        );

        let mut walks: Vec<Walk> = Vec::new();
        let mut flushes = 0usize;
        let positions: Vec<(usize, NodeId)> =
            adjacency.nodes().iter().copied().enumerate().collect();

        for chunk in positions.chunks(self.params.dump_size) {
            let batch: Vec<Vec<Walk>> = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|&(position, node)| self.walks_from(&adjacency, position, node))
                    .collect()
            });
            walks.extend(batch.into_iter().flatten());

            if let Some(sink) = sink.as_deref_mut() {
                sink.flush_batch(&walks)?;
                flushes += 1;
                tracing::debug!(walks = walks.len(), flushes, "Flushed walk batch");
                walks.clear();
            }
        }

        tracing::info!(
            walks = walks.len(),
            flushes,
            "Walk generation finished"
        );
        Ok(walks)
    }

    fn node_seed(&self, position: usize) -> u64 {
        self.seed ^ (position as u64 + 1).wrapping_mul(STREAM_MIX)
    }
}

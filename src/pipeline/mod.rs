//! DeepWalk orchestration: corpus selection, training and extraction

use crate::cache::{CacheEntry, CacheResolver};
use crate::config::{GapPolicy, PipelineConfig};
use crate::corpus::{CorpusReader, CorpusStore, WalkIter, WalkSource};
use crate::embedding::Embedding;
use crate::errors::{CorpusError, PipelineError};
use crate::graph::WalkGraph;
use crate::logging::OperationTimer;
use crate::trainer::SequenceTrainer;
use crate::walker::{RandomWalker, Walk};

/// The walks a trainer is fed, and where they came from.
#[derive(Debug)]
pub enum TrainingCorpus {
    /// Generated in this run and kept in memory.
    InMemory(Vec<Walk>),
    /// Generated in this run and written to the cache.
    Written(CorpusReader),
    /// Reused from an earlier run's corpus.
    Cached(CorpusReader),
}

impl TrainingCorpus {
    pub fn is_cached(&self) -> bool {
        matches!(self, TrainingCorpus::Cached(_))
    }

    /// The backing reader for on-disk corpora.
    pub fn reader(&self) -> Option<&CorpusReader> {
        match self {
            TrainingCorpus::InMemory(_) => None,
            TrainingCorpus::Written(reader) | TrainingCorpus::Cached(reader) => Some(reader),
        }
    }
}

impl WalkSource for TrainingCorpus {
    fn walks(&self) -> Result<WalkIter<'_>, CorpusError> {
        match self {
            TrainingCorpus::InMemory(walks) => walks.walks(),
            TrainingCorpus::Written(reader) | TrainingCorpus::Cached(reader) => reader.walks(),
        }
    }
}

/// DeepWalk: random-walk corpus plus an external skip-gram trainer.
pub struct EmbeddingPipeline<T> {
    config: PipelineConfig,
    trainer: T,
}

impl<T: SequenceTrainer> EmbeddingPipeline<T> {
    pub fn new(config: PipelineConfig, trainer: T) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, trainer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn resolver(&self) -> CacheResolver {
        CacheResolver::new(self.config.cache.root.clone(), self.config.cache.prefix.clone())
    }

    /// Embeds every node of `graph`.
    ///
    /// Row `i` is node `i`. Rows stop at the first id the trainer has no
    /// vector for; with [`GapPolicy::Fail`] any such gap is an error.
    pub fn fit<G: WalkGraph + ?Sized>(&self, graph: &G) -> Result<Embedding, PipelineError> {
        let corpus = self.prepare_corpus(graph)?;

        let timer = OperationTimer::new("train_embedding")
            .with_metadata("dimensions", self.config.training.dimensions)
            .with_metadata("cached", corpus.is_cached());
        let model = self.trainer.train(&corpus, &self.config.training)?;
        timer.finish();

        let node_ids = graph.node_ids();
        let embedding = Embedding::extract(&model, &node_ids)?;
        if embedding.is_complete() {
            return Ok(embedding);
        }

        tracing::warn!(
            rows = embedding.rows(),
            expected = embedding.expected_nodes(),
            first_missing = embedding.missing_nodes().first().copied(),
            "Embedding does not cover every node"
        );
        match self.config.gap_policy {
            GapPolicy::Truncate => Ok(embedding),
            GapPolicy::Fail => Err(PipelineError::IncompleteEmbedding {
                rows: embedding.rows(),
                expected: embedding.expected_nodes(),
                missing: embedding.missing_nodes().to_vec(),
            }),
        }
    }

    /// Picks the training corpus: a cached one when it satisfies the walk
    /// request, otherwise freshly generated walks.
    pub fn prepare_corpus<G: WalkGraph + ?Sized>(
        &self,
        graph: &G,
    ) -> Result<TrainingCorpus, PipelineError> {
        let walk = &self.config.walk;
        if let Some(entry) = self.resolver().resolve(walk.walk_length, walk.walk_number)? {
            return Ok(TrainingCorpus::Cached(self.open_cached(&entry)?));
        }
        self.generate(graph)
    }

    fn open_cached(&self, entry: &CacheEntry) -> Result<CorpusReader, CorpusError> {
        CorpusReader::with_stored(
            &entry.dir,
            entry.walk_length,
            entry.walk_number,
            self.config.walk.walk_length,
            self.config.walk.walk_number,
        )
    }

    fn generate<G: WalkGraph + ?Sized>(&self, graph: &G) -> Result<TrainingCorpus, PipelineError> {
        let params = &self.config.walk;
        let walker = RandomWalker::new(params.clone())?;
        let timer = OperationTimer::new("generate_walks")
            .with_metadata("walk_length", params.walk_length)
            .with_metadata("walk_number", params.walk_number)
            .with_metadata("seed", walker.seed());

        let corpus = match &self.config.cache.root {
            None => TrainingCorpus::InMemory(walker.do_walks(graph, None)?),
            Some(root) => {
                let mut writer = CorpusStore::create(
                    root,
                    &self.config.cache.prefix,
                    params.walk_length,
                    params.walk_number,
                )?;
                walker.do_walks(graph, Some(&mut writer))?;
                let dir = writer.dir().to_path_buf();
                writer.finish()?;
                TrainingCorpus::Written(CorpusReader::with_stored(
                    &dir,
                    params.walk_length,
                    params.walk_number,
                    params.walk_length,
                    params.walk_number,
                )?)
            }
        };

        timer.finish();
        Ok(corpus)
    }
}

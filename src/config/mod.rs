// Configuration module
// Pipeline settings: walk shape, trainer hyperparameters, corpus cache

pub mod loader;
pub mod pipeline_config;

pub use loader::ConfigLoader;
pub use pipeline_config::{CacheConfig, GapPolicy, PipelineConfig, DEFAULT_CACHE_PREFIX};

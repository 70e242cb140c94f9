use std::{collections::HashMap, env, fs, path::PathBuf};

use crate::errors::{invalid_config, ConfigError};

use super::pipeline_config::PipelineConfig;

// Configuration location
pub const USER_CONFIG_PATH: &str = "~/.config/graphwalk";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Environment overrides
pub const ENV_CACHE_ROOT: &str = "GRAPHWALK_CACHE_ROOT";
pub const ENV_CACHE_PREFIX: &str = "GRAPHWALK_CACHE_PREFIX";
pub const ENV_SEED: &str = "GRAPHWALK_SEED";
pub const ENV_WORKERS: &str = "GRAPHWALK_WORKERS";

const ENV_KEYS: [&str; 4] = [ENV_CACHE_ROOT, ENV_CACHE_PREFIX, ENV_SEED, ENV_WORKERS];

/// Loads `PipelineConfig` from a TOML file and the environment
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader reading `~/.config/graphwalk/config.toml` when it exists
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Loader reading a specific file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Load, apply environment overrides and validate
    pub fn load(&self) -> Result<PipelineConfig, ConfigError> {
        let config = match self.config_file()? {
            Some(path) => {
                let content = fs::read_to_string(&path)
                    .map_err(|e| ConfigError::FileRead(path.display().to_string(), e))?;
                Self::from_toml_str(&content, &path.display().to_string())?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                PipelineConfig::default()
            }
        };

        let config = Self::apply_env(config, &Self::collect_env_vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML; sections and keys left out keep their defaults
    pub fn from_toml_str(content: &str, origin: &str) -> Result<PipelineConfig, ConfigError> {
        let mut config: PipelineConfig = toml::from_str(content)
            .map_err(|e| ConfigError::TomlParse(origin.to_string(), e))?;
        if let Some(root) = config.cache.root.take() {
            config.cache.root = Some(expand_path(&root.to_string_lossy()));
        }
        Ok(config)
    }

    /// Environment values win over file values
    pub fn apply_env(
        mut config: PipelineConfig,
        env_map: &HashMap<String, String>,
    ) -> Result<PipelineConfig, ConfigError> {
        if let Some(root) = env_map.get(ENV_CACHE_ROOT).filter(|v| !v.is_empty()) {
            config.cache.root = Some(expand_path(root));
        }
        if let Some(prefix) = env_map.get(ENV_CACHE_PREFIX).filter(|v| !v.is_empty()) {
            config.cache.prefix = prefix.clone();
        }
        if let Some(seed) = env_map.get(ENV_SEED) {
            let seed = seed
                .parse()
                .map_err(|_| invalid_config(ENV_SEED, format!("'{seed}' is not an unsigned integer")))?;
            config.walk.seed = Some(seed);
        }
        if let Some(workers) = env_map.get(ENV_WORKERS) {
            config.walk.workers = workers.parse().map_err(|_| {
                invalid_config(ENV_WORKERS, format!("'{workers}' is not an unsigned integer"))
            })?;
        }
        Ok(config)
    }

    fn collect_env_vars() -> HashMap<String, String> {
        ENV_KEYS
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect()
    }

    fn config_file(&self) -> Result<Option<PathBuf>, ConfigError> {
        match &self.path {
            Some(path) => Ok(Some(path.clone())),
            None => {
                let path = expand_path(USER_CONFIG_PATH).join(CONFIG_FILE_NAME);
                Ok(path.is_file().then_some(path))
            }
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

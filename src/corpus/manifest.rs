use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CorpusError;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Sidecar record written next to every corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusManifest {
    pub format_version: u32,
    pub prefix: String,
    pub walk_length: usize,
    pub walk_number: usize,
    pub created_at: DateTime<Utc>,
    /// False until the writer finished; a crashed run leaves it false.
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub walks_written: u64,
    #[serde(default)]
    pub nodes_written: u64,
}

impl CorpusManifest {
    pub fn new(prefix: &str, walk_length: usize, walk_number: usize) -> Self {
        Self {
            format_version: MANIFEST_FORMAT_VERSION,
            prefix: prefix.to_string(),
            walk_length,
            walk_number,
            created_at: Utc::now(),
            complete: false,
            walks_written: 0,
            nodes_written: 0,
        }
    }

    /// Reads the manifest of `dir`, `Ok(None)` when there is none.
    pub fn load(dir: &Path) -> Result<Option<Self>, CorpusError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CorpusError::io(&path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| CorpusError::Manifest { path, source })
    }

    /// Replaces the manifest of `dir` atomically.
    pub fn store(&self, dir: &Path) -> Result<(), CorpusError> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let content = serde_json::to_string_pretty(self).map_err(CorpusError::Serialize)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CorpusError::io(dir, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| CorpusError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| CorpusError::io(&path, e.error))?;
        Ok(())
    }
}

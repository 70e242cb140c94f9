//! Reuse of previously generated walk corpora
//!
//! A corpus stored at (L, N) can serve any request (l, n) with l <= L and
//! n <= N: the reader keeps the first n walks of every node and cuts them to
//! l tokens. Resolution is first-match in directory-listing order. It does not
//! pick the smallest sufficient corpus, which keeps the choice identical to
//! what earlier runs reused.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::corpus::{parse_directory_name, CorpusManifest, CORPUS_FILE_NAME};
use crate::errors::CacheError;

/// Where a cache entry's parameters were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSource {
    Manifest,
    DirectoryName,
}

/// A candidate corpus directory under the cache root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub dir: PathBuf,
    pub walk_length: usize,
    pub walk_number: usize,
    pub source: ParameterSource,
    /// `Some(false)` when the manifest says generation never finished.
    pub complete: Option<bool>,
    pub has_corpus: bool,
}

impl CacheEntry {
    /// Whether this entry can serve a request for (walk_length, walk_number).
    pub fn satisfies(&self, walk_length: usize, walk_number: usize) -> bool {
        self.has_corpus && self.walk_length >= walk_length && self.walk_number >= walk_number
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.dir.join(CORPUS_FILE_NAME)
    }
}

/// Finds a stored corpus able to serve a walk request.
#[derive(Debug, Clone)]
pub struct CacheResolver {
    root: Option<PathBuf>,
    prefix: String,
}

impl CacheResolver {
    pub fn new(root: Option<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root,
            prefix: prefix.into(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// First corpus under the cache root that satisfies the request.
    ///
    /// `Ok(None)` is a plain cache miss, including an unset or missing root.
    pub fn resolve(
        &self,
        walk_length: usize,
        walk_number: usize,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries()?;
        let found = Self::select_first(entries, walk_length, walk_number);
        match &found {
            Some(entry) => {
                tracing::info!(
                    dir = %entry.dir.display(),
                    stored_length = entry.walk_length,
                    stored_number = entry.walk_number,
                    "Reusing cached walk corpus"
                );
                if entry.complete == Some(false) {
                    tracing::warn!(
                        dir = %entry.dir.display(),
                        "Cached corpus was never marked complete; it may be missing trailing nodes"
                    );
                }
            }
            None => tracing::debug!(walk_length, walk_number, "No cached corpus satisfies request"),
        }
        Ok(found)
    }

    /// First-match selection over entries already in listing order.
    pub fn select_first<I>(entries: I, walk_length: usize, walk_number: usize) -> Option<CacheEntry>
    where
        I: IntoIterator<Item = CacheEntry>,
    {
        entries
            .into_iter()
            .find(|entry| entry.satisfies(walk_length, walk_number))
    }

    /// Every directory under the root whose name carries the prefix and whose
    /// parameters can be recovered, in listing order.
    pub fn entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let Some(root) = self.root.as_deref().filter(|root| root.is_dir()) else {
            return Ok(Vec::new());
        };

        let prefix = self.prefix.to_lowercase();
        let mut entries = Vec::new();
        for item in WalkDir::new(root).min_depth(1).max_depth(1).follow_links(true) {
            let item = match item {
                Ok(item) => item,
                // Only a failure on the root itself is fatal
                Err(e) if e.depth() > 0 => {
                    tracing::debug!(
                        path = ?e.path(),
                        error = %e,
                        "Skipping unreadable cache entry"
                    );
                    continue;
                }
                Err(source) => {
                    return Err(CacheError::Scan {
                        path: root.to_path_buf(),
                        source,
                    })
                }
            };
            if !item.file_type().is_dir() {
                continue;
            }
            let name = item.file_name().to_string_lossy().to_lowercase();
            if !name.starts_with(&prefix) {
                continue;
            }
            match Self::inspect(item.path(), &name) {
                Some(entry) => entries.push(entry),
                None => tracing::debug!(
                    dir = %item.path().display(),
                    "Skipping cache entry with unreadable parameters"
                ),
            }
        }
        Ok(entries)
    }

    fn inspect(dir: &Path, name: &str) -> Option<CacheEntry> {
        let has_corpus = dir.join(CORPUS_FILE_NAME).is_file();
        let from_manifest = match CorpusManifest::load(dir) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::debug!(dir = %dir.display(), error = %e, "Ignoring unreadable manifest");
                None
            }
        };

        if let Some(manifest) = from_manifest {
            return Some(CacheEntry {
                dir: dir.to_path_buf(),
                walk_length: manifest.walk_length,
                walk_number: manifest.walk_number,
                source: ParameterSource::Manifest,
                complete: Some(manifest.complete),
                has_corpus,
            });
        }

        let (walk_length, walk_number) = parse_directory_name(name)?;
        Some(CacheEntry {
            dir: dir.to_path_buf(),
            walk_length,
            walk_number,
            source: ParameterSource::DirectoryName,
            complete: None,
            has_corpus,
        })
    }
}

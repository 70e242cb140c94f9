use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::manifest::CorpusManifest;
use super::{directory_name, CORPUS_FILE_NAME};
use crate::errors::CorpusError;
use crate::walker::{Walk, WalkSink};

/// Creates corpus directories.
pub struct CorpusStore;

impl CorpusStore {
    /// Creates `{root}/{prefix}_{walk_length}_{walk_number}` and opens its
    /// corpus file for appending.
    ///
    /// Refuses to touch a directory that already holds a corpus file.
    pub fn create(
        root: &Path,
        prefix: &str,
        walk_length: usize,
        walk_number: usize,
    ) -> Result<CorpusWriter, CorpusError> {
        let dir = root.join(directory_name(prefix, walk_length, walk_number));
        std::fs::create_dir_all(&dir).map_err(|e| CorpusError::io(&dir, e))?;

        let path = dir.join(CORPUS_FILE_NAME);
        if path.exists() {
            return Err(CorpusError::AlreadyExists(path));
        }

        let manifest = CorpusManifest::new(prefix, walk_length, walk_number);
        manifest.store(&dir)?;

        let file = open_append(&path)?;
        tracing::debug!(dir = %dir.display(), "Created corpus directory");
        Ok(CorpusWriter {
            dir,
            path,
            out: BufWriter::new(file),
            manifest,
            walks_written: 0,
        })
    }
}

fn open_append(path: &Path) -> Result<File, CorpusError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CorpusError::io(path, e))
}

/// Append-only sink for one corpus directory.
///
/// Owned by a single thread; every batch lands after the previous one.
pub struct CorpusWriter {
    dir: PathBuf,
    path: PathBuf,
    out: BufWriter<File>,
    manifest: CorpusManifest,
    walks_written: u64,
}

impl CorpusWriter {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn corpus_path(&self) -> &Path {
        &self.path
    }

    pub fn walks_written(&self) -> u64 {
        self.walks_written
    }

    /// Appends `batch` one walk per line and flushes it to disk.
    pub fn append_batch(&mut self, batch: &[Walk]) -> Result<(), CorpusError> {
        for walk in batch {
            serde_json::to_writer(&mut self.out, walk).map_err(CorpusError::Serialize)?;
            self.out
                .write_all(b"\n")
                .map_err(|e| CorpusError::io(&self.path, e))?;
        }
        self.out.flush().map_err(|e| CorpusError::io(&self.path, e))?;
        self.walks_written += batch.len() as u64;
        Ok(())
    }

    /// Flushes and marks the manifest complete.
    pub fn finish(mut self) -> Result<CorpusManifest, CorpusError> {
        self.out.flush().map_err(|e| CorpusError::io(&self.path, e))?;
        self.out
            .get_ref()
            .sync_all()
            .map_err(|e| CorpusError::io(&self.path, e))?;

        let mut manifest = self.manifest.clone();
        manifest.complete = true;
        manifest.walks_written = self.walks_written;
        manifest.nodes_written = self.walks_written / manifest.walk_number.max(1) as u64;
        manifest.store(&self.dir)?;

        tracing::info!(
            dir = %self.dir.display(),
            walks = manifest.walks_written,
            "Corpus complete"
        );
        Ok(manifest)
    }
}

impl WalkSink for CorpusWriter {
    fn flush_batch(&mut self, batch: &[Walk]) -> Result<(), CorpusError> {
        self.append_batch(batch)
    }
}

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use super::manifest::CorpusManifest;
use super::{parse_directory_name, WalkIter, WalkSource, CORPUS_FILE_NAME};
use crate::errors::CorpusError;
use crate::walker::Walk;

/// Lazy view of a stored corpus at (possibly smaller) requested parameters.
///
/// Of every `stored_walk_number` consecutive lines only the first
/// `requested_walk_number` are kept, each cut to `requested_walk_length`
/// tokens. Iteration reopens the file, so the reader can be walked repeatedly.
#[derive(Debug, Clone)]
pub struct CorpusReader {
    dir: PathBuf,
    path: PathBuf,
    stored_walk_length: usize,
    stored_walk_number: usize,
    walk_length: usize,
    walk_number: usize,
}

impl CorpusReader {
    /// Opens `dir`, taking the stored parameters from its manifest or, for
    /// directories written without one, from the `_{length}_{number}` suffix
    /// of the directory name.
    pub fn open(dir: &Path, walk_length: usize, walk_number: usize) -> Result<Self, CorpusError> {
        let (stored_length, stored_number) = match CorpusManifest::load(dir)? {
            Some(manifest) => (manifest.walk_length, manifest.walk_number),
            None => dir
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_directory_name)
                .ok_or_else(|| CorpusError::UnknownParameters(dir.to_path_buf()))?,
        };
        Self::with_stored(dir, stored_length, stored_number, walk_length, walk_number)
    }

    /// Opens `dir` with already known stored parameters.
    pub fn with_stored(
        dir: &Path,
        stored_walk_length: usize,
        stored_walk_number: usize,
        walk_length: usize,
        walk_number: usize,
    ) -> Result<Self, CorpusError> {
        if walk_length == 0
            || walk_number == 0
            || stored_walk_number == 0
            || walk_length > stored_walk_length
            || walk_number > stored_walk_number
        {
            return Err(CorpusError::Incompatible {
                stored_length: stored_walk_length,
                stored_number: stored_walk_number,
                requested_length: walk_length,
                requested_number: walk_number,
            });
        }

        let path = dir.join(CORPUS_FILE_NAME);
        if !path.is_file() {
            return Err(CorpusError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "corpus file missing"),
            ));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            path,
            stored_walk_length,
            stored_walk_number,
            walk_length,
            walk_number,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// (walk_length, walk_number) the corpus was generated with.
    pub fn stored_parameters(&self) -> (usize, usize) {
        (self.stored_walk_length, self.stored_walk_number)
    }

    /// (walk_length, walk_number) the reader yields.
    pub fn requested_parameters(&self) -> (usize, usize) {
        (self.walk_length, self.walk_number)
    }

    /// Starts a new pass from the top of the file.
    pub fn iter(&self) -> Result<CorpusIter, CorpusError> {
        let file = File::open(&self.path).map_err(|e| CorpusError::io(&self.path, e))?;
        Ok(CorpusIter {
            lines: BufReader::new(file).lines(),
            path: self.path.clone(),
            line_no: 0,
            stored_walk_number: self.stored_walk_number,
            walk_length: self.walk_length,
            walk_number: self.walk_number,
        })
    }
}

impl WalkSource for CorpusReader {
    fn walks(&self) -> Result<WalkIter<'_>, CorpusError> {
        Ok(Box::new(self.iter()?))
    }
}

/// One pass over a corpus file.
pub struct CorpusIter {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line_no: usize,
    stored_walk_number: usize,
    walk_length: usize,
    walk_number: usize,
}

impl Iterator for CorpusIter {
    type Item = Result<Walk, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(CorpusError::io(&self.path, e))),
            };
            let position = self.line_no % self.stored_walk_number;
            self.line_no += 1;
            if position >= self.walk_number {
                continue;
            }

            return Some(match serde_json::from_str::<Walk>(&line) {
                Ok(mut walk) => {
                    walk.truncate(self.walk_length);
                    Ok(walk)
                }
                Err(source) => Err(CorpusError::MalformedLine {
                    path: self.path.clone(),
                    line: self.line_no,
                    source,
                }),
            });
        }
    }
}

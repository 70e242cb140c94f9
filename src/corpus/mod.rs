//! On-disk walk corpus
//!
//! A corpus directory is named `{prefix}_{walk_length}_{walk_number}` and holds
//! `walks_dump.jsonl`, one JSON array of node-id strings per line, grouped
//! `walk_number` lines per source node in generation order, plus a
//! `manifest.json` sidecar describing how it was produced.

mod manifest;
mod reader;
mod writer;

pub use manifest::{CorpusManifest, MANIFEST_FILE_NAME, MANIFEST_FORMAT_VERSION};
pub use reader::{CorpusIter, CorpusReader};
pub use writer::{CorpusStore, CorpusWriter};

use crate::errors::CorpusError;
use crate::walker::Walk;

/// Name of the walk file inside every corpus directory.
pub const CORPUS_FILE_NAME: &str = "walks_dump.jsonl";

/// Directory name for a corpus generated with the given parameters.
pub fn directory_name(prefix: &str, walk_length: usize, walk_number: usize) -> String {
    format!("{prefix}_{walk_length}_{walk_number}")
}

/// Recovers `(walk_length, walk_number)` from the trailing `_{length}_{number}`
/// of a corpus directory name.
pub fn parse_directory_name(name: &str) -> Option<(usize, usize)> {
    let mut parts = name.rsplitn(3, '_');
    let number = parts.next()?.parse().ok()?;
    let length = parts.next()?.parse().ok()?;
    parts.next().filter(|head| !head.is_empty())?;
    Some((length, number))
}

/// Lazy single pass over a corpus.
pub type WalkIter<'a> = Box<dyn Iterator<Item = Result<Walk, CorpusError>> + 'a>;

/// A corpus that can be iterated from the start any number of times.
///
/// Each call to [`WalkSource::walks`] opens a fresh pass; the returned
/// iterator itself is single-pass.
pub trait WalkSource {
    fn walks(&self) -> Result<WalkIter<'_>, CorpusError>;
}

impl WalkSource for Vec<Walk> {
    fn walks(&self) -> Result<WalkIter<'_>, CorpusError> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }
}

impl WalkSource for [Walk] {
    fn walks(&self) -> Result<WalkIter<'_>, CorpusError> {
        Ok(Box::new(self.iter().cloned().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_name_round_trips_through_parser() {
        let name = directory_name("prewalking_deepwalk", 80, 10);
        assert_eq!(parse_directory_name(&name), Some((80, 10)));
    }

    #[test]
    fn parser_reads_only_the_last_two_fields() {
        assert_eq!(parse_directory_name("prewalking_deepwalk_v2_80_10"), Some((80, 10)));
        assert_eq!(parse_directory_name("80_10"), None);
        assert_eq!(parse_directory_name("_80_10"), None);
        assert_eq!(parse_directory_name("walks_x_10"), None);
        assert_eq!(parse_directory_name("walks_80"), None);
    }
}

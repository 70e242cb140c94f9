//! Corpus storage and cache resolution against real directories

mod common;

use std::fs;

use tempfile::TempDir;

use graphwalk::cache::ParameterSource;
use graphwalk::corpus::{directory_name, CorpusManifest, CORPUS_FILE_NAME};
use graphwalk::{CacheResolver, CorpusReader, CorpusStore, RandomWalker, Walk, WalkParams};

use common::{collect_walks, path_table};

const PREFIX: &str = "prewalking_deepwalk";

fn seeded_walker(walk_length: usize, walk_number: usize) -> RandomWalker {
    let params = WalkParams {
        seed: Some(7),
        dump_size: 3,
        workers: 2,
        ..WalkParams::new(walk_length, walk_number)
    };
    RandomWalker::new(params).unwrap()
}

/// Writes a finished corpus for `graph` and returns the in-memory walks too.
fn store_corpus(root: &TempDir, walk_length: usize, walk_number: usize) -> Vec<Walk> {
    let graph = path_table(6);
    let walker = seeded_walker(walk_length, walk_number);
    let mut writer = CorpusStore::create(root.path(), PREFIX, walk_length, walk_number).unwrap();
    walker.do_walks(&graph, Some(&mut writer)).unwrap();
    writer.finish().unwrap();
    walker.do_walks(&graph, None).unwrap()
}

fn make_bare_corpus_dir(root: &TempDir, name: &str) {
    let dir = root.path().join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(CORPUS_FILE_NAME), "[\"0\",\"1\"]\n").unwrap();
}

#[test]
fn stored_corpus_reads_back_in_write_order() {
    let root = TempDir::new().unwrap();
    let expected = store_corpus(&root, 8, 3);

    let dir = root.path().join(directory_name(PREFIX, 8, 3));
    let reader = CorpusReader::open(&dir, 8, 3).unwrap();

    assert_eq!(collect_walks(&reader), expected);
    // A second pass starts from the beginning again
    assert_eq!(collect_walks(&reader), expected);
}

#[test]
fn smaller_request_keeps_leading_walks_per_node() {
    let root = TempDir::new().unwrap();
    let stored = store_corpus(&root, 10, 4);

    let dir = root.path().join(directory_name(PREFIX, 10, 4));
    let reader = CorpusReader::open(&dir, 6, 2).unwrap();
    let walks = collect_walks(&reader);

    let expected: Vec<Walk> = stored
        .iter()
        .enumerate()
        .filter(|(position, _)| position % 4 < 2)
        .map(|(_, walk)| walk.iter().take(6).cloned().collect())
        .collect();
    assert_eq!(walks.len(), 6 * 2);
    assert_eq!(walks, expected);
    assert!(walks.iter().all(|walk| walk.len() <= 6));
}

#[test]
fn finished_corpus_carries_complete_manifest() {
    let root = TempDir::new().unwrap();
    store_corpus(&root, 5, 2);

    let dir = root.path().join(directory_name(PREFIX, 5, 2));
    let manifest = CorpusManifest::load(&dir).unwrap().unwrap();

    assert!(manifest.complete);
    assert_eq!(manifest.walks_written, 12);
    assert_eq!(manifest.nodes_written, 6);
    assert_eq!((manifest.walk_length, manifest.walk_number), (5, 2));
}

#[test]
fn missing_root_is_a_miss() {
    let root = TempDir::new().unwrap();
    let resolver = CacheResolver::new(Some(root.path().join("absent")), PREFIX);
    assert_eq!(resolver.resolve(10, 2).unwrap(), None);

    let disabled = CacheResolver::new(None, PREFIX);
    assert_eq!(disabled.resolve(10, 2).unwrap(), None);
}

#[test]
fn resolver_matches_prefix_case_insensitively() {
    let root = TempDir::new().unwrap();
    make_bare_corpus_dir(&root, "PreWalking_DeepWalk_80_10");

    let resolver = CacheResolver::new(Some(root.path().to_path_buf()), PREFIX);
    let entry = resolver.resolve(40, 5).unwrap().unwrap();

    assert_eq!((entry.walk_length, entry.walk_number), (80, 10));
    assert_eq!(entry.source, ParameterSource::DirectoryName);
    assert_eq!(entry.complete, None);
}

#[test]
fn resolver_skips_unusable_entries() {
    let root = TempDir::new().unwrap();
    // Other prefix
    make_bare_corpus_dir(&root, "node2vec_80_10");
    // Unparseable parameters
    make_bare_corpus_dir(&root, "prewalking_deepwalk_long_ten");
    // Parameters too small
    make_bare_corpus_dir(&root, "prewalking_deepwalk_20_10");
    // No corpus file
    fs::create_dir_all(root.path().join("prewalking_deepwalk_100_20")).unwrap();
    // Stray file at the top level
    fs::write(root.path().join("prewalking_deepwalk_90_90"), "").unwrap();

    let resolver = CacheResolver::new(Some(root.path().to_path_buf()), PREFIX);
    assert_eq!(resolver.resolve(40, 5).unwrap(), None);
}

#[test]
fn manifest_parameters_win_over_directory_name() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("prewalking_deepwalk_imported");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(CORPUS_FILE_NAME), "").unwrap();
    CorpusManifest::new(PREFIX, 30, 6).store(&dir).unwrap();

    let resolver = CacheResolver::new(Some(root.path().to_path_buf()), PREFIX);
    let entry = resolver.resolve(30, 6).unwrap().unwrap();

    assert_eq!(entry.dir, dir);
    assert_eq!(entry.source, ParameterSource::Manifest);
}

#[test]
fn resolve_returns_first_qualifying_entry_in_listing_order() {
    let root = TempDir::new().unwrap();
    make_bare_corpus_dir(&root, "prewalking_deepwalk_80_10");
    make_bare_corpus_dir(&root, "prewalking_deepwalk_20_2");
    make_bare_corpus_dir(&root, "prewalking_deepwalk_40_5");
    make_bare_corpus_dir(&root, "prewalking_deepwalk_200_50");

    let first_listed = fs::read_dir(root.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| !path.ends_with("prewalking_deepwalk_20_2"))
        .unwrap();

    let resolver = CacheResolver::new(Some(root.path().to_path_buf()), PREFIX);
    let entry = resolver.resolve(40, 5).unwrap().unwrap();

    assert_eq!(entry.dir, first_listed);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_does_not_hide_valid_corpus() {
    let root = TempDir::new().unwrap();
    make_bare_corpus_dir(&root, "prewalking_deepwalk_80_10");
    std::os::unix::fs::symlink(
        root.path().join("gone"),
        root.path().join("prewalking_deepwalk_90_90"),
    )
    .unwrap();

    let resolver = CacheResolver::new(Some(root.path().to_path_buf()), PREFIX);
    let entry = resolver.resolve(10, 2).unwrap().unwrap();

    assert_eq!(entry.dir, root.path().join("prewalking_deepwalk_80_10"));
}

#[test]
fn interrupted_corpus_is_still_offered() {
    let root = TempDir::new().unwrap();
    let graph = path_table(4);
    {
        let mut writer = CorpusStore::create(root.path(), PREFIX, 5, 2).unwrap();
        seeded_walker(5, 2).do_walks(&graph, Some(&mut writer)).unwrap();
        // Dropped without finish()
    }

    let resolver = CacheResolver::new(Some(root.path().to_path_buf()), PREFIX);
    let entry = resolver.resolve(5, 2).unwrap().unwrap();

    assert_eq!(entry.complete, Some(false));
    assert_eq!(entry.source, ParameterSource::Manifest);
}

#[test]
fn existing_corpus_is_never_overwritten() {
    let root = TempDir::new().unwrap();
    store_corpus(&root, 5, 2);

    let err = CorpusStore::create(root.path(), PREFIX, 5, 2)
        .err()
        .expect("second create must be refused");
    assert!(err.to_string().contains(CORPUS_FILE_NAME));
}

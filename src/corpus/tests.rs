//! Document Store Tests
//!
//! Validates corpus loading from disk.
//!
//! ## Test Scopes
//! - **Eligibility**: extension filtering and recursive discovery.
//! - **Identity & Order**: relative-path ids, sorted iteration order.
//! - **Failures**: unreadable directory, empty directory, oversized documents.
//! - **Resilience**: dangling symlinks and link loops are skipped, not fatal.
//! - **Partitioning**: round-robin shard selection.

#[cfg(test)]
mod tests {
    use crate::corpus::{DocumentId, LoadOptions, load};
    use crate::error::{CorpusError, ScanError};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &[u8]) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn ids(shard: &crate::corpus::CorpusShard) -> Vec<String> {
        shard.documents().iter().map(|d| d.id.0.clone()).collect()
    }

    #[test]
    fn test_load_reads_all_eligible_files_in_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.txt", b"second");
        write(dir.path(), "a.txt", b"first");
        write(dir.path(), "nested/c.txt", b"third");
        write(dir.path(), "ignored.bin", b"binary");

        let shard = load(dir.path(), &LoadOptions::default()).unwrap();

        assert_eq!(ids(&shard), vec!["a.txt", "b.txt", "nested/c.txt"]);
        assert_eq!(shard.documents()[0].bytes(), b"first");
        assert_eq!(shard.total_bytes(), "firstsecondthird".len());
        assert_eq!(shard.root(), dir.path());
    }

    #[test]
    fn test_hidden_files_and_gitignore_are_not_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".gitignore", b"*.txt\n");
        write(dir.path(), ".hidden.txt", b"hidden");
        write(dir.path(), "plain.txt", b"plain");

        let shard = load(dir.path(), &LoadOptions::default()).unwrap();

        assert_eq!(ids(&shard), vec![".hidden.txt", "plain.txt"]);
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "upper.TXT", b"x");
        write(dir.path(), "notes.md", b"y");

        let options = LoadOptions {
            extensions: vec!["txt".to_string(), ".md".to_string()],
            ..LoadOptions::default()
        };
        let shard = load(dir.path(), &options).unwrap();

        assert_eq!(ids(&shard), vec!["notes.md", "upper.TXT"]);
    }

    #[test]
    fn test_missing_directory_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = load(&missing, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, CorpusError::Unreadable { .. }));
    }

    #[test]
    fn test_file_instead_of_directory_is_unreadable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "file.txt", b"x");

        let err = load(&dir.path().join("file.txt"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, CorpusError::Unreadable { .. }));
    }

    #[test]
    fn test_directory_without_eligible_files_is_empty_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "image.png", b"\x89PNG");

        let err = load(dir.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, CorpusError::Empty { .. }));
    }

    #[test]
    fn test_oversized_document_fails_fast() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small.txt", b"ok");
        write(dir.path(), "large.txt", &[b'x'; 128]);

        let options = LoadOptions {
            max_document_bytes: 64,
            ..LoadOptions::default()
        };
        let err = load(dir.path(), &options).unwrap_err();

        match err {
            CorpusError::DocumentTooLarge { size, limit, .. } => {
                assert_eq!(size, 128);
                assert_eq!(limit, 64);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_entries_are_skipped() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", b"alpha");
        symlink(dir.path().join("gone.log"), dir.path().join("stale.log")).unwrap();
        symlink(dir.path().join("gone.txt"), dir.path().join("stale.txt")).unwrap();
        symlink(dir.path(), dir.path().join("loop")).unwrap();

        let shard = load(dir.path(), &LoadOptions::default()).unwrap();

        assert_eq!(ids(&shard), vec!["a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_only_broken_entries_is_empty_error() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        symlink(dir.path().join("gone.txt"), dir.path().join("stale.txt")).unwrap();

        let err = load(dir.path(), &LoadOptions::default()).unwrap_err();

        assert!(matches!(err, CorpusError::Empty { .. }));
    }

    #[test]
    fn test_round_robin_partitioning() {
        let dir = TempDir::new().unwrap();
        for name in ["a", "b", "c", "d", "e"] {
            write(dir.path(), &format!("{name}.txt"), name.as_bytes());
        }

        let shard_of = |index| {
            let options = LoadOptions {
                shard_index: index,
                shard_count: 2,
                ..LoadOptions::default()
            };
            ids(&load(dir.path(), &options).unwrap())
        };

        assert_eq!(shard_of(0), vec!["a.txt", "c.txt", "e.txt"]);
        assert_eq!(shard_of(1), vec!["b.txt", "d.txt"]);
    }

    #[test]
    fn test_partition_without_documents_still_loads() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "only.txt", b"x");

        let options = LoadOptions {
            shard_index: 2,
            shard_count: 3,
            ..LoadOptions::default()
        };
        let shard = load(dir.path(), &options).unwrap();

        assert!(shard.is_empty());
    }

    #[test]
    fn test_document_lookup_and_text_decoding() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.txt", "zażółć".as_bytes());
        write(dir.path(), "bad.txt", &[0xff, 0xfe, b'a']);

        let shard = load(dir.path(), &LoadOptions::default()).unwrap();

        let good = shard.get(&DocumentId("good.txt".to_string())).unwrap();
        assert_eq!(good.text().unwrap(), "zażółć");

        let bad = shard.get(&DocumentId("bad.txt".to_string())).unwrap();
        assert!(matches!(bad.text(), Err(ScanError::Decoding { .. })));
    }
}

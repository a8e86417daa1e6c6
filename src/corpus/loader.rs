use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{CorpusShard, Document, DocumentId};
use crate::error::CorpusError;

pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 64 * 1024 * 1024;

/// Controls which files become documents of this worker's shard.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Accepted file extensions, compared case-insensitively, without the dot.
    pub extensions: Vec<String>,
    /// Any eligible file above this size aborts the load.
    pub max_document_bytes: u64,
    pub shard_index: usize,
    pub shard_count: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".to_string()],
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            shard_index: 0,
            shard_count: 1,
        }
    }
}

impl LoadOptions {
    fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    fn keeps(&self, position: usize) -> bool {
        self.shard_count <= 1 || position % self.shard_count == self.shard_index
    }
}

/// Reads every eligible file under `root` into memory.
///
/// Fails if the directory cannot be read, holds no eligible file, or holds a kept
/// file larger than `options.max_document_bytes`. Individual entries that cannot be
/// walked or read are logged and left out.
pub fn load(root: &Path, options: &LoadOptions) -> Result<CorpusShard, CorpusError> {
    let metadata = fs::metadata(root).map_err(|source| CorpusError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(CorpusError::Unreadable {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let mut candidates = eligible_files(root, options);
    if candidates.is_empty() {
        return Err(CorpusError::Empty {
            path: root.to_path_buf(),
        });
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    let eligible = candidates.len();

    let mut documents = Vec::new();
    for (position, (id, path)) in candidates.into_iter().enumerate() {
        if !options.keeps(position) {
            continue;
        }
        match read_document(id, path, options.max_document_bytes) {
            Ok(document) => documents.push(document),
            Err(CorpusError::Unreadable { path, source }) => {
                tracing::warn!("Skipping unreadable document {}: {}", path.display(), source);
            }
            Err(e) => return Err(e),
        }
    }

    if documents.is_empty() {
        tracing::warn!(
            "Shard {}/{} of {} received none of {} eligible documents",
            options.shard_index,
            options.shard_count,
            root.display(),
            eligible
        );
    }

    let shard = CorpusShard::new(root, documents);
    tracing::info!(
        "Loaded {} of {} eligible documents ({} bytes) from {}",
        shard.len(),
        eligible,
        shard.total_bytes(),
        root.display()
    );

    Ok(shard)
}

/// Eligible files under `root`. Entries the walk cannot read are logged and skipped.
fn eligible_files(root: &Path, options: &LoadOptions) -> Vec<(DocumentId, PathBuf)> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry: DirEntry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable corpus entry: {}", e);
                continue;
            }
        };
        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
        if !is_file || !options.accepts(entry.path()) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push((document_id(relative), entry.path().to_path_buf()));
    }

    files
}

fn document_id(relative: &Path) -> DocumentId {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    DocumentId(parts.join("/"))
}

fn read_document(id: DocumentId, path: PathBuf, limit: u64) -> Result<Document, CorpusError> {
    let size = fs::metadata(&path)
        .map_err(|source| CorpusError::Unreadable {
            path: path.clone(),
            source,
        })?
        .len();
    if size > limit {
        return Err(CorpusError::DocumentTooLarge { path, size, limit });
    }

    let content = fs::read(&path).map_err(|source| CorpusError::Unreadable {
        path: path.clone(),
        source,
    })?;
    tracing::debug!("Loaded document {} ({} bytes)", id, content.len());

    Ok(Document::new(id, path, content))
}

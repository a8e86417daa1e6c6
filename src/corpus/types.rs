use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ScanError;

/// Stable identifier of a document: its `/`-separated path relative to the corpus root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single immutable document held in memory.
///
/// Content is kept as raw bytes; decoding is checked when the document is scanned so
/// a corrupt file only costs its own hits.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub source_path: PathBuf,
    content: Arc<[u8]>,
}

impl Document {
    pub fn new(id: DocumentId, source_path: PathBuf, content: Vec<u8>) -> Self {
        Self {
            id,
            source_path,
            content: content.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The content as UTF-8 text.
    pub fn text(&self) -> Result<&str, ScanError> {
        std::str::from_utf8(&self.content).map_err(|source| ScanError::Decoding {
            document: self.id.0.clone(),
            source,
        })
    }
}

/// The ordered documents assigned to one worker.
#[derive(Debug, Clone, Default)]
pub struct CorpusShard {
    root: PathBuf,
    documents: Vec<Document>,
}

impl CorpusShard {
    pub fn new(root: impl Into<PathBuf>, documents: Vec<Document>) -> Self {
        Self {
            root: root.into(),
            documents,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.documents.iter().map(Document::len).sum()
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| &doc.id == id)
    }
}

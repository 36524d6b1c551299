//! Document stores the repository loads from

use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::RepositoryError;

/// A raw source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Source path or file name
    pub id: String,
    /// Raw document text
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Slug implied by the file name (the id without directory and extension)
    pub fn file_slug(&self) -> String {
        Path::new(&self.id)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// Source of documents for a [`PostRepository`](super::PostRepository)
pub trait DocumentStore: Send + Sync {
    /// Load every document currently in the store
    fn load_documents(&self) -> impl Future<Output = Result<Vec<Document>, RepositoryError>> + Send;
}

/// Markdown files in a directory, selected by a glob pattern
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
    pattern: String,
}

impl FsStore {
    /// Create a store over `dir`, matching `pattern` relative to it (e.g. `*.md`)
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }
}

impl DocumentStore for FsStore {
    async fn load_documents(&self) -> Result<Vec<Document>, RepositoryError> {
        let dir = self.dir.clone();
        let pattern = self.pattern.clone();
        let location = dir.display().to_string();

        tokio::task::spawn_blocking(move || read_documents(&dir, &pattern))
            .await
            .map_err(|e| RepositoryError::load_failure(location, io::Error::other(e)))?
    }
}

/// Read all files matching the pattern, ordered by id
fn read_documents(dir: &Path, pattern: &str) -> Result<Vec<Document>, RepositoryError> {
    let location = dir.display().to_string();
    if !dir.is_dir() {
        return Err(RepositoryError::load_failure(
            location,
            io::Error::new(io::ErrorKind::NotFound, "posts directory does not exist"),
        ));
    }

    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let entries = glob::glob(&full_pattern).map_err(|e| RepositoryError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| RepositoryError::load_failure(&location, e.into_error()))?;
        if !path.is_file() {
            continue;
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| RepositoryError::load_failure(path.display().to_string(), e))?;
        let id = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        documents.push(Document { id, text });
    }

    documents.sort_by(|a, b| a.id.cmp(&b.id));
    tracing::debug!("Read {} documents from {}", documents.len(), location);

    Ok(documents)
}

/// Documents held in memory, e.g. drafts from an editor session
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Vec<Document>>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Arc::new(documents),
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn load_documents(&self) -> Result<Vec<Document>, RepositoryError> {
        Ok(self.documents.as_ref().clone())
    }
}

//! Filesystem storage for scanned milestone documents

use customs_domain::traits::DocumentStore;
use customs_domain::{CustomsError, DocumentRef, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// [`DocumentStore`] writing each document to its own file under a root
/// directory
///
/// The returned reference is the file name relative to the root.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Use `root` for documents, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Location of a stored document on disk
    pub fn path_of(&self, document: &DocumentRef) -> PathBuf {
        self.root.join(document.as_str())
    }
}

/// Keep only characters that are safe in a file name
fn sanitize(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

impl DocumentStore for FsDocumentStore {
    fn store(&self, file_name: &str, contents: &[u8]) -> Result<DocumentRef> {
        let name = format!("{}-{}", Uuid::now_v7().simple(), sanitize(file_name));
        let path = self.root.join(&name);
        fs::write(&path, contents)
            .map_err(|e| CustomsError::Storage(format!("cannot write {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "document stored");
        Ok(DocumentRef::new(name))
    }
}

//! Filesystem document store
//!
//! Lists and loads document files from the content directory. Nothing is
//! cached here: every listing re-reads the directory.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::descriptor::DocumentDescriptor;
use super::metadata::{split_header, FrontMatter, HeaderError};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Content directory {} cannot be read: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read document {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metadata header in document {id}: {source}")]
    Header {
        id: String,
        #[source]
        source: HeaderError,
    },
}

/// A document as stored: descriptor, raw header values and body
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub descriptor: DocumentDescriptor,
    pub front_matter: FrontMatter,
    pub body: String,
}

impl RawDocument {
    /// Parse a full source file into header and body
    pub fn parse(id: &str, source: &str) -> Result<Self, HeaderError> {
        let (front_matter, body) = split_header(source)?;
        Ok(Self {
            descriptor: DocumentDescriptor::from_front_matter(id, &front_matter),
            front_matter,
            body: body.to_string(),
        })
    }
}

/// Document ids are file stems restricted to `[A-Za-z0-9_-]`
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Document store over a directory of files
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    /// Accepted extensions, in lookup priority order
    extensions: Vec<String>,
}

impl DocumentStore {
    /// Create a store over `root` accepting the given extensions
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions: extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate every document in the store.
    ///
    /// Fails only when the directory itself cannot be read. Individual files
    /// that cannot be read or have a malformed header are skipped.
    pub async fn scan(&self) -> Result<Vec<DocumentDescriptor>, StoreError> {
        let unavailable = |source| StoreError::Unavailable {
            path: self.root.clone(),
            source,
        };

        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(unavailable)?;

        // id -> (extension priority, path)
        let mut candidates: HashMap<String, (usize, PathBuf)> = HashMap::new();
        while let Some(entry) = dir.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            let Some((id, priority)) = self.classify(&path) else {
                continue;
            };
            match candidates.get(&id) {
                Some((existing, _)) if *existing <= priority => {
                    tracing::debug!("Skipping {} (shadowed by higher priority extension)", path.display());
                }
                _ => {
                    candidates.insert(id, (priority, path));
                }
            }
        }

        let mut descriptors = Vec::with_capacity(candidates.len());
        for (id, (_, path)) in candidates {
            let source = match tokio::fs::read_to_string(&path).await {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Error reading document {}: {}", path.display(), e);
                    continue;
                }
            };
            match RawDocument::parse(&id, &source) {
                Ok(doc) => descriptors.push(doc.descriptor),
                Err(e) => tracing::warn!("Skipping document {} with invalid header: {}", id, e),
            }
        }

        tracing::debug!("Scanned {} documents in {}", descriptors.len(), self.root.display());
        Ok(descriptors)
    }

    /// Load one document by id; `None` when no file matches.
    pub async fn load(&self, id: &str) -> Result<Option<RawDocument>, StoreError> {
        if !is_valid_id(id) {
            return Ok(None);
        }

        for ext in &self.extensions {
            let path = self.root.join(format!("{}.{}", id, ext));
            match tokio::fs::read_to_string(&path).await {
                Ok(source) => {
                    return RawDocument::parse(id, &source)
                        .map(Some)
                        .map_err(|source| StoreError::Header {
                            id: id.to_string(),
                            source,
                        });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(StoreError::Io {
                        id: id.to_string(),
                        source,
                    })
                }
            }
        }

        Ok(None)
    }

    /// Map a path to its document id and extension priority
    fn classify(&self, path: &Path) -> Option<(String, usize)> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let priority = self.extensions.iter().position(|e| *e == ext)?;
        let stem = path.file_stem()?.to_str()?;
        is_valid_id(stem).then(|| (stem.to_string(), priority))
    }
}

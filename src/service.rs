//! Content service
//!
//! List and detail operations over the document store. Both are read-only;
//! nothing is cached between requests.

use std::cmp::Ordering;

use crate::document::{CompiledDocument, Compiler};
use crate::error::{AppError, Result};
use crate::library::{is_valid_id, DocumentDescriptor, DocumentStore};

#[derive(Debug, Clone)]
pub struct ContentService {
    store: DocumentStore,
    compiler: Compiler,
}

impl ContentService {
    pub fn new(store: DocumentStore, compiler: Compiler) -> Self {
        Self { store, compiler }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Published documents, newest first.
    ///
    /// Fails as a whole when the store cannot be enumerated.
    pub async fn list_documents(&self) -> Result<Vec<DocumentDescriptor>> {
        let mut documents: Vec<DocumentDescriptor> = self
            .store
            .scan()
            .await?
            .into_iter()
            .filter(DocumentDescriptor::is_published)
            .collect();

        documents.sort_by(newest_first);
        Ok(documents)
    }

    /// Compile one document by id
    pub async fn get_document(&self, id: &str) -> Result<CompiledDocument> {
        if id.trim().is_empty() {
            return Err(AppError::BadRequest("Document id is required".to_string()));
        }
        if !is_valid_id(id) {
            return Err(AppError::BadRequest(format!("Invalid document id: {}", id)));
        }

        let Some(raw) = self.store.load(id).await? else {
            tracing::debug!("Document not found: {}", id);
            return Err(AppError::NotFound(format!("Document not found: {}", id)));
        };

        self.compiler
            .compile(&raw.body, raw.front_matter)
            .map_err(|source| AppError::Compile {
                id: id.to_string(),
                source,
            })
    }
}

/// Dated documents first, newest to oldest; ties by id
fn newest_first(a: &DocumentDescriptor, b: &DocumentDescriptor) -> Ordering {
    match (a.published_date, b.published_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

//! Content sources
//!
//! Defines the source trait and the HTTP implementation over the content API.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::document::CompiledDocument;
use crate::library::DocumentDescriptor;

/// Client-side fetch errors.
///
/// `Clone` because every waiter on a shared fetch receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether retrying the same request can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Server { status, .. } => *status >= 500,
            FetchError::NotFound(_) | FetchError::Decode(_) => false,
        }
    }
}

/// Where compiled documents come from
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Published descriptors in display order
    async fn list_documents(&self) -> Result<Vec<DocumentDescriptor>, FetchError>;

    /// Compiled document by id
    async fn fetch_document(&self, id: &str) -> Result<CompiledDocument, FetchError>;
}

/// Error body returned by the content API
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Content API client
pub struct HttpContentSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn document_url(&self, id: &str) -> String {
        format!("{}/documents/{}", self.base_url, urlencoding::encode(id))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, id: Option<&str>) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to call {}: {}", url, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(FetchError::NotFound(id.to_string()));
            }
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(FetchError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(format!("Failed to parse response from {}: {}", url, e)))
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn list_documents(&self) -> Result<Vec<DocumentDescriptor>, FetchError> {
        let url = format!("{}/documents", self.base_url);
        self.get_json(&url, None).await
    }

    async fn fetch_document(&self, id: &str) -> Result<CompiledDocument, FetchError> {
        tracing::debug!("Fetching document {}", id);
        self.get_json(&self.document_url(id), Some(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::document::RenderNode;
    use crate::routes;
    use crate::state::AppState;
    use std::fs;
    use tempfile::TempDir;

    /// Serve the content API over a fixture directory on an ephemeral port
    async fn serve() -> (TempDir, HttpContentSource) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hello.mdx"),
            "---\ntitle: Hello\npublishedAt: 2024-05-01\n---\n# Hello\n\n```rust\nfn main() {}\n```\n",
        )
        .unwrap();
        fs::write(dir.path().join("broken.mdx"), "---\ntitle: Broken\n---\n| a |\n| b |\n").unwrap();

        let mut config = Config::default();
        config.content.dir = dir.path().to_path_buf();
        let app = routes::app(AppState::new(config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (dir, HttpContentSource::new(&format!("http://{}", addr)))
    }

    #[tokio::test]
    async fn test_fetch_document_decodes_render_tree() {
        let (_dir, source) = serve().await;
        let document = source.fetch_document("hello").await.unwrap();

        assert_eq!(document.front_matter["title"], "Hello");
        let children = document.render_tree.children();
        assert!(matches!(&children[0], RenderNode::Heading { level: 1, id, .. } if id == "hello"));
        assert!(matches!(&children[1], RenderNode::CodeBlock(code) if code.language == "rust"));
    }

    #[tokio::test]
    async fn test_list_documents() {
        let (_dir, source) = serve().await;
        let listing = source.list_documents().await.unwrap();

        let ids: Vec<&str> = listing.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["hello", "broken"]);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let (_dir, source) = serve().await;
        assert_eq!(
            source.fetch_document("nope").await.unwrap_err(),
            FetchError::NotFound("nope".to_string())
        );
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let (_dir, source) = serve().await;
        let err = source.fetch_document("broken").await.unwrap_err();

        assert_eq!(
            err,
            FetchError::Server {
                status: 500,
                message: "Document could not be rendered".to_string(),
            }
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpContentSource::new(&format!("http://{}", addr));
        assert!(matches!(
            source.fetch_document("hello").await,
            Err(FetchError::Network(_))
        ));
    }

    #[test]
    fn test_document_url_is_encoded() {
        let source = HttpContentSource::new("http://localhost:3000/");
        assert_eq!(source.document_url("hello-world"), "http://localhost:3000/documents/hello-world");
        assert_eq!(source.document_url("a b"), "http://localhost:3000/documents/a%20b");
    }

    #[test]
    fn test_retryable() {
        assert!(FetchError::Network("reset".into()).is_retryable());
        assert!(FetchError::Server { status: 503, message: String::new() }.is_retryable());
        assert!(!FetchError::Server { status: 400, message: String::new() }.is_retryable());
        assert!(!FetchError::NotFound("x".into()).is_retryable());
    }
}

//! Document API endpoints
//!
//! - `GET /documents`: published descriptors, newest first
//! - `GET /documents/:id`: compiled render tree and front matter

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::document::CompiledDocument;
use crate::error::{AppError, Result};
use crate::library::DocumentDescriptor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_documents))
        .route("/documents/", get(missing_id))
        .route("/documents/:id", get(get_document))
}

async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<DocumentDescriptor>>> {
    let documents = state.service().list_documents().await?;
    tracing::debug!("Listing {} published documents", documents.len());
    Ok(Json(documents))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompiledDocument>> {
    let document = state.service().get_document(&id).await?;
    Ok(Json(document))
}

async fn missing_id() -> AppError {
    AppError::BadRequest("Document id is required".to_string())
}

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::Chunk;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl QueryRequest {
    fn require_query(&self) -> Result<&str, ApiError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(ApiError::Validation("query cannot be empty".to_string()));
        }
        Ok(query)
    }
}

pub async fn embed(
    State(state): State<Arc<AppState>>,
    Json(chunks): Json<Vec<Chunk>>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.engine.ingest(chunks).await?;
    Ok(Json(json!({
        "status": "ok",
        "chunks_added": report.accepted,
        "total_chunks": report.total,
    })))
}

pub async fn has_content(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> impl IntoResponse {
    let url = payload.url.as_deref();
    let ready = state.engine.is_ready(url).await;
    let chunks = state.engine.chunk_count(url).await;
    Json(json!({ "ready": ready, "chunks": chunks }))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = payload.require_query()?;
    let top_k = state.engine.resolve_top_k(payload.top_k);
    let retrieval = state
        .engine
        .query(query, payload.url.as_deref(), top_k)
        .await?;

    Ok(Json(json!({
        "status": retrieval.status(),
        "chunks": retrieval.chunks(),
        "chunks_used": retrieval.used_count(),
    })))
}

pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = payload.require_query()?;
    let top_k = state.engine.resolve_top_k(payload.top_k);
    let summary = state
        .summarizer
        .summarize(query, payload.url.as_deref(), top_k)
        .await?;
    Ok(Json(summary))
}

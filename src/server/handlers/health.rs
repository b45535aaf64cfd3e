use std::sync::Arc;

use axum::extract::State;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({ "status": "RAG server running" }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.engine.store().stats().await;
    Json(json!({
        "status": "ok",
        "started_at": state.started_at.to_rfc3339(),
        "store": stats,
        "embedding_provider": state.engine.embedder().provider_name(),
        "generation_provider": state.summarizer.generator().provider_name(),
        "deduplicate": state.engine.config().deduplicate,
    }))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

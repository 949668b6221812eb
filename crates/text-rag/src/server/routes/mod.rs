//! API route handlers

pub mod ask;

use crate::server::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Build the API router
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ask", post(ask::ask))
        .route("/info", get(info))
}

/// Describe the running service
async fn info(State(state): State<AppState>) -> Json<Value> {
    let config = state.config();
    let index = state.index();

    Json(json!({
        "name": "text-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "corpus": {
            "data_file": config.corpus.data_file.display().to_string(),
            "chunks_indexed": index.len(),
            "chunk_size": config.chunking.chunk_size,
            "chunk_overlap": config.chunking.chunk_overlap,
        },
        "models": {
            "embedder": index.embedder_identity().to_string(),
            "chat": config.openai.chat_model,
        },
        "defaults": {
            "k": 3,
            "temperature": 0.2,
        },
        "endpoints": {
            "ask": "POST /api/ask",
            "info": "GET /api/info",
            "health": "GET /health",
            "ready": "GET /ready",
        },
    }))
}

//! The ask endpoint

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskRequest, AskResponse};
use axum::{extract::State, Json};
use std::time::Instant;

/// Answer a question against the indexed corpus
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    let start = Instant::now();
    request.validate()?;

    tracing::info!(
        question_chars = request.question.chars().count(),
        k = request.k,
        temperature = request.temperature,
        "Processing question"
    );

    let session = state.session(request.k, request.temperature)?;
    let result = session.ask(&request.question).await?;
    let meta = result.render_meta(request.show_snippets);

    let processing_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        chunks_retrieved = result.chunks.len(),
        processing_time_ms,
        "Answered question"
    );

    Ok(Json(AskResponse {
        answer: result.answer,
        meta,
        chunks_retrieved: result.chunks.len(),
        processing_time_ms,
    }))
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;
use types::{ErrorResponse, SummaryResponse};

use crate::{
    pipeline::{self, PipelineError},
    structs::AppState,
    summarizer::Summarizer,
    timedtext::IdValidator,
    transcript::TranscriptSource,
};

pub async fn home() -> &'static str {
    "Hello, World!"
}

#[instrument]
pub async fn health() -> impl IntoResponse {
    tracing::info!("health check");

    Json(json!({ "status" : "UP" }))
}

/// Summarizes the transcript of the video named in the path.
#[instrument(skip(state))]
pub async fn transcript_summary_handler<V, T, S>(
    State(state): State<AppState<V, T, S>>,
    Path(video_id): Path<String>,
) -> Result<Json<SummaryResponse>, PipelineError>
where
    V: IdValidator,
    T: TranscriptSource,
    S: Summarizer,
{
    let summary = pipeline::summarize_video(&state, &video_id).await?;

    Ok(Json(SummaryResponse { summary }))
}

pub async fn missing_video_id_handler() -> PipelineError {
    PipelineError::InputMissing
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("not found")))
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use types::ErrorResponse;

use crate::{
    structs::AppState,
    summarizer::Summarizer,
    timedtext::IdValidator,
    transcript::{self, TranscriptError, TranscriptSource},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("video id not provided")]
    InputMissing,

    #[error("video id {0} has no caption track")]
    InvalidVideoId(String),

    #[error("failed to validate video id: {0}")]
    ValidationFailed(#[source] BoxError),

    #[error("failed to fetch transcript: {0}")]
    FetchFailed(#[source] BoxError),

    #[error("failed to parse transcript: {0}")]
    ParseFailed(#[source] transcript::ExtractError),

    #[error("failed to summarize transcript: {0}")]
    SummarizeFailed(#[source] BoxError),
}

impl From<TranscriptError> for PipelineError {
    fn from(error: TranscriptError) -> Self {
        match error {
            TranscriptError::Fetch(source) => Self::FetchFailed(source),
            TranscriptError::Extract(source) => Self::ParseFailed(source),
        }
    }
}

impl PipelineError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InputMissing => StatusCode::BAD_REQUEST,
            Self::InvalidVideoId(_)
            | Self::ValidationFailed(_)
            | Self::FetchFailed(_)
            | Self::ParseFailed(_) => StatusCode::NOT_FOUND,
            Self::SummarizeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client. Internal detail stays in the logs.
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::InputMissing => "videoId not provided",
            Self::InvalidVideoId(_) | Self::ValidationFailed(_) => {
                "Invalid videoId"
            }
            Self::FetchFailed(_) | Self::ParseFailed(_) => {
                "Transcript not found"
            }
            Self::SummarizeFailed(_) => "Failed to process transcript",
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        match &self {
            Self::SummarizeFailed(_) | Self::ValidationFailed(_) => {
                tracing::error!("{self}");
            }
            _ => tracing::warn!("{self}"),
        }

        (
            self.status(),
            Json(ErrorResponse::new(self.public_message())),
        )
            .into_response()
    }
}

/// Runs validation, transcript retrieval and summarization for one video.
///
/// The first failing step ends the run; nothing is retried.
///
/// # Errors
///
/// The `PipelineError` of the step that failed.
pub async fn summarize_video<V, T, S>(
    state: &AppState<V, T, S>,
    video_id: &str,
) -> Result<String, PipelineError>
where
    V: IdValidator,
    T: TranscriptSource,
    S: Summarizer,
{
    if video_id.trim().is_empty() {
        return Err(PipelineError::InputMissing);
    }

    tracing::info!("request for video id: {video_id}");

    let valid = state
        .validator
        .validate(video_id)
        .await
        .map_err(|e| PipelineError::ValidationFailed(Box::new(e)))?;
    if !valid {
        return Err(PipelineError::InvalidVideoId(video_id.to_string()));
    }

    let entries =
        transcript::get_transcript(&state.transcripts, video_id).await?;
    let text = types::join_captions(&entries);

    tracing::info!(
        captions = entries.len(),
        transcript_len = text.len(),
        "transcript found for video id: {video_id}"
    );

    state
        .summarizer
        .summarize(&text)
        .await
        .map_err(|e| PipelineError::SummarizeFailed(Box::new(e)))
}

//! Test doubles: in-memory implementations of the pipeline traits and
//! throwaway local servers standing in for the remote endpoints.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;

use crate::{
    summarizer::Summarizer, timedtext::IdValidator,
    transcript::TranscriptSource,
};

pub const TWO_CAPTIONS: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0" dur="2">Hello</text><text start="2" dur="2">world</text></transcript>"#;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

type Calls = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Default)]
pub struct MockValidator {
    pub valid_ids: Vec<String>,
    pub fail_with: Option<String>,
    pub calls: Calls,
}

impl MockValidator {
    pub fn accepting(id: &str) -> Self {
        Self {
            valid_ids: vec![id.to_string()],
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl IdValidator for MockValidator {
    type Error = MockError;

    async fn validate(&self, video_id: &str) -> Result<bool, Self::Error> {
        self.calls.lock().unwrap().push(video_id.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(MockError(msg.clone()));
        }
        Ok(self.valid_ids.iter().any(|id| id == video_id))
    }
}

#[derive(Clone, Default)]
pub struct MockTranscripts {
    pub document: String,
    pub fail_with: Option<String>,
    pub calls: Calls,
}

impl MockTranscripts {
    pub fn new(document: &str) -> Self {
        Self {
            document: document.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl TranscriptSource for MockTranscripts {
    type Error = MockError;

    async fn fetch_document(
        &self,
        video_id: &str,
    ) -> Result<Vec<u8>, Self::Error> {
        self.calls.lock().unwrap().push(video_id.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(MockError(msg.clone()));
        }
        Ok(self.document.clone().into_bytes())
    }
}

#[derive(Clone, Default)]
pub struct MockSummarizer {
    pub summary: String,
    pub fail_with: Option<String>,
    pub calls: Calls,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl Summarizer for MockSummarizer {
    type Error = MockError;

    async fn summarize(&self, transcript: &str) -> Result<String, Self::Error> {
        self.calls.lock().unwrap().push(transcript.to_string());
        if let Some(ref msg) = self.fail_with {
            return Err(MockError(msg.clone()));
        }
        Ok(self.summary.clone())
    }
}

/// Serves `app` on an ephemeral local port and returns its base url.
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock server error: {e}");
        }
    });

    format!("http://{addr}")
}

/// A base url nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{addr}")
}

/// Caption metadata endpoint: 200 for `abc123`, 500 for `broken`, 404
/// otherwise. Requests missing the fixed track parameters get a 400.
pub fn timedtext_upstream() -> Router {
    async fn handler(
        Query(query): Query<HashMap<String, String>>,
    ) -> StatusCode {
        let fixed = [("type", "track"), ("id", "0"), ("lang", "en")];
        if fixed
            .iter()
            .any(|(k, v)| query.get(*k).map(String::as_str) != Some(*v))
        {
            return StatusCode::BAD_REQUEST;
        }

        match query.get("v").map(String::as_str) {
            Some("abc123") => StatusCode::OK,
            Some("broken") => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::NOT_FOUND,
        }
    }

    Router::new().route("/timedtext", get(handler))
}

/// Transcript host: two captions for `abc123`, a caption-less document for
/// `empty`, 500 otherwise.
pub fn transcript_upstream() -> Router {
    async fn handler(
        Query(query): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        match query.get("server_vid2").map(String::as_str) {
            Some("abc123") => (StatusCode::OK, TWO_CAPTIONS),
            Some("empty") => (StatusCode::OK, "<transcript></transcript>"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "upstream error"),
        }
    }

    Router::new().route("/transcript", get(handler))
}

/// Recorded chat completion requests of the fake `OpenAI` endpoint.
#[derive(Clone, Default)]
pub struct OpenAiUpstream {
    pub requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl OpenAiUpstream {
    pub const NO_CHOICES: &'static str = "no choices please";
    pub const TOO_LONG: &'static str = "far too long";
    pub const SLOW: &'static str = "take your time";
}

/// Chat completion endpoint under `/v1`. The user message picks the
/// behaviour; anything not listed in `OpenAiUpstream` is summarized as
/// "Greeting.".
pub fn openai_upstream(upstream: OpenAiUpstream) -> Router {
    async fn handler(
        State(upstream): State<OpenAiUpstream>,
        Json(request): Json<serde_json::Value>,
    ) -> impl IntoResponse {
        let user_content = request["messages"][1]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        upstream.requests.lock().unwrap().push(request);

        match user_content.as_str() {
            OpenAiUpstream::TOO_LONG => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": {
                            "message": "This model's maximum context length is 128000 tokens.",
                            "type": "invalid_request_error",
                            "param": "messages",
                            "code": "context_length_exceeded"
                        }
                    })),
                );
            }
            OpenAiUpstream::SLOW => {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            _ => {}
        }

        let choices = if user_content == OpenAiUpstream::NO_CHOICES {
            json!([])
        } else {
            json!([{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Greeting.",
                    "refusal": null,
                    "annotations": []
                },
                "logprobs": null,
                "finish_reason": "stop"
            }])
        };

        (
            StatusCode::OK,
            Json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": "gpt-4o-2024-08-06",
                "system_fingerprint": "fp_test",
                "service_tier": "default",
                "choices": choices,
                "usage": {
                    "prompt_tokens": 12,
                    "completion_tokens": 3,
                    "total_tokens": 15,
                    "prompt_tokens_details": {
                        "cached_tokens": 0,
                        "audio_tokens": 0
                    },
                    "completion_tokens_details": {
                        "reasoning_tokens": 0,
                        "audio_tokens": 0,
                        "accepted_prediction_tokens": 0,
                        "rejected_prediction_tokens": 0
                    }
                }
            })),
        )
    }

    Router::new()
        .route("/v1/chat/completions", post(handler))
        .with_state(upstream)
}

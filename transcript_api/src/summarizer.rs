use std::{sync::Arc, time::Duration};

use openai_dive::v1::{
    api::Client,
    error::APIError,
    resources::chat::{
        ChatCompletionParameters, ChatCompletionResponse, ChatMessage,
        ChatMessageContent,
    },
};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

pub const DEFAULT_OPENAI_INSTRUCTIONS: &str = "You are a helpful assistant. \
The user gives you a full video transcript and a task that asks you to \
summarize it. Your response should be a concise video summary";

/// Turns a full transcript into a summary.
pub trait Summarizer: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn summarize(
        &self,
        transcript: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("chat completion failed: {0}")]
    Api(#[from] APIError),

    #[error("chat completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("chat completion returned no choices")]
    EmptyChoices,

    #[error("chat completion returned no text content")]
    MissingContent,
}

/// Summarizer backed by an `OpenAI` compatible chat completion endpoint.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    client: Arc<Client>,
    model: String,
    instructions: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSummarizer")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiSummarizer {
    pub fn new(
        api_key: String,
        base_url: Option<&str>,
        model: impl Into<String>,
        instructions: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let mut client = Client::new(api_key);
        if let Some(base_url) = base_url {
            client.set_base_url(base_url);
        }

        Self {
            client: Arc::new(client),
            model: model.into(),
            instructions: instructions.into(),
            timeout,
        }
    }
}

impl Summarizer for OpenAiSummarizer {
    type Error = SummarizeError;

    async fn summarize(&self, transcript: &str) -> Result<String, Self::Error> {
        let parameters =
            build_parameters(&self.model, &self.instructions, transcript);

        let response = tokio::time::timeout(
            self.timeout,
            self.client.chat().create(parameters),
        )
        .await
        .map_err(|_| SummarizeError::Timeout(self.timeout))??;

        first_choice_text(&response)
    }
}

fn build_parameters(
    model: &str,
    instructions: &str,
    transcript: &str,
) -> ChatCompletionParameters {
    ChatCompletionParameters {
        model: model.to_string(),
        messages: vec![
            ChatMessage::System {
                name: None,
                content: ChatMessageContent::Text(instructions.to_string()),
            },
            ChatMessage::User {
                name: None,
                content: ChatMessageContent::Text(transcript.to_string()),
            },
        ],
        ..Default::default()
    }
}

fn first_choice_text(
    response: &ChatCompletionResponse,
) -> Result<String, SummarizeError> {
    let choice = response
        .choices
        .first()
        .ok_or(SummarizeError::EmptyChoices)?;

    match &choice.finish_reason {
        Some(reason) => tracing::info!("finish reason: {reason:?}"),
        None => tracing::info!("no finish reason provided"),
    }

    match &choice.message {
        ChatMessage::Assistant {
            content: Some(ChatMessageContent::Text(text)),
            ..
        } => Ok(text.clone()),
        _ => Err(SummarizeError::MissingContent),
    }
}

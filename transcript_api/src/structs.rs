use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use redact::Secret;
use serde::Deserialize;

use crate::{
    summarizer::{
        DEFAULT_OPENAI_INSTRUCTIONS, DEFAULT_OPENAI_MODEL, OpenAiSummarizer,
        Summarizer,
    },
    timedtext::{DEFAULT_TIMEDTEXT_BASE_URL, IdValidator, TimedTextClient},
    transcript::{
        DEFAULT_TRANSCRIPT_BASE_URL, TranscriptClient, TranscriptSource,
    },
};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub openai_api_key: Secret<String>,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default)]
    pub openai_base_url: Option<String>,

    #[serde(default = "default_openai_instructions")]
    pub openai_instructions: String,

    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_transcript_base_url")]
    pub transcript_base_url: String,

    #[serde(default = "default_timedtext_base_url")]
    pub timedtext_base_url: String,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_summary_timeout_secs")]
    pub summary_timeout_secs: u64,
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_openai_instructions() -> String {
    DEFAULT_OPENAI_INSTRUCTIONS.to_string()
}

const fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn default_port() -> u16 {
    8080
}

fn default_transcript_base_url() -> String {
    DEFAULT_TRANSCRIPT_BASE_URL.to_string()
}

fn default_timedtext_base_url() -> String {
    DEFAULT_TIMEDTEXT_BASE_URL.to_string()
}

const fn default_http_timeout_secs() -> u64 {
    30
}

const fn default_summary_timeout_secs() -> u64 {
    120
}

impl Config {
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// The per-request collaborators of the summary pipeline.
#[derive(Debug, Clone)]
pub struct AppState<V, T, S> {
    pub validator: V,
    pub transcripts: T,
    pub summarizer: S,
}

impl<V, T, S> AppState<V, T, S>
where
    V: IdValidator,
    T: TranscriptSource,
    S: Summarizer,
{
    pub const fn new(validator: V, transcripts: T, summarizer: S) -> Self {
        Self {
            validator,
            transcripts,
            summarizer,
        }
    }
}

pub type LiveState =
    AppState<TimedTextClient, TranscriptClient, OpenAiSummarizer>;

#[derive(Debug)]
pub struct AppContext {
    pub config: Config,
    pub state: LiveState,
}

impl qv_app::ContextProvider<Config> for AppContext {
    type Error = reqwest::Error;

    async fn new(config: Config) -> Result<Self, Self::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let state = AppState::new(
            TimedTextClient::new(http.clone(), &config.timedtext_base_url),
            TranscriptClient::new(http, &config.transcript_base_url),
            OpenAiSummarizer::new(
                config.openai_api_key.expose_secret().clone(),
                config.openai_base_url.as_deref(),
                &config.openai_model,
                &config.openai_instructions,
                Duration::from_secs(config.summary_timeout_secs),
            ),
        );

        Ok(Self { config, state })
    }
}

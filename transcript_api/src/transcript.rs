use scraper::{ElementRef, Html};
use types::CaptionEntry;

const CAPTION_TAG: &str = "text";

pub const DEFAULT_TRANSCRIPT_BASE_URL: &str = "https://youtubetranscript.com";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to parse transcript document: {0}")]
    Parse(#[from] std::str::Utf8Error),

    #[error("no transcript found")]
    NoTranscript,
}

/// Extracts the caption entries of a transcript document, in document
/// order.
///
/// Every `<text>` element becomes one entry. The `start` and `dur`
/// attributes default to zero when they are missing or not numeric, and the
/// caption text is the element's first text child.
///
/// # Errors
///
/// `ExtractError::Parse` if the body is not valid UTF-8, and
/// `ExtractError::NoTranscript` if the document has no caption elements.
pub fn parse_transcript_html(
    body: &[u8],
) -> Result<Vec<CaptionEntry>, ExtractError> {
    let markup = std::str::from_utf8(body)?;
    let document = Html::parse_document(markup);

    let entries = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == CAPTION_TAG)
        .map(|element| CaptionEntry {
            text: first_text_child(element),
            start: parse_seconds(element.value().attr("start")),
            duration: parse_seconds(element.value().attr("dur")),
        })
        .collect::<Vec<_>>();

    if entries.is_empty() {
        return Err(ExtractError::NoTranscript);
    }

    Ok(entries)
}

fn first_text_child(element: ElementRef<'_>) -> String {
    element
        .children()
        .find_map(|child| {
            child.value().as_text().map(|text| String::from(&**text))
        })
        .unwrap_or_default()
}

// unparseable timings are zeroed, only the text is used downstream
fn parse_seconds(value: Option<&str>) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

/// Source of raw transcript documents, keyed by video id.
pub trait TranscriptSource: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_document(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("failed to fetch transcript: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Fetches the transcript document for `video_id` and extracts its
/// captions.
///
/// # Errors
///
/// `TranscriptError::Fetch` when the source fails, `TranscriptError::Extract`
/// when the document holds no usable captions.
pub async fn get_transcript<T: TranscriptSource>(
    source: &T,
    video_id: &str,
) -> Result<Vec<CaptionEntry>, TranscriptError> {
    let document = source
        .fetch_document(video_id)
        .await
        .map_err(|e| TranscriptError::Fetch(Box::new(e)))?;

    Ok(parse_transcript_html(&document)?)
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptClientError {
    #[error("transcript request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

/// Client for the public transcript host.
#[derive(Debug, Clone)]
pub struct TranscriptClient {
    http: reqwest::Client,
    base_url: String,
}

impl TranscriptClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl TranscriptSource for TranscriptClient {
    type Error = TranscriptClientError;

    async fn fetch_document(
        &self,
        video_id: &str,
    ) -> Result<Vec<u8>, Self::Error> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("server_vid2", video_id)])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            // dropping the unread response closes the connection
            return Err(TranscriptClientError::UnexpectedStatus(status));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

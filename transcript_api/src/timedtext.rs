pub const DEFAULT_TIMEDTEXT_BASE_URL: &str =
    "https://video.google.com/timedtext";

/// Decides whether a video id refers to a video with captions.
pub trait IdValidator: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn validate(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

/// Validates video ids against the caption track metadata endpoint.
///
/// An id is valid only when the endpoint answers `200 OK`; any other status
/// means "not valid" rather than an error.
#[derive(Debug, Clone)]
pub struct TimedTextClient {
    http: reqwest::Client,
    base_url: String,
}

impl TimedTextClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl IdValidator for TimedTextClient {
    type Error = reqwest::Error;

    async fn validate(&self, video_id: &str) -> Result<bool, Self::Error> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("type", "track"),
                ("v", video_id),
                ("id", "0"),
                ("lang", "en"),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("caption metadata status for {video_id}: {status}");

        Ok(status == reqwest::StatusCode::OK)
    }
}

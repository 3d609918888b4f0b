use async_trait::async_trait;

/// Turns raw page text into cleaned, structured markdown.
#[async_trait]
pub trait TextRefiner: Send + Sync {
    async fn refine(&self, raw_text: &str) -> Result<String, TextRefinerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextRefinerError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

use async_trait::async_trait;

use crate::application::ports::{TextRefiner, TextRefinerError};

/// Returns the sanitized page text unchanged. No network calls, no cost.
#[derive(Debug, Default)]
pub struct PassthroughRefiner;

#[async_trait]
impl TextRefiner for PassthroughRefiner {
    async fn refine(&self, raw_text: &str) -> Result<String, TextRefinerError> {
        Ok(raw_text.to_string())
    }
}

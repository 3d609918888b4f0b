use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{TextRefiner, TextRefinerError};

pub const DEFAULT_EXTRACTION_PROMPT: &str = "\
You are given text extracted from a batch of scanned document pages. \
Reproduce it faithfully while restoring its original structure: paragraphs, \
bullet points, headings and other text layout.

Ignore any diagonal watermark reading \"Preview\".

Do not add, drop or invent content. Accuracy matters more than fluency.

Mark up each page with semantic tags:
- <main> for the body text
- <footnotes> for footnotes
- <notes> for side or marginal notes
- <image> for descriptions of images

Render tables as Markdown tables. Return only the cleaned text.";

/// Refines page text through any OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionRefiner {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<usize>,
    temperature: f32,
    system_prompt: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatCompletionRefiner {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, TextRefinerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TextRefinerError::ApiRequestFailed(format!("client build: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens: None,
            temperature: 0.0,
            system_prompt: DEFAULT_EXTRACTION_PROMPT.to_string(),
        })
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_messages(&self, raw_text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: Some(self.system_prompt.clone()),
            },
            ChatMessage {
                role: "user".to_string(),
                content: Some(format!(
                    "Extract and format the text from this PDF content:\n\n{raw_text}"
                )),
            },
        ]
    }
}

#[async_trait]
impl TextRefiner for ChatCompletionRefiner {
    #[tracing::instrument(skip(self, raw_text), fields(model = %self.model, input_chars = raw_text.len()))]
    async fn refine(&self, raw_text: &str) -> Result<String, TextRefinerError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: self.build_messages(raw_text),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| TextRefinerError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TextRefinerError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TextRefinerError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TextRefinerError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TextRefinerError::InvalidResponse("empty choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        tracing::debug!(output_chars = content.len(), "Refinement complete");
        Ok(content)
    }
}

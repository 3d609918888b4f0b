use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::TextRefiner;
use crate::presentation::config::{RefinerProvider, RefinerSettings};

use super::chat_completion_refiner::ChatCompletionRefiner;
use super::passthrough_refiner::PassthroughRefiner;

#[derive(Debug, thiserror::Error)]
pub enum RefinerFactoryError {
    #[error("refiner.base_url is required for the openai provider")]
    MissingBaseUrl,
    #[error("refiner.api_key is required for the openai provider")]
    MissingApiKey,
    #[error("failed to read system prompt {path}: {source}")]
    SystemPrompt {
        path: String,
        source: std::io::Error,
    },
    #[error("refiner initialization failed: {0}")]
    InitializationFailed(String),
}

pub struct RefinerFactory;

impl RefinerFactory {
    pub fn create(settings: &RefinerSettings) -> Result<Arc<dyn TextRefiner>, RefinerFactoryError> {
        match settings.provider {
            RefinerProvider::Passthrough => {
                tracing::info!("Using passthrough refiner");
                Ok(Arc::new(PassthroughRefiner))
            }
            RefinerProvider::OpenAi => {
                let base_url = settings
                    .base_url
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or(RefinerFactoryError::MissingBaseUrl)?;
                let api_key = settings
                    .api_key
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or(RefinerFactoryError::MissingApiKey)?;

                let mut refiner = ChatCompletionRefiner::new(
                    base_url,
                    api_key,
                    &settings.model,
                    Duration::from_secs(settings.timeout_secs),
                )
                .map_err(|e| RefinerFactoryError::InitializationFailed(e.to_string()))?
                .with_temperature(settings.temperature)
                .with_max_tokens(settings.max_tokens);

                if let Some(path) = &settings.system_prompt_path {
                    let prompt = std::fs::read_to_string(path).map_err(|source| {
                        RefinerFactoryError::SystemPrompt {
                            path: path.display().to_string(),
                            source,
                        }
                    })?;
                    refiner = refiner.with_system_prompt(prompt.trim());
                }

                tracing::info!(model = %settings.model, base_url, "Using chat completion refiner");
                Ok(Arc::new(refiner))
            }
        }
    }
}

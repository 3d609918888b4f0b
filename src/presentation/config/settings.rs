use std::path::PathBuf;

use config::{Config, Environment as EnvironmentSource, File, Map};
use serde::Deserialize;

use super::Environment;

pub const ENV_PREFIX: &str = "PAGEMILL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub job: JobSettings,
    pub refiner: RefinerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    pub data_dir: PathBuf,
    pub batch_size: usize,
    pub max_concurrency: usize,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            batch_size: 10,
            max_concurrency: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefinerProvider {
    Passthrough,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefinerSettings {
    pub provider: RefinerProvider,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    pub timeout_secs: u64,
    pub system_prompt_path: Option<PathBuf>,
}

impl Default for RefinerSettings {
    fn default() -> Self {
        Self {
            provider: RefinerProvider::Passthrough,
            base_url: None,
            api_key: None,
            model: "gemini-2.5-pro-exp-03-25".to_string(),
            temperature: 0.0,
            max_tokens: None,
            timeout_secs: 300,
            system_prompt_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Settings {
    /// Layers `appsettings.<env>.toml` (optional) and `PAGEMILL__SECTION__KEY`
    /// environment variables over the built-in defaults.
    ///
    /// The result is not validated: command-line overrides are applied on
    /// top of it first, then [`Settings::validate`] checks the effective values.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        Self::build(environment, None)
    }

    /// Same layering as [`Settings::load`], reading variables from `vars`
    /// instead of the process environment.
    pub fn load_with_vars(
        environment: Environment,
        vars: Map<String, String>,
    ) -> Result<Self, SettingsError> {
        Self::build(environment, Some(vars))
    }

    fn build(
        environment: Environment,
        vars: Option<Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let configuration = Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        Ok(configuration.try_deserialize()?)
    }

    /// Checks the job settings every command depends on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.job.batch_size == 0 {
            return Err(SettingsError::Invalid(
                "job.batch_size must be at least 1".to_string(),
            ));
        }
        if self.job.max_concurrency == 0 {
            return Err(SettingsError::Invalid(
                "job.max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl RefinerSettings {
    /// Only `extract` talks to the refiner, so these checks run there.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.provider == RefinerProvider::OpenAi {
            if self.base_url.as_deref().is_none_or(str::is_empty) {
                return Err(SettingsError::Invalid(
                    "refiner.base_url is required for the openai provider".to_string(),
                ));
            }
            if self.api_key.as_deref().is_none_or(str::is_empty) {
                return Err(SettingsError::Invalid(
                    "refiner.api_key is required for the openai provider".to_string(),
                ));
            }
        }
        Ok(())
    }
}

use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: Environment,
    pub default_filter: String,
    pub json_format: bool,
}

impl TracingConfig {
    pub fn from_settings(settings: &LoggingSettings, environment: Environment) -> Self {
        let json_format = std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(settings.enable_json);
        Self {
            environment,
            default_filter: format!("{},pagemill=debug", settings.level),
            json_format,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingSettings::default(), Environment::Local)
    }
}

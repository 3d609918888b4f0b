mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ENV_PREFIX, JobSettings, LoggingSettings, RefinerProvider, RefinerSettings, Settings,
    SettingsError,
};

use std::process::ExitCode;

use clap::Parser;

use pagemill::infrastructure::observability::{TracingConfig, init_tracing};
use pagemill::presentation::{Cli, Environment, Settings, execute};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let mut settings = Settings::load(environment)?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment));
    tracing::info!(
        environment = %environment,
        data_dir = %settings.job.data_dir.display(),
        batch_size = settings.job.batch_size,
        max_concurrency = settings.job.max_concurrency,
        "pagemill starting"
    );

    execute(&cli.command, &settings).await
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::config::Settings;

#[derive(Debug, Parser)]
#[command(name = "pagemill")]
#[command(version, about = "Resumable, batched text extraction for large PDF documents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding per-job ledgers and output (overrides job.data_dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract every batch of a PDF not yet recorded as complete
    Extract(ExtractArgs),
    /// Show which batches of a PDF are complete and which are pending
    Status(StatusArgs),
    /// Assemble a job's batch outputs into one ordered document
    Aggregate(AggregateArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Path to a local PDF file
    #[arg(long)]
    pub file: PathBuf,

    /// Job identifier; defaults to the file stem
    #[arg(long)]
    pub job_id: Option<String>,

    /// Number of pages per batch
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Maximum number of batches processed at the same time
    #[arg(long = "max-concurrent")]
    pub max_concurrent: Option<usize>,

    /// Model used by the refiner
    #[arg(long)]
    pub model: Option<String>,

    /// Assemble the full document when every batch is complete
    #[arg(long)]
    pub aggregate: bool,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    #[arg(long)]
    pub job_id: String,
}

impl Cli {
    /// Applies command-line overrides on top of file and environment settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(data_dir) = &self.data_dir {
            settings.job.data_dir = data_dir.clone();
        }

        match &self.command {
            Command::Extract(args) => {
                args.source.apply_overrides(settings);
                if let Some(max_concurrent) = args.max_concurrent {
                    settings.job.max_concurrency = max_concurrent;
                }
                if let Some(model) = &args.model {
                    settings.refiner.model = model.clone();
                }
            }
            Command::Status(args) => args.source.apply_overrides(settings),
            Command::Aggregate(_) => {}
        }
    }
}

impl SourceArgs {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(batch_size) = self.batch_size {
            settings.job.batch_size = batch_size;
        }
    }
}

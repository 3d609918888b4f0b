use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, bail};

use crate::application::ports::{PageSource, ProgressLedger};
use crate::application::services::{AggregationService, BatchOrchestrator, RangeExtractionService};
use crate::domain::{JobId, UnitRange, partition};
use crate::infrastructure::llm::RefinerFactory;
use crate::infrastructure::persistence::FileProgressLedger;
use crate::infrastructure::storage::MarkdownBatchStore;
use crate::infrastructure::text_processing::PdfPageSource;

use super::cli::{AggregateArgs, Command, ExtractArgs, SourceArgs, StatusArgs};
use super::config::Settings;
use super::report::{render_run_report, render_status};

pub async fn execute(command: &Command, settings: &Settings) -> anyhow::Result<ExitCode> {
    match command {
        Command::Extract(args) => extract(args, settings).await,
        Command::Status(args) => status(args, settings).await,
        Command::Aggregate(args) => aggregate(args, settings).await,
    }
}

fn resolve_job_id(source: &SourceArgs) -> anyhow::Result<JobId> {
    let job_id = match &source.job_id {
        Some(raw) => JobId::new(raw.as_str())?,
        None => JobId::from_source_path(&source.file)?,
    };
    Ok(job_id)
}

fn open_source(source: &SourceArgs) -> anyhow::Result<PdfPageSource> {
    if !source.file.is_file() {
        bail!("local file not found: {}", source.file.display());
    }
    std::fs::File::open(&source.file)
        .with_context(|| format!("local file is not readable: {}", source.file.display()))?;
    Ok(PdfPageSource::new(&source.file))
}

async fn extract(args: &ExtractArgs, settings: &Settings) -> anyhow::Result<ExitCode> {
    settings.refiner.validate()?;
    let job_id = resolve_job_id(&args.source)?;
    let page_source = Arc::new(open_source(&args.source)?);
    let total_pages = page_source.page_count().await?;

    let data_dir = &settings.job.data_dir;
    let ledger: Arc<dyn ProgressLedger> = Arc::new(FileProgressLedger::new(data_dir));
    let store = Arc::new(MarkdownBatchStore::new(data_dir));
    let refiner = RefinerFactory::create(&settings.refiner)?;

    let extraction = RangeExtractionService::new(page_source, refiner, store.clone());
    let orchestrator = BatchOrchestrator::new(ledger);

    let extraction = &extraction;
    let job = &job_id;
    let report = orchestrator
        .run(
            &job_id,
            total_pages,
            settings.job.batch_size,
            settings.job.max_concurrency,
            move |range| extraction.extract(job, range),
        )
        .await?;

    print!("{}", render_run_report(&report));

    let summary = report.summary();
    if !summary.is_complete() {
        return Ok(ExitCode::FAILURE);
    }

    if args.aggregate {
        // Only the current partition: batches left over from an earlier
        // batch size would duplicate pages.
        let ranges: Vec<UnitRange> = report.results().iter().map(|r| r.range).collect();
        let aggregation = AggregationService::new(store)
            .aggregate_ranges(&job_id, &ranges)
            .await?;
        if let Some(path) = aggregation.output_path {
            println!("assembled {} batches into {}", aggregation.batches, path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn status(args: &StatusArgs, settings: &Settings) -> anyhow::Result<ExitCode> {
    let job_id = resolve_job_id(&args.source)?;
    let page_source = open_source(&args.source)?;
    let total_pages = page_source.page_count().await?;

    let ranges = partition(total_pages, settings.job.batch_size)?;
    let ledger = FileProgressLedger::new(&settings.job.data_dir);
    let completed = ledger.load(&job_id).await?;

    print!("{}", render_status(job_id.as_str(), &ranges, &completed));
    Ok(ExitCode::SUCCESS)
}

async fn aggregate(args: &AggregateArgs, settings: &Settings) -> anyhow::Result<ExitCode> {
    let job_id = JobId::new(args.job_id.as_str())?;
    let store = Arc::new(MarkdownBatchStore::new(&settings.job.data_dir));

    let summary = AggregationService::new(store).aggregate(&job_id).await?;
    match summary.output_path {
        Some(path) => {
            println!("assembled {} batches into {}", summary.batches, path.display());
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("no batch output found for job {job_id}");
            Ok(ExitCode::FAILURE)
        }
    }
}

//! reconrun - dual-source pull and reconciliation batch runner
//!
//! Loads the entity mapping (creating a sample file on first run), processes
//! every (entity, sub-entity) pair, and writes the text report. Exits
//! nonzero when any item failed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};

use reconrun::config::Config;
use reconrun::core::report;
use reconrun::{BatchRunner, FieldReconciler, PrimarySource, SecondarySource};

#[derive(Parser, Debug)]
#[command(name = "reconrun", version, about = "Dual-source pull and reconciliation batch runner")]
struct Args {
    /// Path to the entity configuration file (created with sample content if missing)
    #[arg(short, long, default_value = "entities.yaml")]
    config: PathBuf,

    /// Override the report output path from the configuration
    #[arg(long)]
    report: Option<PathBuf>,

    /// Override the cross-item concurrency bound
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    match run(Args::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the batch; returns whether every item succeeded
async fn run(args: Args) -> anyhow::Result<bool> {
    let config = Config::load_or_init(&args.config)
        .await
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    let work = config.work_items();
    info!(
        entities = config.entities.len(),
        sub_entities = work.len(),
        "loaded configuration"
    );

    let mut runner_config = config.runner_config();
    if let Some(concurrency) = args.concurrency {
        runner_config = runner_config.with_max_in_flight(concurrency);
    }

    let runner = BatchRunner::new(
        Arc::new(PrimarySource::default()),
        Arc::new(SecondarySource::default()),
        Arc::new(FieldReconciler),
        runner_config,
    );

    let outcomes = runner.run(work).await;
    let batch_report = report::summarize(&outcomes);

    let report_path = args
        .report
        .unwrap_or_else(|| config.runner.report_file.clone());
    report::write_report(&batch_report, &report_path)
        .await
        .with_context(|| format!("writing report to {}", report_path.display()))?;

    Ok(batch_report.failed == 0)
}

//! Standalone single pull against one source
//!
//! Fetches one (entity, sub-entity) record from the chosen source and
//! writes it to a JSON file, independent of any batch run.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::Level;

use reconrun::sources::{self, PrimarySource, SecondarySource};
use reconrun::Fetcher;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    /// First data source (Source A)
    Primary,
    /// Second data source (Source B)
    Secondary,
}

#[derive(Parser, Debug)]
#[command(name = "pull-source", version, about = "Pull one record from a single source")]
struct Args {
    /// Which source to pull from
    #[arg(value_enum)]
    source: Source,

    /// The entity to process
    entity: String,

    /// The sub-entity to process
    sub_entity: String,

    /// Output file path (defaults to {entity}_{sub_entity}_{source}.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let fetcher: Arc<dyn Fetcher> = match args.source {
        Source::Primary => Arc::new(PrimarySource::default()),
        Source::Secondary => Arc::new(SecondarySource::default()),
    };

    let payload = fetcher
        .fetch(&args.entity, &args.sub_entity)
        .await
        .with_context(|| format!("pulling {}/{}", args.entity, args.sub_entity))?;

    let path = sources::save_payload(&payload, args.output.as_deref())
        .await
        .context("saving payload")?;
    println!("saved {}", path.display());
    Ok(())
}

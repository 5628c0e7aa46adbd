//! # reconrun
//!
//! Dual-source data pull and reconciliation batch runner.
//!
//! For every configured (entity, sub-entity) pair, reconrun pulls a record
//! from two independent sources concurrently under bounded timeouts,
//! reconciles the two payloads when both pulls succeeded, and folds every
//! outcome into a plain-text batch report. A failing or hanging stage never
//! fails the batch; failure is captured as data inside each item's outcome.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reconrun::{BatchRunner, Config, FieldReconciler, PrimarySource, SecondarySource};
//!
//! #[tokio::main]
//! async fn main() -> reconrun::Result<()> {
//!     let config = Config::load_or_init("entities.yaml").await?;
//!     let runner = BatchRunner::new(
//!         Arc::new(PrimarySource::default()),
//!         Arc::new(SecondarySource::default()),
//!         Arc::new(FieldReconciler),
//!         config.runner_config(),
//!     );
//!
//!     let outcomes = runner.run(config.work_items()).await;
//!     let report = reconrun::report::summarize(&outcomes);
//!     println!("{}", reconrun::report::render(&report));
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod recon;
pub mod sources;

// Re-export the main types
pub use config::{Config, EntityConfig, RunnerSettings};
pub use core::batch::{BatchRunner, RunnerConfig};
pub use core::item::ItemProcessor;
pub use core::report;
pub use core::report::BatchReport;
pub use core::traits::{Fetcher, Reconciler};
pub use core::types::{
    FetchError, FetchResult, ItemOutcome, ReconOutcome, ReconcileError, ReconciliationResult,
    SourcePayload, Stage, StageFailure, WorkItem,
};
pub use error::{Result, RunnerError};
pub use recon::FieldReconciler;
pub use sources::{PrimarySource, SecondarySource};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! Batch orchestration
//!
//! Runs a whole batch of work items through the [`ItemProcessor`] with a
//! bounded number of items in flight. Items are independent; a failing item
//! never halts the rest, and the returned outcomes always match input order
//! regardless of completion order.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::info;
use uuid::Uuid;

use super::item::ItemProcessor;
use super::traits::{Fetcher, Reconciler};
use super::types::{ItemOutcome, WorkItem};

/// Tunables for one batch run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Bounded wait per fetcher, independently per source (default: 300s)
    pub fetch_timeout: Duration,
    /// Bounded wait for the reconciliation stage (default: 300s)
    pub recon_timeout: Duration,
    /// Maximum items processed concurrently (default: 1, i.e. sequential)
    pub max_in_flight: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(300),
            recon_timeout: Duration::from_secs(300),
            max_in_flight: 1,
        }
    }
}

impl RunnerConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-fetcher timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the reconciliation timeout
    pub fn with_recon_timeout(mut self, timeout: Duration) -> Self {
        self.recon_timeout = timeout;
        self
    }

    /// Set the cross-item concurrency bound
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }
}

/// Runs batches of work items against a pair of sources and a reconciler.
pub struct BatchRunner {
    processor: Arc<ItemProcessor>,
    max_in_flight: usize,
}

impl BatchRunner {
    /// Create a runner over the two sources and the reconciler
    pub fn new(
        fetcher_a: Arc<dyn Fetcher>,
        fetcher_b: Arc<dyn Fetcher>,
        reconciler: Arc<dyn Reconciler>,
        config: RunnerConfig,
    ) -> Self {
        let processor = Arc::new(ItemProcessor::new(
            fetcher_a,
            fetcher_b,
            reconciler,
            config.fetch_timeout,
            config.recon_timeout,
        ));
        Self {
            processor,
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    /// Process every work item, returning outcomes in input order
    pub async fn run(&self, work: Vec<WorkItem>) -> Vec<ItemOutcome> {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            items = work.len(),
            max_in_flight = self.max_in_flight,
            "starting batch run"
        );

        let mut indexed: Vec<(usize, ItemOutcome)> = stream::iter(work.into_iter().enumerate())
            .map(|(index, item)| {
                let processor = Arc::clone(&self.processor);
                async move { (index, processor.process(item).await) }
            })
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        // Restore input order; completion order is unspecified.
        indexed.sort_by_key(|(index, _)| *index);
        let outcomes: Vec<ItemOutcome> = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        info!(
            %run_id,
            total = outcomes.len(),
            succeeded,
            failed = outcomes.len() - succeeded,
            "batch run complete"
        );
        outcomes
    }
}

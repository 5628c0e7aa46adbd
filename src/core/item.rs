//! Per-item orchestration
//!
//! Drives one work item end to end: both fetches concurrently under
//! independent timeouts, then reconciliation only when both payloads
//! arrived. `process` never fails; every stage failure is captured inside
//! the returned [`ItemOutcome`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::traits::{Fetcher, Reconciler};
use super::types::{
    FetchError, FetchResult, ItemOutcome, ReconcileError, ReconciliationResult, SourcePayload,
    Stage, StageFailure, WorkItem,
};

const SKIPPED_REASON: &str = "one or more data pulls failed";

/// Orchestrates one (entity, sub-entity) unit of work.
pub struct ItemProcessor {
    fetcher_a: Arc<dyn Fetcher>,
    fetcher_b: Arc<dyn Fetcher>,
    reconciler: Arc<dyn Reconciler>,
    fetch_timeout: Duration,
    recon_timeout: Duration,
}

impl ItemProcessor {
    /// Create a processor over the two sources and the reconciler
    pub fn new(
        fetcher_a: Arc<dyn Fetcher>,
        fetcher_b: Arc<dyn Fetcher>,
        reconciler: Arc<dyn Reconciler>,
        fetch_timeout: Duration,
        recon_timeout: Duration,
    ) -> Self {
        Self {
            fetcher_a,
            fetcher_b,
            reconciler,
            fetch_timeout,
            recon_timeout,
        }
    }

    /// Process one work item, capturing every stage failure as data
    pub async fn process(&self, item: WorkItem) -> ItemOutcome {
        let started_at = Utc::now();
        let clock = Instant::now();
        debug!(item = %item, "starting item processing");

        // Both pulls run concurrently, each under its own timeout.
        let handle_a = self.spawn_fetch(Arc::clone(&self.fetcher_a), &item);
        let handle_b = self.spawn_fetch(Arc::clone(&self.fetcher_b), &item);

        let source_a = self.await_fetch(handle_a, Stage::SourceA, &item).await;
        let source_b = self.await_fetch(handle_b, Stage::SourceB, &item).await;

        let reconciliation = match (&source_a, &source_b) {
            (Ok(a), Ok(b)) => self.reconcile(a, b, &item).await,
            _ => ReconciliationResult::Skipped(SKIPPED_REASON.to_string()),
        };

        let mut errors = Vec::new();
        if let Err(e) = &source_a {
            errors.push(StageFailure::new(Stage::SourceA, e.to_string()));
        }
        if let Err(e) = &source_b {
            errors.push(StageFailure::new(Stage::SourceB, e.to_string()));
        }
        match &reconciliation {
            ReconciliationResult::Success(_) => {}
            ReconciliationResult::Failed(e) => {
                errors.push(StageFailure::new(Stage::Reconciliation, e.to_string()));
            }
            ReconciliationResult::Skipped(reason) => {
                errors.push(StageFailure::new(Stage::Reconciliation, reason.clone()));
            }
        }

        let success = errors.is_empty();
        let duration = clock.elapsed();
        info!(
            item = %item,
            success,
            elapsed_secs = duration.as_secs_f64(),
            "finished item processing"
        );

        ItemOutcome {
            item,
            started_at,
            finished_at: Utc::now(),
            duration,
            source_a,
            source_b,
            reconciliation,
            success,
            errors,
        }
    }

    fn spawn_fetch(&self, fetcher: Arc<dyn Fetcher>, item: &WorkItem) -> JoinHandle<FetchResult> {
        let entity = item.entity.clone();
        let sub_entity = item.sub_entity.clone();
        tokio::spawn(async move { fetcher.fetch(&entity, &sub_entity).await })
    }

    /// Await one fetch under the bounded wait. A timeout aborts the task so
    /// abandoned work is actually torn down; its result, if any, is
    /// discarded.
    async fn await_fetch(
        &self,
        mut handle: JoinHandle<FetchResult>,
        stage: Stage,
        item: &WorkItem,
    ) -> FetchResult {
        let result = match tokio::time::timeout(self.fetch_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(FetchError::Unexpected(format!(
                "fetch task failed: {join_err}"
            ))),
            Err(_) => {
                warn!(item = %item, %stage, timeout = ?self.fetch_timeout, "fetch timed out, abandoning task");
                handle.abort();
                Err(FetchError::Timeout(self.fetch_timeout))
            }
        };
        if let Err(e) = &result {
            error!(item = %item, %stage, error = %e, "data pull failed");
        }
        result
    }

    async fn reconcile(
        &self,
        payload_a: &SourcePayload,
        payload_b: &SourcePayload,
        item: &WorkItem,
    ) -> ReconciliationResult {
        let fut = self
            .reconciler
            .reconcile(payload_a, payload_b, &item.entity, &item.sub_entity);
        match tokio::time::timeout(self.recon_timeout, fut).await {
            Ok(Ok(outcome)) => ReconciliationResult::Success(outcome),
            Ok(Err(e)) => {
                error!(item = %item, error = %e, "reconciliation failed");
                ReconciliationResult::Failed(e)
            }
            Err(_) => {
                warn!(item = %item, timeout = ?self.recon_timeout, "reconciliation timed out");
                ReconciliationResult::Failed(ReconcileError::Timeout(self.recon_timeout))
            }
        }
    }
}

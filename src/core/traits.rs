//! Ports consumed by the orchestration engine
//!
//! The engine treats both data sources and the reconciler as opaque,
//! potentially slow, potentially failing collaborators behind these traits.

use async_trait::async_trait;

use super::types::{FetchError, ReconOutcome, ReconcileError, SourcePayload};

/// One independent data source.
///
/// Implementations may block for a long time or fail; the engine bounds the
/// wait and captures the failure. They must not panic on ordinary upstream
/// errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Stable source identifier, used for payload labeling and file names
    fn source(&self) -> &str;

    /// Pull the record for one (entity, sub-entity) pair
    async fn fetch(&self, entity: &str, sub_entity: &str) -> Result<SourcePayload, FetchError>;
}

/// Compares the two source payloads for one work item.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Reconcile the two payloads; the outcome schema is opaque to the engine
    async fn reconcile(
        &self,
        payload_a: &SourcePayload,
        payload_b: &SourcePayload,
        entity: &str,
        sub_entity: &str,
    ) -> Result<ReconOutcome, ReconcileError>;
}

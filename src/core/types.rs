//! Core data model for the orchestration engine
//!
//! Everything here is created once, fully populated, and never mutated
//! afterwards. Failure is data: fetch and reconciliation errors live inside
//! the [`ItemOutcome`] rather than propagating as `Err` past the engine.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of work: a single (entity, sub-entity) pair.
///
/// Produced by expanding the configured entity mapping; unique within a
/// batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    /// Parent entity name
    pub entity: String,
    /// Sub-entity name
    pub sub_entity: String,
}

impl WorkItem {
    /// Create a new work item
    pub fn new(entity: impl Into<String>, sub_entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            sub_entity: sub_entity.into(),
        }
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.sub_entity)
    }
}

/// Data record returned by one source for one work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePayload {
    /// Source identifier (e.g. "source1")
    pub source: String,
    /// Parent entity name
    pub entity: String,
    /// Sub-entity name
    pub sub_entity: String,
    /// When the source produced this record
    pub timestamp: DateTime<Utc>,
    /// Source-specific metric names to values
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Failure of a single fetch stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The fetch did not complete within its bounded wait
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The source was unreachable or returned a transport-level error
    #[error("network error: {0}")]
    Network(String),
    /// Anything else, including a panicked fetch task
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Captured outcome of one fetcher invocation.
pub type FetchResult = Result<SourcePayload, FetchError>;

/// Failure of the reconciliation stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Reconciliation did not complete within its bounded wait
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Anything else raised by the reconciler
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Result of comparing the two payloads. Opaque to the engine; surfaced in
/// the detailed report only.
#[derive(Debug, Clone, Serialize)]
pub struct ReconOutcome {
    /// Whether every compared field agreed
    pub matched: bool,
    /// Number of fields compared
    pub fields_compared: usize,
    /// Human-readable description of each disagreement
    pub discrepancies: Vec<String>,
}

/// Captured outcome of the reconciliation stage for one work item.
#[derive(Debug, Clone)]
pub enum ReconciliationResult {
    /// Reconciler ran and returned an outcome
    Success(ReconOutcome),
    /// Reconciler ran and failed
    Failed(ReconcileError),
    /// Reconciler was not invoked because at least one fetch failed
    Skipped(String),
}

impl ReconciliationResult {
    /// Whether this stage counts as successful
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Processing stage an error originated from, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// First data source
    SourceA,
    /// Second data source
    SourceB,
    /// Reconciliation of the two payloads
    Reconciliation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceA => write!(f, "Source A"),
            Self::SourceB => write!(f, "Source B"),
            Self::Reconciliation => write!(f, "Reconciliation"),
        }
    }
}

/// One entry in an item's ordered error list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    /// Stage the failure originated from
    pub stage: Stage,
    /// Failure description
    pub message: String,
}

impl StageFailure {
    pub(crate) fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.message)
    }
}

/// Durable record of one processed work item.
///
/// Invariant: `success` is true exactly when both fetches succeeded and the
/// reconciliation succeeded, which in turn means `errors` is empty.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// The work item this outcome belongs to
    pub item: WorkItem,
    /// Wall-clock start of processing
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of processing
    pub finished_at: DateTime<Utc>,
    /// Elapsed processing time
    pub duration: Duration,
    /// Captured result of the Source A fetch
    pub source_a: FetchResult,
    /// Captured result of the Source B fetch
    pub source_b: FetchResult,
    /// Captured result of the reconciliation stage
    pub reconciliation: ReconciliationResult,
    /// Overall success flag
    pub success: bool,
    /// One entry per failing stage, in stage order (A, B, reconciliation)
    pub errors: Vec<StageFailure>,
}

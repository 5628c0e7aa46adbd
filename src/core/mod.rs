//! The orchestration engine
//!
//! Everything with real concurrency, timeout, and partial-failure semantics
//! lives here: per-item orchestration, bounded batch execution, and report
//! aggregation over the collected outcomes.

pub mod batch;
pub mod item;
pub mod report;
pub mod traits;
pub mod types;

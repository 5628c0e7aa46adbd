//! Error handling for the runner
//!
//! These are the fatal, programmer-facing faults (bad configuration, IO).
//! Item-level fetch and reconciliation failures are not errors in this
//! sense; they are captured as data inside each
//! [`ItemOutcome`](crate::core::types::ItemOutcome).

use thiserror::Error;

/// Result type alias for the runner
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Fatal error for the runner
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

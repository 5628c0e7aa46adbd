//! Concrete data sources
//!
//! Two simulated upstreams plus the standalone payload persistence used by
//! the `pull-source` binary. A real deployment would swap these for HTTP
//! clients behind the same [`Fetcher`](crate::core::traits::Fetcher) trait;
//! the engine never knows the difference.

mod primary;
mod secondary;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::types::SourcePayload;
use crate::error::Result;

pub use primary::PrimarySource;
pub use secondary::SecondarySource;

/// Default file name for a standalone pull: `{entity}_{sub_entity}_{source}.json`
pub fn default_output_name(payload: &SourcePayload) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}_{}.json",
        payload.entity, payload.sub_entity, payload.source
    ))
}

/// Write a payload to a JSON file, defaulting to [`default_output_name`] in
/// the working directory when no explicit path is given.
pub async fn save_payload(payload: &SourcePayload, output: Option<&Path>) -> Result<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_name(payload),
    };

    let json = serde_json::to_vec_pretty(payload)?;
    tokio::fs::write(&path, json).await?;
    info!(path = %path.display(), "payload saved");
    Ok(path)
}

//! First data source (Source A)

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::core::traits::Fetcher;
use crate::core::types::{FetchError, SourcePayload};

const SOURCE_ID: &str = "source1";

/// Simulated pull against the first upstream.
///
/// Stands in for an HTTP client against
/// `https://api.example.com/v1/{entity}/{sub_entity}/data`; it sleeps for a
/// configurable latency and returns a fixed metric set.
pub struct PrimarySource {
    latency: Duration,
}

impl PrimarySource {
    /// Create a source with the given simulated latency
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for PrimarySource {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl Fetcher for PrimarySource {
    fn source(&self) -> &str {
        SOURCE_ID
    }

    async fn fetch(&self, entity: &str, sub_entity: &str) -> Result<SourcePayload, FetchError> {
        debug!(entity, sub_entity, "pulling data from source 1");
        tokio::time::sleep(self.latency).await;

        let mut fields = BTreeMap::new();
        fields.insert("metric_1".to_string(), json!(100));
        fields.insert("metric_2".to_string(), json!(200));
        fields.insert("status".to_string(), json!("active"));

        info!(entity, sub_entity, "pulled data from source 1");
        Ok(SourcePayload {
            source: SOURCE_ID.to_string(),
            entity: entity.to_string(),
            sub_entity: sub_entity.to_string(),
            timestamp: Utc::now(),
            fields,
        })
    }
}

//! Second data source (Source B)

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::core::traits::Fetcher;
use crate::core::types::{FetchError, SourcePayload};

const SOURCE_ID: &str = "source2";

/// Simulated pull against the second upstream.
///
/// Deliberately disagrees with the first source on `metric_2` so the
/// reconciler has a discrepancy to surface.
pub struct SecondarySource {
    latency: Duration,
}

impl SecondarySource {
    /// Create a source with the given simulated latency
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SecondarySource {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl Fetcher for SecondarySource {
    fn source(&self) -> &str {
        SOURCE_ID
    }

    async fn fetch(&self, entity: &str, sub_entity: &str) -> Result<SourcePayload, FetchError> {
        debug!(entity, sub_entity, "pulling data from source 2");
        tokio::time::sleep(self.latency).await;

        let mut fields = BTreeMap::new();
        fields.insert("metric_1".to_string(), json!(100));
        fields.insert("metric_2".to_string(), json!(205));
        fields.insert("status".to_string(), json!("active"));

        info!(entity, sub_entity, "pulled data from source 2");
        Ok(SourcePayload {
            source: SOURCE_ID.to_string(),
            entity: entity.to_string(),
            sub_entity: sub_entity.to_string(),
            timestamp: Utc::now(),
            fields,
        })
    }
}

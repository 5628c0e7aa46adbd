//! Field-level reconciliation
//!
//! Compares the two source payloads field by field. Disagreement is a
//! reconciliation *outcome*, not a failure; the stage only fails on
//! conditions the comparison cannot make sense of, such as payloads that
//! belong to a different work item.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::traits::Reconciler;
use crate::core::types::{ReconOutcome, ReconcileError, SourcePayload};

/// Reconciler comparing the union of both payloads' fields.
#[derive(Debug, Default)]
pub struct FieldReconciler;

#[async_trait]
impl Reconciler for FieldReconciler {
    async fn reconcile(
        &self,
        payload_a: &SourcePayload,
        payload_b: &SourcePayload,
        entity: &str,
        sub_entity: &str,
    ) -> Result<ReconOutcome, ReconcileError> {
        for payload in [payload_a, payload_b] {
            if payload.entity != entity || payload.sub_entity != sub_entity {
                return Err(ReconcileError::Unexpected(format!(
                    "payload from {} belongs to {}/{}, expected {}/{}",
                    payload.source, payload.entity, payload.sub_entity, entity, sub_entity
                )));
            }
        }

        let mut keys: Vec<&String> = payload_a.fields.keys().chain(payload_b.fields.keys()).collect();
        keys.sort();
        keys.dedup();

        let fields_compared = keys.len();
        let mut discrepancies = Vec::new();
        for key in keys {
            match (payload_a.fields.get(key), payload_b.fields.get(key)) {
                (Some(a), Some(b)) if a == b => {}
                (Some(a), Some(b)) => {
                    discrepancies.push(format!("{key}: {a} != {b}"));
                }
                (Some(_), None) => {
                    discrepancies.push(format!("{key}: missing in {}", payload_b.source));
                }
                (None, Some(_)) => {
                    discrepancies.push(format!("{key}: missing in {}", payload_a.source));
                }
                (None, None) => unreachable!("key came from one of the payloads"),
            }
        }

        let matched = discrepancies.is_empty();
        if matched {
            debug!(entity, sub_entity, fields_compared, "payloads match");
        } else {
            warn!(
                entity,
                sub_entity,
                discrepancies = discrepancies.len(),
                "payloads disagree"
            );
        }

        Ok(ReconOutcome {
            matched,
            fields_compared,
            discrepancies,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn payload(source: &str, fields: &[(&str, serde_json::Value)]) -> SourcePayload {
        SourcePayload {
            source: source.to_string(),
            entity: "E1".to_string(),
            sub_entity: "S1".to_string(),
            timestamp: Utc::now(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn identical_fields_match() {
        let a = payload("source1", &[("metric_1", json!(100)), ("status", json!("active"))]);
        let b = payload("source2", &[("metric_1", json!(100)), ("status", json!("active"))]);

        let outcome = FieldReconciler
            .reconcile(&a, &b, "E1", "S1")
            .await
            .expect("reconciles");

        assert!(outcome.matched);
        assert_eq!(outcome.fields_compared, 2);
        assert!(outcome.discrepancies.is_empty());
    }

    #[tokio::test]
    async fn differing_and_missing_fields_are_reported() {
        let a = payload("source1", &[("metric_1", json!(100)), ("metric_2", json!(200))]);
        let b = payload("source2", &[("metric_1", json!(105))]);

        let outcome = FieldReconciler
            .reconcile(&a, &b, "E1", "S1")
            .await
            .expect("reconciles");

        assert!(!outcome.matched);
        assert_eq!(outcome.fields_compared, 2);
        assert_eq!(outcome.discrepancies.len(), 2);
        assert!(outcome.discrepancies[0].contains("metric_1"));
        assert!(outcome.discrepancies[1].contains("missing in source2"));
    }

    #[tokio::test]
    async fn identity_mismatch_is_an_error() {
        let a = payload("source1", &[]);
        let b = payload("source2", &[]);

        let result = FieldReconciler.reconcile(&a, &b, "E9", "S1").await;
        assert!(matches!(result, Err(ReconcileError::Unexpected(_))));
    }
}

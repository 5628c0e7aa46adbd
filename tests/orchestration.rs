//! End-to-end orchestration tests
//!
//! Drives a full batch through scripted sources and a counting reconciler,
//! covering the mixed success/timeout/double-failure scenario and the
//! report derived from it.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;

use reconrun::core::report;
use reconrun::{
    BatchRunner, FetchError, Fetcher, ReconOutcome, ReconcileError, Reconciler,
    ReconciliationResult, RunnerConfig, SourcePayload, Stage, WorkItem,
};

#[derive(Clone, Copy)]
enum Behavior {
    Ok,
    Fail,
    Hang,
}

/// Fetcher scripted per work item; anything not scripted succeeds.
struct ScriptedFetcher {
    label: &'static str,
    script: HashMap<(String, String), Behavior>,
}

impl ScriptedFetcher {
    fn new(label: &'static str, script: &[(&str, &str, Behavior)]) -> Arc<Self> {
        Arc::new(Self {
            label,
            script: script
                .iter()
                .map(|(e, s, b)| ((e.to_string(), s.to_string()), *b))
                .collect(),
        })
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    fn source(&self) -> &str {
        self.label
    }

    async fn fetch(&self, entity: &str, sub_entity: &str) -> Result<SourcePayload, FetchError> {
        let behavior = self
            .script
            .get(&(entity.to_string(), sub_entity.to_string()))
            .copied()
            .unwrap_or(Behavior::Ok);
        match behavior {
            Behavior::Ok => Ok(SourcePayload {
                source: self.label.to_string(),
                entity: entity.to_string(),
                sub_entity: sub_entity.to_string(),
                timestamp: Utc::now(),
                fields: BTreeMap::from([("metric_1".to_string(), serde_json::json!(100))]),
            }),
            Behavior::Fail => Err(FetchError::Network("upstream unavailable".into())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Unexpected("should have been abandoned".into()))
            }
        }
    }
}

struct CountingReconciler {
    calls: AtomicUsize,
}

impl CountingReconciler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Reconciler for CountingReconciler {
    async fn reconcile(
        &self,
        _payload_a: &SourcePayload,
        _payload_b: &SourcePayload,
        _entity: &str,
        _sub_entity: &str,
    ) -> Result<ReconOutcome, ReconcileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ReconOutcome {
            matched: true,
            fields_compared: 1,
            discrepancies: vec![],
        })
    }
}

fn mixed_scenario_runner(reconciler: Arc<CountingReconciler>) -> BatchRunner {
    // (E1,S1): both pulls succeed. (E1,S2): source B hangs past the
    // timeout. (E2,S1): both pulls fail outright.
    let fetcher_a = ScriptedFetcher::new("source1", &[("E2", "S1", Behavior::Fail)]);
    let fetcher_b = ScriptedFetcher::new(
        "source2",
        &[("E1", "S2", Behavior::Hang), ("E2", "S1", Behavior::Fail)],
    );
    BatchRunner::new(
        fetcher_a,
        fetcher_b,
        reconciler,
        RunnerConfig::new().with_fetch_timeout(Duration::from_millis(100)),
    )
}

fn mixed_scenario_work() -> Vec<WorkItem> {
    vec![
        WorkItem::new("E1", "S1"),
        WorkItem::new("E1", "S2"),
        WorkItem::new("E2", "S1"),
    ]
}

#[tokio::test]
async fn mixed_batch_captures_every_failure_mode() {
    let reconciler = CountingReconciler::new();
    let runner = mixed_scenario_runner(Arc::clone(&reconciler));

    let clock = Instant::now();
    let outcomes = runner.run(mixed_scenario_work()).await;

    // The hung fetch must be abandoned, not waited out.
    assert!(clock.elapsed() < Duration::from_secs(5));

    assert_eq!(outcomes.len(), 3);
    for (outcome, item) in outcomes.iter().zip(mixed_scenario_work()) {
        assert_eq!(outcome.item, item);
    }

    // (E1,S1): fully successful.
    assert!(outcomes[0].success);
    assert!(outcomes[0].errors.is_empty());
    assert!(outcomes[0].reconciliation.is_success());

    // (E1,S2): source B timed out; reconciliation skipped.
    assert!(!outcomes[1].success);
    assert!(matches!(
        outcomes[1].source_b,
        Err(FetchError::Timeout(_))
    ));
    assert!(matches!(
        outcomes[1].reconciliation,
        ReconciliationResult::Skipped(_)
    ));
    assert!(outcomes[1].errors[0].message.contains("timed out"));

    // (E2,S1): both pulls failed; two fetch-stage errors in stage order.
    assert!(!outcomes[2].success);
    let fetch_stages: Vec<Stage> = outcomes[2]
        .errors
        .iter()
        .map(|e| e.stage)
        .filter(|s| *s != Stage::Reconciliation)
        .collect();
    assert_eq!(fetch_stages, vec![Stage::SourceA, Stage::SourceB]);

    // Reconciler ran for the fully-successful item only.
    assert_eq!(reconciler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn mixed_batch_report_reflects_outcomes() {
    let reconciler = CountingReconciler::new();
    let runner = mixed_scenario_runner(reconciler);
    let outcomes = runner.run(mixed_scenario_work()).await;

    let batch_report = report::summarize(&outcomes);
    assert_eq!(batch_report.total, 3);
    assert_eq!(batch_report.succeeded, 1);
    assert_eq!(batch_report.failed, 2);
    assert_eq!(
        batch_report.total_duration,
        outcomes.iter().map(|o| o.duration).sum::<Duration>()
    );

    let text = report::render(&batch_report);
    assert!(text.contains("Successful: 1"));
    assert!(text.contains("Failed: 2"));
    assert!(text.contains("Entity: E1/S2"));
    assert!(text.contains("timed out"));
    assert!(text.contains("Entity: E2/S1"));
}

#[tokio::test]
async fn single_failure_attributes_exactly_one_fetch_error() {
    let reconciler = CountingReconciler::new();
    let fetcher_a = ScriptedFetcher::new("source1", &[("E1", "S1", Behavior::Fail)]);
    let fetcher_b = ScriptedFetcher::new("source2", &[]);
    let runner = BatchRunner::new(
        fetcher_a,
        fetcher_b,
        Arc::<CountingReconciler>::clone(&reconciler),
        RunnerConfig::new().with_fetch_timeout(Duration::from_secs(5)),
    );

    let outcomes = runner.run(vec![WorkItem::new("E1", "S1")]).await;
    let outcome = &outcomes[0];

    assert!(!outcome.success);
    assert!(outcome.source_b.is_ok());
    let fetch_errors: Vec<&Stage> = outcome
        .errors
        .iter()
        .map(|e| &e.stage)
        .filter(|s| **s != Stage::Reconciliation)
        .collect();
    assert_eq!(fetch_errors, vec![&Stage::SourceA]);
    assert_eq!(reconciler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_batch_matches_sequential_results() {
    let work: Vec<WorkItem> = (0..8).map(|i| WorkItem::new("E1", format!("S{i}"))).collect();

    let sequential = BatchRunner::new(
        ScriptedFetcher::new("source1", &[]),
        ScriptedFetcher::new("source2", &[]),
        CountingReconciler::new(),
        RunnerConfig::new().with_fetch_timeout(Duration::from_secs(5)),
    );
    let concurrent = BatchRunner::new(
        ScriptedFetcher::new("source1", &[]),
        ScriptedFetcher::new("source2", &[]),
        CountingReconciler::new(),
        RunnerConfig::new()
            .with_fetch_timeout(Duration::from_secs(5))
            .with_max_in_flight(4),
    );

    let seq_outcomes = sequential.run(work.clone()).await;
    let conc_outcomes = concurrent.run(work.clone()).await;

    assert_eq!(seq_outcomes.len(), conc_outcomes.len());
    for ((seq, conc), item) in seq_outcomes.iter().zip(&conc_outcomes).zip(&work) {
        assert_eq!(&seq.item, item);
        assert_eq!(&conc.item, item);
        assert_eq!(seq.success, conc.success);
    }
}

//! Configuration management for the runner
//!
//! Handles loading and validation of the entity mapping plus runner
//! tunables, and synthesizes a sample configuration when none exists.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::batch::RunnerConfig;
use crate::core::types::WorkItem;
use crate::error::{Result, RunnerError};

/// Top-level configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Runner tunables
    #[serde(default)]
    pub runner: RunnerSettings,
    /// Entities to process, in order
    pub entities: Vec<EntityConfig>,
}

/// One configured entity and its ordered sub-entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity name
    pub name: String,
    /// Sub-entities to process for this entity, in order
    pub sub_entities: Vec<String>,
}

/// Runner tunables with sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Per-fetcher timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Reconciliation timeout in seconds
    #[serde(default = "default_recon_timeout_secs")]
    pub recon_timeout_secs: u64,
    /// Maximum items processed concurrently
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Where to write the text report
    #[serde(default = "default_report_file")]
    pub report_file: PathBuf,
}

fn default_fetch_timeout_secs() -> u64 {
    300
}

fn default_recon_timeout_secs() -> u64 {
    300
}

fn default_max_in_flight() -> usize {
    1
}

fn default_report_file() -> PathBuf {
    PathBuf::from("report.txt")
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            recon_timeout_secs: default_recon_timeout_secs(),
            max_in_flight: default_max_in_flight(),
            report_file: default_report_file(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RunnerError::Config(format!("failed to read config file: {e}")))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| RunnerError::Config(format!("failed to parse config: {e}")))?;

        config.validate()?;

        debug!(entities = config.entities.len(), "configuration loaded");
        Ok(config)
    }

    /// Load from `path`, writing the sample configuration first if the file
    /// does not exist
    pub async fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let sample = Self::sample();
            sample.write(path).await?;
            info!(path = %path.display(), "created sample configuration file");
        }
        Self::from_file(path).await
    }

    /// The built-in sample mapping, used when no configuration file exists
    pub fn sample() -> Self {
        Self {
            runner: RunnerSettings::default(),
            entities: vec![
                EntityConfig {
                    name: "EntityA".into(),
                    sub_entities: vec!["SubA1".into(), "SubA2".into(), "SubA3".into()],
                },
                EntityConfig {
                    name: "EntityB".into(),
                    sub_entities: vec!["SubB1".into(), "SubB2".into()],
                },
                EntityConfig {
                    name: "EntityC".into(),
                    sub_entities: vec!["SubC1".into()],
                },
            ],
        }
    }

    /// Serialize and write this configuration to `path`
    pub async fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path.as_ref(), content).await?;
        Ok(())
    }

    /// Reject empty or duplicate work definitions before any item runs
    pub fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(RunnerError::Config("no entities configured".into()));
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(RunnerError::Config("entity with empty name".into()));
            }
            if entity.sub_entities.is_empty() {
                return Err(RunnerError::Config(format!(
                    "entity {} has no sub-entities",
                    entity.name
                )));
            }
            for sub_entity in &entity.sub_entities {
                if sub_entity.trim().is_empty() {
                    return Err(RunnerError::Config(format!(
                        "entity {} has an empty sub-entity name",
                        entity.name
                    )));
                }
                if !seen.insert((entity.name.as_str(), sub_entity.as_str())) {
                    return Err(RunnerError::Config(format!(
                        "duplicate work item {}/{}",
                        entity.name, sub_entity
                    )));
                }
            }
        }
        Ok(())
    }

    /// Expand the entity mapping into the ordered batch of work items
    pub fn work_items(&self) -> Vec<WorkItem> {
        self.entities
            .iter()
            .flat_map(|entity| {
                entity
                    .sub_entities
                    .iter()
                    .map(|sub_entity| WorkItem::new(&entity.name, sub_entity))
            })
            .collect()
    }

    /// Runner tunables as the engine consumes them
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_fetch_timeout(Duration::from_secs(self.runner.fetch_timeout_secs))
            .with_recon_timeout(Duration::from_secs(self.runner.recon_timeout_secs))
            .with_max_in_flight(self.runner.max_in_flight)
    }
}

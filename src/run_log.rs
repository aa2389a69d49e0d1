//! DTOs and I/O for the JSON run log: one entry per trigger for debugging a
//! processor's routing decisions.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::types::FlowFileId;

/// Current run log format version.
pub const RUN_LOG_VERSION: u32 = 1;

/// One trigger invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEntry {
  /// 1-based trigger index.
  pub step: usize,
  /// Flow file dequeued during this trigger, if any.
  pub flow_file: Option<FlowFileId>,
  /// Its `filename` attribute at transfer time.
  pub filename: Option<String>,
  /// Relationship it was routed to, if any.
  pub relationship: Option<String>,
}

/// Root structure of the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
  pub version: u32,
  /// Name the processor was resolved under.
  pub processor: String,
  /// RFC 3339 timestamp when seeding started.
  pub started_at: String,
  /// RFC 3339 timestamp when the last trigger returned.
  pub finished_at: Option<String>,
  /// Flow files seeded into the input queue.
  pub seeded: usize,
  pub triggers: Vec<TriggerEntry>,
  /// Flow files per relationship.
  pub counts: BTreeMap<String, usize>,
}

impl RunLog {
  pub fn new(processor: impl Into<String>, started_at: String) -> Self {
    Self {
      version: RUN_LOG_VERSION,
      processor: processor.into(),
      started_at,
      finished_at: None,
      seeded: 0,
      triggers: Vec::new(),
      counts: BTreeMap::new(),
    }
  }

  /// Total flow files across all relationships.
  pub fn transferred(&self) -> usize {
    self.counts.values().sum()
  }
}

/// Writes `log` to `path` as pretty JSON, creating the parent directory.
#[instrument(level = "trace", skip(path, log))]
pub fn save_run_log(path: &Path, log: &RunLog) -> Result<(), std::io::Error> {
  let json = serde_json::to_string_pretty(log)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)
}

/// Loads a run log from `path`. Errors on a missing file or invalid JSON.
#[cfg(test)]
#[instrument(level = "trace", skip(path))]
pub(crate) fn load_run_log(path: &Path) -> Result<RunLog, std::io::Error> {
  let bytes = std::fs::read(path)?;
  serde_json::from_slice(&bytes)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

//! Execution result types.
//!
//! Bitstring ordering: the rightmost bit corresponds to the
//! lowest-indexed qubit. For example, the string `"01"` means qubit 0
//! measured `1` and qubit 1 measured `0`.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::job::JobId;

/// Measurement counts from one experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Map from bitstring to count.
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from an iterator of (bitstring, count) pairs.
    /// Duplicate bitstrings are accumulated (summed), consistent with `insert()`.
    pub fn from_pairs(iter: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }

    /// Insert a count for a bitstring.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_default() += count;
    }

    /// Get the count for a bitstring.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Iterate over (bitstring, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// Get the total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Get the number of unique bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if counts are empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Result record for one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Name of the experiment this record belongs to.
    pub name: String,
    /// Whether this experiment ran successfully.
    pub success: bool,
    /// Number of shots executed.
    pub shots: u32,
    /// Measurement counts.
    pub counts: Counts,
    /// Additional backend-specific data (snapshots, memory, ...).
    #[serde(default)]
    pub data: Value,
}

impl ExperimentResult {
    /// Create a successful experiment record.
    pub fn new(name: impl Into<String>, counts: Counts, shots: u32) -> Self {
        Self {
            name: name.into(),
            success: true,
            shots,
            counts,
            data: Value::Null,
        }
    }
}

/// Result of one backend job, and also the combined result handed back to
/// the caller once every chunk's records are concatenated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    /// Name of the backend that produced the result.
    pub backend_name: String,
    /// Job that produced the result.
    pub job_id: JobId,
    /// Identifier of the batch the job ran.
    pub batch_id: String,
    /// Whether the job produced a usable result.
    pub success: bool,
    /// Backend status text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Completion time reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// Header metadata echoed by the backend.
    #[serde(default)]
    pub header: Map<String, Value>,
    /// Per-experiment records, in experiment order.
    pub results: Vec<ExperimentResult>,
}

impl ChunkResult {
    /// Create a successful result.
    pub fn new(
        backend_name: impl Into<String>,
        job_id: JobId,
        batch_id: impl Into<String>,
        results: Vec<ExperimentResult>,
    ) -> Self {
        Self {
            backend_name: backend_name.into(),
            job_id,
            batch_id: batch_id.into(),
            success: true,
            status: None,
            date: None,
            header: Map::new(),
            results,
        }
    }

    /// Mark the result as failed, with a status message.
    pub fn failed(mut self, status: impl Into<String>) -> Self {
        self.success = false;
        self.status = Some(status.into());
        self
    }

    /// Set the completion time.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Look up the counts of an experiment by name.
    pub fn counts(&self, name: &str) -> Option<&Counts> {
        self.results.iter().find(|r| r.name == name).map(|r| &r.counts)
    }
}

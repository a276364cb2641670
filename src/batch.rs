//! Units of work handed to a backend.
//!
//! A [`WorkBatch`] is an ordered list of independent experiments plus the
//! configuration and header shared by all of them. The same type describes a
//! caller's full batch and each backend-sized chunk cut from it: a chunk is
//! just a batch over a contiguous range of the parent's experiments, with a
//! fresh `batch_id`.
//!
//! Experiment order is significant. `result.results[i]` must correspond to
//! `batch.experiments[i]` all the way through the runner.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Concrete representation of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    /// Gate-level experiments. The only kind the chunker can slice.
    Qasm,
    /// Pulse-level experiments.
    Pulse,
}

impl std::fmt::Display for BatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchKind::Qasm => write!(f, "qasm"),
            BatchKind::Pulse => write!(f, "pulse"),
        }
    }
}

/// A single experiment. The instruction payload is opaque to the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Experiment name, carried through to its result.
    pub name: String,
    /// Backend-specific instructions.
    #[serde(default)]
    pub instructions: Value,
}

impl Experiment {
    /// Create an experiment with no instructions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: Value::Null,
        }
    }

    /// Attach an instruction payload.
    pub fn with_instructions(mut self, instructions: Value) -> Self {
        self.instructions = instructions;
        self
    }
}

/// An ordered batch of experiments with shared metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkBatch {
    /// Unique batch identifier. Never reused across chunks.
    pub batch_id: String,
    /// Representation of the experiments.
    pub kind: BatchKind,
    /// Run configuration shared by every experiment (shots, memory, ...).
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Header metadata shared by every experiment.
    #[serde(default)]
    pub header: Map<String, Value>,
    /// Experiments, in caller order.
    pub experiments: Vec<Experiment>,
}

impl WorkBatch {
    /// Create a batch with a fresh identifier.
    pub fn new(kind: BatchKind, experiments: Vec<Experiment>) -> Self {
        Self {
            batch_id: Uuid::new_v4().to_string(),
            kind,
            config: Map::new(),
            header: Map::new(),
            experiments,
        }
    }

    /// Create a gate-level batch.
    pub fn qasm(experiments: Vec<Experiment>) -> Self {
        Self::new(BatchKind::Qasm, experiments)
    }

    /// Set a shared configuration entry.
    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// Set a shared header entry.
    pub fn with_header(mut self, key: impl Into<String>, value: Value) -> Self {
        self.header.insert(key.into(), value);
        self
    }

    /// Build a sibling batch over `experiments`, sharing this batch's
    /// metadata under a new identifier.
    pub fn derive(&self, experiments: Vec<Experiment>) -> Self {
        Self {
            batch_id: Uuid::new_v4().to_string(),
            kind: self.kind,
            config: self.config.clone(),
            header: self.header.clone(),
            experiments,
        }
    }

    /// Same batch under a new identifier, for re-submission.
    pub fn with_fresh_id(mut self) -> Self {
        self.batch_id = Uuid::new_v4().to_string();
        self
    }

    /// Number of experiments.
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Check if the batch has no experiments.
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

//! Backend capability introspection.
//!
//! [`Capabilities`] is what the runner needs to know about a backend before
//! it submits anything:
//!
//! - whether it is a simulator (simulators skip job recovery),
//! - whether it is local (local backends take the whole batch in one job),
//! - how many experiments a remote backend accepts per job,
//! - whether it offers an expedited submission path that skips payload
//!   validation.
//!
//! Capabilities are resolved once, at the collaborator boundary, instead of
//! inspecting backend types at runtime.

use serde::{Deserialize, Serialize};

/// What a backend can do, as far as batch execution is concerned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Whether this is a simulator (not real hardware).
    pub is_simulator: bool,
    /// Whether the backend runs in-process or on the local machine.
    pub is_local: bool,
    /// Maximum number of experiments accepted in one job.
    pub max_experiments: usize,
    /// Whether `run` can skip payload validation.
    #[serde(default)]
    pub expedited_submission: bool,
    /// Additional features supported by this backend.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of an in-process simulator: local, unbounded batch size.
    pub fn local_simulator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_simulator: true,
            is_local: true,
            max_experiments: usize::MAX,
            expedited_submission: false,
            features: vec!["statevector".into()],
        }
    }

    /// Capabilities of a simulator hosted by a remote service.
    pub fn remote_simulator(name: impl Into<String>, max_experiments: usize) -> Self {
        Self {
            name: name.into(),
            is_simulator: true,
            is_local: false,
            max_experiments,
            expedited_submission: false,
            features: vec![],
        }
    }

    /// Capabilities of a remote hardware device.
    pub fn device(name: impl Into<String>, max_experiments: usize) -> Self {
        Self {
            name: name.into(),
            is_simulator: false,
            is_local: false,
            max_experiments,
            expedited_submission: false,
            features: vec![],
        }
    }

    /// Advertise the expedited submission path.
    pub fn with_expedited_submission(mut self) -> Self {
        self.expedited_submission = true;
        self
    }

    /// Whether failed jobs should be recovered by re-submission.
    ///
    /// Simulator failures are rare and usually not recoverable, so only
    /// hardware gets the recovery loop.
    pub fn needs_recovery(&self) -> bool {
        !self.is_simulator
    }

    /// Check the descriptor is usable by the runner.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("backend has no name".into());
        }
        if !self.is_local && self.max_experiments == 0 {
            return Err(format!(
                "remote backend {} reports a maximum of 0 experiments per job",
                self.name
            ));
        }
        Ok(())
    }
}

//! Job lifecycle types.
//!
//! The job state machine as reported by a backend:
//!
//! ```text
//!   run() ──→ Queued ──→ Running ──→ Done
//!               │           │
//!               │           ├──→ Error
//!               │           │
//!               └───────────┴──→ Cancelled
//! ```
//!
//! `Done`, `Cancelled` and `Error` are final. Everything else, including
//! statuses the runner does not recognise, keeps the poller going.

use serde::{Deserialize, Serialize};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job, mapped from whatever the backend reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job is waiting in queue.
    Queued,
    /// Job is currently running.
    Running,
    /// Job finished. The result may still report failure.
    Done,
    /// Job was cancelled.
    Cancelled,
    /// Job hit an error.
    Error,
    /// Any status the runner has no mapping for (e.g. `VALIDATING`).
    Other(String),
}

impl JobStatus {
    /// Check if this is a final state.
    pub fn is_final(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Cancelled | JobStatus::Error)
    }

    /// Map a backend status string onto the closed set.
    pub fn from_backend(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "QUEUED" => JobStatus::Queued,
            "RUNNING" => JobStatus::Running,
            "DONE" | "COMPLETED" => JobStatus::Done,
            "CANCELLED" => JobStatus::Cancelled,
            "ERROR" | "FAILED" => JobStatus::Error,
            _ => JobStatus::Other(raw.to_string()),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "QUEUED"),
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Done => write!(f, "DONE"),
            JobStatus::Cancelled => write!(f, "CANCELLED"),
            JobStatus::Error => write!(f, "ERROR"),
            JobStatus::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// One chunk's live job: its position in the batch, the handle and its id.
///
/// Replaced wholesale when the chunk is re-submitted; the old handle is
/// dropped.
#[derive(Debug)]
pub struct SubmittedJob<J> {
    /// Position of the chunk in the original batch.
    pub chunk_index: usize,
    /// Backend handle for the running job.
    pub handle: J,
    /// Identifier read back from the handle.
    pub job_id: JobId,
    /// Last status observed.
    pub status: Option<JobStatus>,
}

impl<J> SubmittedJob<J> {
    /// Track a freshly submitted job.
    pub fn new(chunk_index: usize, handle: J, job_id: JobId) -> Self {
        Self {
            chunk_index,
            handle,
            job_id,
            status: None,
        }
    }
}

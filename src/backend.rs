//! Backend and job handle traits.
//!
//! The runner consumes a backend only through these two traits:
//!
//! ```text
//!   Backend::run() ──→ JobHandle::job_id() ──→ JobHandle::status() ──→ JobHandle::result()
//!       │                                           │
//!       │                         (dead job) JobHandle::work_batch() ──→ Backend::run()
//!       │
//!   Backend::retrieve_job(id) ──→ fresh JobHandle for a known id
//! ```
//!
//! ## Method table
//!
//! | Method | Kind | May fail | Used by |
//! |--------|------|----------|---------|
//! | `Backend::capabilities()` | sync | no | orchestrator |
//! | `Backend::availability()` | async | yes (logged) | orchestrator |
//! | `Backend::run()` | async | yes (retried) | submission guard |
//! | `Backend::retrieve_job()` | async | yes (transient ones retried) | recovery loop |
//! | `JobHandle::job_id()` | sync | yes (re-submitted) | submission guard |
//! | `JobHandle::status()` | async | yes | status prober |
//! | `JobHandle::queue_position()` | async | yes (reported as 0) | recovery loop |
//! | `JobHandle::result()` | async | yes | recovery loop, direct fetch |
//! | `JobHandle::work_batch()` | sync | no | recovery loop |
//! | `JobHandle::error_message()` | async | no | recovery loop |
//!
//! No wire protocol is implied. Implementations own all transport details.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::batch::WorkBatch;
use crate::capability::Capabilities;
use crate::config::{PollConfig, SubmitOptions};
use crate::error::BackendResult;
use crate::job::{JobId, JobStatus};
use crate::result::ChunkResult;

/// Handle to one job running on a backend.
#[async_trait]
pub trait JobHandle: Send + Sync {
    /// Identifier assigned by the backend.
    ///
    /// Some backends only learn the id once the submission has been accepted,
    /// so reading it can fail.
    fn job_id(&self) -> BackendResult<JobId>;

    /// Current status of the job.
    async fn status(&self) -> BackendResult<JobStatus>;

    /// Position in the backend queue, if the backend reports one.
    async fn queue_position(&self) -> BackendResult<Option<u32>>;

    /// Block until the job finishes and return its result.
    async fn result(&self, poll: &PollConfig) -> BackendResult<ChunkResult>;

    /// The batch this job was submitted with.
    ///
    /// Must stay available after the job is cancelled or fails, so that the
    /// runner can re-submit it.
    fn work_batch(&self) -> WorkBatch;

    /// Error message attached to a failed job, if any.
    async fn error_message(&self) -> Option<String>;
}

/// A backend that executes batches as jobs.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Job handle type returned by this backend.
    type Job: JobHandle;

    /// Get the capabilities of this backend.
    ///
    /// Implementations MUST cache capabilities at construction time.
    fn capabilities(&self) -> &Capabilities;

    /// Get the name of this backend.
    fn name(&self) -> &str {
        &self.capabilities().name
    }

    /// Lightweight liveness check, used for diagnostics only.
    async fn availability(&self) -> BackendResult<BackendAvailability>;

    /// Submit a batch for execution.
    ///
    /// `options.expedited` is only ever set when the backend advertises
    /// [`Capabilities::expedited_submission`].
    async fn run(&self, batch: &WorkBatch, options: &SubmitOptions) -> BackendResult<Self::Job>;

    /// Look up an existing job by id.
    async fn retrieve_job(&self, job_id: &JobId) -> BackendResult<Self::Job>;
}

/// Progress callback invoked on every poll of a job.
///
/// Called with the job id, its status, its queue position (0 when unknown or
/// not queued) and the live handle. It fires once more when the job reaches a
/// final status.
pub trait JobObserver: Send + Sync {
    /// Report one observation.
    fn on_status(&self, job_id: &JobId, status: &JobStatus, queue_position: u32, job: &dyn JobHandle);
}

impl<F> JobObserver for F
where
    F: Fn(&JobId, &JobStatus, u32, &dyn JobHandle) + Send + Sync,
{
    fn on_status(&self, job_id: &JobId, status: &JobStatus, queue_position: u32, job: &dyn JobHandle) {
        self(job_id, status, queue_position, job)
    }
}

/// Backend availability information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Create availability for a backend that is always available.
    ///
    /// Typical for simulators: zero queue.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            status_message: None,
        }
    }

    /// Create availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

impl std::fmt::Display for BackendAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_available { "operational" } else { "offline" };
        write!(f, "{state}")?;
        if let Some(depth) = self.queue_depth {
            write!(f, ", {depth} pending jobs")?;
        }
        if let Some(msg) = &self.status_message {
            write!(f, " ({msg})")?;
        }
        Ok(())
    }
}

//! Error types.
//!
//! Two layers of failure exist:
//!
//! | Layer | Type | Who produces it |
//! |-------|------|-----------------|
//! | **Collaborator** | [`BackendError`] | Backend / job handle implementations |
//! | **Runner** | [`RunnerError`] | This crate, surfaced from `execute` |
//!
//! Most collaborator failures never leave the runner:
//!
//! | Failure | Handling |
//! |---------|----------|
//! | Submission / job id read-back | Retried forever, logged |
//! | Status query, [`BackendError::Job`] | Retried after a fixed delay, logged |
//! | Status query, anything else | Fatal: [`RunnerError::FailedToGetStatus`] |
//! | Job cancelled / errored | Chunk re-submitted, logged |
//! | Result reports failure | Job re-fetched by id, logged |
//! | Simulator result fetch | Fatal: [`RunnerError::ResultFetch`] |
//! | Job re-fetch, transient (see [`BackendError::is_transient`]) | Retried every poll interval |
//! | Job re-fetch, anything else | Fatal: [`RunnerError::FailedToRetrieveJob`] |

use thiserror::Error;

use crate::batch::BatchKind;
use crate::job::JobId;

/// Errors reported by a backend or one of its job handles.
///
/// [`BackendError::Job`] is the backend's *expected* job-error kind: the one
/// failure mode the runner knows to be transient while probing status.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// Expected job-level error raised by the backend's job layer.
    #[error("Job error: {0}")]
    Job(String),

    /// Backend is not reachable.
    #[error("Backend not available: {0}")]
    Unavailable(String),

    /// Backend timed out answering a request.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Job is unknown to the backend.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Credentials rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Operation not offered by this backend.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl BackendError {
    /// Returns `true` for the backend's expected job-error kind.
    pub fn is_job_error(&self) -> bool {
        matches!(self, Self::Job(_))
    }

    /// Returns `true` if the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Job(_) | Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that escape [`execute`](crate::orchestrator::execute).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunnerError {
    /// Backend fails its capability check.
    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    /// The batch has to be split but its kind cannot be sliced.
    #[error("Cannot split a {0} batch, only qasm batches are supported")]
    InvalidBatchKind(BatchKind),

    /// Status query failed in a way the runner does not know how to recover.
    #[error("FAILURE: job id: {job_id}, status: 'FAIL_TO_GET_STATUS', unknown error: {source}")]
    FailedToGetStatus {
        /// Job whose status could not be read.
        job_id: JobId,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },

    /// Direct result fetch failed. Only raised for simulators, which are
    /// fetched once without recovery.
    #[error("Failed to fetch result of job {job_id}: {source}")]
    ResultFetch {
        /// Job whose result could not be fetched.
        job_id: JobId,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },

    /// A finished job could not be looked up again by id.
    #[error("Failed to retrieve job {job_id}: {source}")]
    FailedToRetrieveJob {
        /// Job that could not be retrieved.
        job_id: JobId,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },

    /// Internal contract violation (e.g. nothing to combine).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Execution configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

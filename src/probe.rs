//! Status probing with transient-failure tolerance.

use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::backend::JobHandle;
use crate::error::{RunnerError, RunnerResult};
use crate::job::{JobId, JobStatus};

/// Delay before re-querying after a transient status failure.
pub const STATUS_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Query the status of `job`.
///
/// The backend's expected job error is retried every [`STATUS_RETRY_DELAY`]
/// for as long as it keeps happening. Any other failure is fatal.
pub async fn probe_status<J: JobHandle + ?Sized>(job: &J, job_id: &JobId) -> RunnerResult<JobStatus> {
    loop {
        match job.status().await {
            Ok(status) => return Ok(status),
            Err(error) if error.is_job_error() => {
                warn!(
                    %job_id,
                    %error,
                    "FAILURE: status 'FAIL_TO_GET_STATUS', retrying in {}s",
                    STATUS_RETRY_DELAY.as_secs()
                );
                sleep(STATUS_RETRY_DELAY).await;
            }
            Err(source) => {
                return Err(RunnerError::FailedToGetStatus {
                    job_id: job_id.clone(),
                    source,
                });
            }
        }
    }
}

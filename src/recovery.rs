//! Per-chunk job recovery.
//!
//! Each submitted chunk is driven through:
//!
//! ```text
//!   Polling ──(Done)──────────────→ Fetching ──(success)──→ result
//!      ↑                               │
//!      │                               └──(failed result)──→ retrieve job by id ──→ Fetching
//!      │
//!      └── Resubmitting ←──(Cancelled / Error / other)── Polling
//! ```
//!
//! The loop only ends with a usable result, a fatal status-probe error or a
//! job that can no longer be retrieved by id.

use tokio::time::sleep;
use tracing::{info, warn};

use crate::backend::{Backend, JobHandle, JobObserver};
use crate::config::{PollConfig, SubmitOptions};
use crate::error::{RunnerError, RunnerResult};
use crate::job::{JobId, JobStatus, SubmittedJob};
use crate::probe::probe_status;
use crate::result::ChunkResult;
use crate::submit::submit;

enum Phase {
    Polling,
    Fetching,
    Resubmitting(JobStatus),
}

/// Shared, read-only inputs of every per-chunk recovery loop.
pub struct Recovery<'a, B: Backend> {
    backend: &'a B,
    poll: &'a PollConfig,
    options: &'a SubmitOptions,
    observer: Option<&'a dyn JobObserver>,
}

impl<'a, B: Backend> Recovery<'a, B> {
    /// Recovery on `backend`, polling per `poll` and re-submitting with
    /// `options`.
    pub fn new(backend: &'a B, poll: &'a PollConfig, options: &'a SubmitOptions) -> Self {
        Self {
            backend,
            poll,
            options,
            observer: None,
        }
    }

    /// Report every poll to `observer`.
    pub fn with_observer(mut self, observer: Option<&'a dyn JobObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Drive `job` until it yields a successful result.
    pub async fn run(&self, mut job: SubmittedJob<B::Job>) -> RunnerResult<ChunkResult> {
        let mut phase = Phase::Polling;
        loop {
            phase = match phase {
                Phase::Polling => {
                    info!(chunk = job.chunk_index, job_id = %job.job_id, "Running chunk");
                    match self.poll_until_final(&mut job).await? {
                        JobStatus::Done => Phase::Fetching,
                        status => Phase::Resubmitting(status),
                    }
                }
                Phase::Fetching => {
                    match job.handle.result(self.poll).await {
                        Ok(result) if result.success => {
                            info!(chunk = job.chunk_index, job_id = %job.job_id, "COMPLETED chunk");
                            return Ok(result);
                        }
                        Ok(result) => warn!(
                            job_id = %job.job_id,
                            status = result.status.as_deref().unwrap_or("unknown"),
                            "FAILURE: job completed without a usable result, retrieving it from the backend again"
                        ),
                        Err(error) => warn!(
                            job_id = %job.job_id,
                            %error,
                            "FAILURE: could not fetch result, retrieving the job from the backend again"
                        ),
                    }
                    job.handle = self.retrieve(&job.job_id).await?;
                    Phase::Fetching
                }
                Phase::Resubmitting(status) => {
                    let batch = job.handle.work_batch();
                    match status {
                        JobStatus::Cancelled => {
                            warn!(job_id = %job.job_id, "FAILURE: job is cancelled, resubmitting the batch")
                        }
                        JobStatus::Error => {
                            let cause = job.handle.error_message().await;
                            warn!(
                                job_id = %job.job_id,
                                error = cause.as_deref().unwrap_or("unknown"),
                                "FAILURE: job encountered an error, resubmitting the batch"
                            )
                        }
                        other => warn!(
                            job_id = %job.job_id,
                            status = %other,
                            "FAILURE: unknown final status, resubmitting the batch"
                        ),
                    }
                    let batch = batch.with_fresh_id();
                    let (handle, job_id) = submit(self.backend, &batch, self.options).await;
                    info!(chunk = job.chunk_index, old_job_id = %job.job_id, %job_id, "Chunk resubmitted");
                    job = SubmittedJob::new(job.chunk_index, handle, job_id);
                    Phase::Polling
                }
            };
        }
    }

    async fn poll_until_final(&self, job: &mut SubmittedJob<B::Job>) -> RunnerResult<JobStatus> {
        loop {
            let status = probe_status(&job.handle, &job.job_id).await?;
            job.status = Some(status.clone());

            if status.is_final() {
                self.notify(job, &status, 0);
                return Ok(status);
            }

            let mut queue_position = 0;
            if status == JobStatus::Queued {
                queue_position = match job.handle.queue_position().await {
                    Ok(position) => position.unwrap_or(0),
                    Err(error) => {
                        warn!(job_id = %job.job_id, %error, "Could not read queue position");
                        0
                    }
                };
                info!(job_id = %job.job_id, queue_position, "Job is queued");
            } else {
                info!(job_id = %job.job_id, %status, "Job status");
            }

            self.notify(job, &status, queue_position);
            sleep(self.poll.wait()).await;
        }
    }

    async fn retrieve(&self, job_id: &JobId) -> RunnerResult<B::Job> {
        loop {
            match self.backend.retrieve_job(job_id).await {
                Ok(job) => return Ok(job),
                Err(error) if error.is_transient() => {
                    warn!(%job_id, %error, "FAILURE: could not retrieve job, retrying");
                    sleep(self.poll.wait()).await;
                }
                Err(source) => {
                    return Err(RunnerError::FailedToRetrieveJob {
                        job_id: job_id.clone(),
                        source,
                    });
                }
            }
        }
    }

    fn notify(&self, job: &SubmittedJob<B::Job>, status: &JobStatus, queue_position: u32) {
        if let Some(observer) = self.observer {
            observer.on_status(&job.job_id, status, queue_position, &job.handle);
        }
    }
}

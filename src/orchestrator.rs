//! Top-level batch execution.
//!
//! ```text
//!   execute(batch)
//!     ├─ validate backend capabilities
//!     ├─ resolve chunk size   (override → backend limit → unbounded if local)
//!     ├─ split_batch          → chunk 0 .. chunk N-1
//!     ├─ submit × N           (all ids collected before any polling)
//!     ├─ recovery × N         (hardware)   or   result() × N   (simulators)
//!     └─ combine              (chunk order, never completion order)
//! ```

use futures::future::try_join_all;
use tracing::{Instrument, info, info_span, warn};

use crate::backend::{Backend, JobHandle, JobObserver};
use crate::batch::WorkBatch;
use crate::capability::Capabilities;
use crate::chunker::split_batch;
use crate::combine::combine;
use crate::config::ExecutionConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::job::{JobId, SubmittedJob};
use crate::recovery::Recovery;
use crate::result::ChunkResult;
use crate::submit::{effective_options, submit};

/// Maximum experiments per job for `capabilities` under `config`.
pub fn resolve_chunk_size(config: &ExecutionConfig, capabilities: &Capabilities) -> usize {
    match config.max_experiments_per_job {
        Some(max) => max,
        None if capabilities.is_local => usize::MAX,
        None => capabilities.max_experiments,
    }
}

/// Run `batch` on `backend` and return one result covering every experiment,
/// in batch order.
///
/// The batch is split into as many jobs as the backend needs. On hardware,
/// jobs that are cancelled or fail are re-submitted and failed results are
/// fetched again, for as long as it takes. Simulator jobs are fetched once.
///
/// `observer`, if given, is told about every status poll.
#[tracing::instrument(skip_all, fields(backend = backend.name(), experiments = batch.len()))]
pub async fn execute<B: Backend>(
    batch: WorkBatch,
    backend: &B,
    config: &ExecutionConfig,
    observer: Option<&dyn JobObserver>,
) -> RunnerResult<ChunkResult> {
    let capabilities = backend.capabilities();
    capabilities.validate().map_err(RunnerError::InvalidBackend)?;
    config.validate()?;

    let chunk_size = resolve_chunk_size(config, capabilities);
    let chunks = split_batch(batch, chunk_size)?;

    let options = config.submit_options();
    let options = effective_options(backend, &options).into_owned();

    let mut jobs = Vec::with_capacity(chunks.len());
    for (chunk_index, chunk) in chunks.iter().enumerate() {
        let (handle, job_id) = submit(backend, chunk, &options).await;
        jobs.push(SubmittedJob::new(chunk_index, handle, job_id));
    }
    drop(chunks);

    let results = if capabilities.needs_recovery() {
        log_submission(backend, &jobs).await;
        let recovery = Recovery::new(backend, &config.poll, &options).with_observer(observer);
        try_join_all(jobs.into_iter().map(|job| {
            let span = info_span!("chunk", index = job.chunk_index);
            recovery.run(job).instrument(span)
        }))
        .await?
    } else {
        try_join_all(jobs.iter().map(|job| async move {
            job.handle
                .result(&config.poll)
                .await
                .map_err(|source| RunnerError::ResultFetch {
                    job_id: job.job_id.clone(),
                    source,
                })
        }))
        .await?
    };

    combine(results)
}

async fn log_submission<B: Backend>(backend: &B, jobs: &[SubmittedJob<B::Job>]) {
    match backend.availability().await {
        Ok(availability) => info!(%availability, "Backend status"),
        Err(error) => warn!(%error, "Could not read backend status"),
    }
    let job_ids: Vec<&JobId> = jobs.iter().map(|job| &job.job_id).collect();
    info!(count = jobs.len(), ?job_ids, "Jobs submitted");
}

//! Flaky in-memory device driven through `hal_runner::execute`.
//!
//! The mock accepts at most 4 experiments per job, cancels every third job
//! it is given and reports a failed result for the first fetch of every
//! fifth. The runner splits, re-submits and re-fetches until the whole batch
//! comes back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hal_runner::{
    Backend, BackendAvailability, BackendError, BackendResult, Capabilities, ChunkResult, Counts,
    ExecutionConfig, Experiment, ExperimentResult, JobHandle, JobId, JobStatus, PollConfig,
    SubmitOptions, WorkBatch, execute, logging,
};

#[derive(Clone)]
struct JobRecord {
    batch: WorkBatch,
    polls_left: u32,
    cancelled: bool,
    fail_first_fetch: bool,
}

type Jobs = Arc<Mutex<HashMap<String, JobRecord>>>;

/// In-memory device.
struct MockDevice {
    capabilities: Capabilities,
    jobs: Jobs,
    next_id: Mutex<u64>,
}

impl MockDevice {
    fn new() -> Self {
        Self {
            capabilities: Capabilities::device("mock-device", 4),
            jobs: Arc::default(),
            next_id: Mutex::new(0),
        }
    }
}

struct MockJob {
    jobs: Jobs,
    id: JobId,
    batch: WorkBatch,
}

fn lock_err<T>(_: T) -> BackendError {
    BackendError::Backend("mock state poisoned".into())
}

#[async_trait]
impl JobHandle for MockJob {
    fn job_id(&self) -> BackendResult<JobId> {
        Ok(self.id.clone())
    }

    async fn status(&self) -> BackendResult<JobStatus> {
        let mut jobs = self.jobs.lock().map_err(lock_err)?;
        let job = jobs
            .get_mut(&self.id.0)
            .ok_or_else(|| BackendError::JobNotFound(self.id.0.clone()))?;
        if job.polls_left > 0 {
            job.polls_left -= 1;
            return Ok(JobStatus::Queued);
        }
        Ok(if job.cancelled {
            JobStatus::Cancelled
        } else {
            JobStatus::Done
        })
    }

    async fn queue_position(&self) -> BackendResult<Option<u32>> {
        let jobs = self.jobs.lock().map_err(lock_err)?;
        Ok(jobs.get(&self.id.0).map(|job| job.polls_left))
    }

    async fn result(&self, _poll: &PollConfig) -> BackendResult<ChunkResult> {
        let mut jobs = self.jobs.lock().map_err(lock_err)?;
        let job = jobs
            .get_mut(&self.id.0)
            .ok_or_else(|| BackendError::JobNotFound(self.id.0.clone()))?;

        let records = job
            .batch
            .experiments
            .iter()
            .map(|exp| ExperimentResult::new(&exp.name, Counts::from_pairs([("00", 512), ("11", 512)]), 1024))
            .collect();
        let result = ChunkResult::new("mock-device", self.id.clone(), &job.batch.batch_id, records);

        if job.fail_first_fetch {
            job.fail_first_fetch = false;
            return Ok(result.failed("ERROR_RUNNING_JOB"));
        }
        Ok(result)
    }

    fn work_batch(&self) -> WorkBatch {
        self.batch.clone()
    }

    async fn error_message(&self) -> Option<String> {
        None
    }
}

#[async_trait]
impl Backend for MockDevice {
    type Job = MockJob;

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> BackendResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn run(&self, batch: &WorkBatch, _options: &SubmitOptions) -> BackendResult<MockJob> {
        let n = {
            let mut next = self.next_id.lock().map_err(lock_err)?;
            *next += 1;
            *next
        };
        let id = JobId::new(format!("mock-{n}"));
        let record = JobRecord {
            batch: batch.clone(),
            polls_left: 2,
            cancelled: n % 3 == 0,
            fail_first_fetch: n % 5 == 0,
        };
        self.jobs.lock().map_err(lock_err)?.insert(id.0.clone(), record);

        Ok(MockJob {
            jobs: Arc::clone(&self.jobs),
            id,
            batch: batch.clone(),
        })
    }

    async fn retrieve_job(&self, job_id: &JobId) -> BackendResult<MockJob> {
        let jobs = self.jobs.lock().map_err(lock_err)?;
        let record = jobs
            .get(&job_id.0)
            .ok_or_else(|| BackendError::JobNotFound(job_id.0.clone()))?;
        Ok(MockJob {
            jobs: Arc::clone(&self.jobs),
            id: job_id.clone(),
            batch: record.batch.clone(),
        })
    }
}

fn report_progress(job_id: &JobId, status: &JobStatus, queue_position: u32, _job: &dyn JobHandle) {
    tracing::debug!(%job_id, %status, queue_position, "progress");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info", false);

    let device = MockDevice::new();
    let batch = WorkBatch::qasm(
        (0..10)
            .map(|i| Experiment::new(format!("bell-{i}")).with_instructions(serde_json::json!(["h 0", "cx 0 1"])))
            .collect(),
    )
    .with_config("shots", serde_json::json!(1024));

    let config = ExecutionConfig::default()
        .with_poll(PollConfig::every(Duration::from_millis(50)))
        .with_env_overrides()?;

    let result = execute(batch, &device, &config, Some(&report_progress)).await?;

    println!("Backend: {}", result.backend_name);
    println!("Records: {}", result.results.len());
    for record in &result.results {
        println!("  {}: {} shots", record.name, record.counts.total_shots());
    }

    Ok(())
}

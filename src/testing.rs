//! Scripted in-memory backend used by the unit tests.
//!
//! Every submission consumes the next [`JobScript`] (or a default script that
//! finishes immediately with a successful result). Status replies and result
//! outcomes are popped from the script; the last status sticks once the
//! script runs dry.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::backend::{Backend, BackendAvailability, JobHandle, JobObserver};
use crate::batch::{Experiment, WorkBatch};
use crate::capability::Capabilities;
use crate::config::{PollConfig, SubmitOptions};
use crate::error::{BackendError, BackendResult};
use crate::job::{JobId, JobStatus};
use crate::result::{ChunkResult, Counts, ExperimentResult};

/// Behaviour of one submitted job.
#[derive(Debug, Clone, Default)]
pub struct JobScript {
    statuses: VecDeque<BackendResult<JobStatus>>,
    results: VecDeque<BackendResult<bool>>,
    queue_position: Option<u32>,
    queue_position_fails: bool,
}

impl JobScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = BackendResult<JobStatus>>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    pub fn results(mut self, success: impl IntoIterator<Item = bool>) -> Self {
        self.results.extend(success.into_iter().map(Ok));
        self
    }

    /// Make the next result fetch fail with `error`.
    pub fn fail_result(mut self, error: BackendError) -> Self {
        self.results.push_back(Err(error));
        self
    }

    pub fn queue_position(mut self, position: u32) -> Self {
        self.queue_position = Some(position);
        self
    }

    pub fn queue_position_fails(mut self) -> Self {
        self.queue_position_fails = true;
        self
    }
}

#[derive(Debug)]
struct JobState {
    script: JobScript,
    last_status: JobStatus,
    status_calls: usize,
    result_calls: usize,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub batch_id: String,
    pub experiments: Vec<String>,
    pub expedited: bool,
    /// `None` when the id read-back was scripted to fail.
    pub job_id: Option<JobId>,
}

#[derive(Debug, Default)]
struct BackendState {
    next_id: u64,
    scripts: VecDeque<JobScript>,
    id_failures: usize,
    run_failures: usize,
    submissions: Vec<Submission>,
    jobs: HashMap<JobId, (WorkBatch, Arc<Mutex<JobState>>)>,
    retrievals: usize,
    retrieval_errors: VecDeque<BackendError>,
}

pub struct ScriptedBackend {
    capabilities: Capabilities,
    state: Mutex<BackendState>,
}

impl ScriptedBackend {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            state: Mutex::new(BackendState::default()),
        }
    }

    /// Queue the script for the next successful submission.
    pub fn script(self, script: JobScript) -> Self {
        self.state.lock().unwrap().scripts.push_back(script);
        self
    }

    /// Make the next `n` handles fail to report their id.
    pub fn fail_job_ids(self, n: usize) -> Self {
        self.state.lock().unwrap().id_failures = n;
        self
    }

    /// Make the next `n` calls to `run` fail outright.
    pub fn fail_runs(self, n: usize) -> Self {
        self.state.lock().unwrap().run_failures = n;
        self
    }

    /// Make the next lookups by id fail with `errors`, in order.
    pub fn fail_retrievals(self, errors: impl IntoIterator<Item = BackendError>) -> Self {
        self.state.lock().unwrap().retrieval_errors.extend(errors);
        self
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// Submissions that produced a readable job id.
    pub fn accepted(&self) -> Vec<Submission> {
        self.submissions()
            .into_iter()
            .filter(|s| s.job_id.is_some())
            .collect()
    }

    pub fn retrievals(&self) -> usize {
        self.state.lock().unwrap().retrievals
    }

    pub fn status_calls(&self, job_id: &JobId) -> usize {
        let job = Arc::clone(&self.state.lock().unwrap().jobs[job_id].1);
        let calls = job.lock().unwrap().status_calls;
        calls
    }

    pub fn result_calls(&self, job_id: &JobId) -> usize {
        let job = Arc::clone(&self.state.lock().unwrap().jobs[job_id].1);
        let calls = job.lock().unwrap().result_calls;
        calls
    }
}

pub struct ScriptedJob {
    backend_name: String,
    job_id: Option<JobId>,
    batch: WorkBatch,
    state: Arc<Mutex<JobState>>,
}

#[async_trait]
impl JobHandle for ScriptedJob {
    fn job_id(&self) -> BackendResult<JobId> {
        self.job_id
            .clone()
            .ok_or_else(|| BackendError::Job("job id not assigned yet".into()))
    }

    async fn status(&self) -> BackendResult<JobStatus> {
        let mut state = self.state.lock().unwrap();
        state.status_calls += 1;
        match state.script.statuses.pop_front() {
            Some(Ok(status)) => {
                state.last_status = status.clone();
                Ok(status)
            }
            Some(Err(err)) => Err(err),
            None => Ok(state.last_status.clone()),
        }
    }

    async fn queue_position(&self) -> BackendResult<Option<u32>> {
        let state = self.state.lock().unwrap();
        if state.script.queue_position_fails {
            return Err(BackendError::Unavailable("queue info offline".into()));
        }
        Ok(state.script.queue_position)
    }

    async fn result(&self, _poll: &PollConfig) -> BackendResult<ChunkResult> {
        let success = {
            let mut state = self.state.lock().unwrap();
            state.result_calls += 1;
            state.script.results.pop_front().unwrap_or(Ok(true))?
        };
        let job_id = self.job_id()?;
        let records = self
            .batch
            .experiments
            .iter()
            .map(|exp| {
                let mut record = ExperimentResult::new(&exp.name, Counts::from_pairs([("0", 1)]), 1);
                record.data = json!({ "job_id": job_id.0 });
                record
            })
            .collect();
        let result = ChunkResult::new(&self.backend_name, job_id, &self.batch.batch_id, records);
        Ok(if success { result } else { result.failed("ERROR") })
    }

    fn work_batch(&self) -> WorkBatch {
        self.batch.clone()
    }

    async fn error_message(&self) -> Option<String> {
        Some("scripted failure".into())
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    type Job = ScriptedJob;

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> BackendResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn run(&self, batch: &WorkBatch, options: &SubmitOptions) -> BackendResult<ScriptedJob> {
        let mut state = self.state.lock().unwrap();
        let experiments = batch.experiments.iter().map(|e| e.name.clone()).collect();

        if state.run_failures > 0 {
            state.run_failures -= 1;
            return Err(BackendError::Unavailable("submission rejected".into()));
        }

        if state.id_failures > 0 {
            state.id_failures -= 1;
            state.submissions.push(Submission {
                batch_id: batch.batch_id.clone(),
                experiments,
                expedited: options.expedited,
                job_id: None,
            });
            return Ok(ScriptedJob {
                backend_name: self.capabilities.name.clone(),
                job_id: None,
                batch: batch.clone(),
                state: Arc::new(Mutex::new(JobState {
                    script: JobScript::new(),
                    last_status: JobStatus::Error,
                    status_calls: 0,
                    result_calls: 0,
                })),
            });
        }

        state.next_id += 1;
        let job_id = JobId::new(format!("job-{}", state.next_id));
        let script = state.scripts.pop_front().unwrap_or_default();
        let job_state = Arc::new(Mutex::new(JobState {
            script,
            last_status: JobStatus::Done,
            status_calls: 0,
            result_calls: 0,
        }));
        state
            .jobs
            .insert(job_id.clone(), (batch.clone(), Arc::clone(&job_state)));
        state.submissions.push(Submission {
            batch_id: batch.batch_id.clone(),
            experiments,
            expedited: options.expedited,
            job_id: Some(job_id.clone()),
        });

        Ok(ScriptedJob {
            backend_name: self.capabilities.name.clone(),
            job_id: Some(job_id),
            batch: batch.clone(),
            state: job_state,
        })
    }

    async fn retrieve_job(&self, job_id: &JobId) -> BackendResult<ScriptedJob> {
        let mut state = self.state.lock().unwrap();
        state.retrievals += 1;
        if let Some(err) = state.retrieval_errors.pop_front() {
            return Err(err);
        }
        let (batch, job_state) = state
            .jobs
            .get(job_id)
            .cloned()
            .ok_or_else(|| BackendError::JobNotFound(job_id.0.clone()))?;
        Ok(ScriptedJob {
            backend_name: self.capabilities.name.clone(),
            job_id: Some(job_id.clone()),
            batch,
            state: job_state,
        })
    }
}

/// Observer recording every callback.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(JobId, JobStatus, u32)>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<(JobId, JobStatus, u32)> {
        self.events.lock().unwrap().clone()
    }
}

impl JobObserver for RecordingObserver {
    fn on_status(&self, job_id: &JobId, status: &JobStatus, queue_position: u32, _job: &dyn JobHandle) {
        self.events
            .lock()
            .unwrap()
            .push((job_id.clone(), status.clone(), queue_position));
    }
}

/// A qasm batch of `n` experiments named `exp-0`, `exp-1`, ...
pub fn numbered_batch(n: usize) -> WorkBatch {
    WorkBatch::qasm((0..n).map(|i| Experiment::new(format!("exp-{i}"))).collect())
}

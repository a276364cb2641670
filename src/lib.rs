//! HAL Runner — resilient batch execution on unreliable quantum backends
//!
//! Backends lose submissions, fail status queries, cancel jobs and sometimes
//! report `DONE` without a usable result. This crate hides all of that behind
//! a single call: hand [`execute`] a [`WorkBatch`] of any size and get back
//! one [`ChunkResult`] whose records line up with the batch's experiments.
//!
//! # Overview
//!
//! - [`split_batch`] cuts an oversized batch into backend-sized chunks
//! - [`submit`] retries a submission until a job id comes back
//! - [`probe_status`] tolerates the backend's expected job errors
//! - [`Recovery`] re-submits dead jobs and re-fetches failed results
//! - [`combine`] merges chunk results in chunk order
//! - [`execute`] wires it all together
//!
//! Backends plug in through the [`Backend`] and [`JobHandle`] traits.
//!
//! # Example
//!
//! ```ignore
//! use hal_runner::{execute, ExecutionConfig, PollConfig, WorkBatch};
//! use std::time::Duration;
//!
//! let config = ExecutionConfig::default()
//!     .with_poll(PollConfig::every(Duration::from_secs(10)))
//!     .with_env_overrides()?;
//! let result = execute(batch, &backend, &config, None).await?;
//! for record in &result.results {
//!     println!("{}: {} shots", record.name, record.counts.total_shots());
//! }
//! ```
//!
//! # Lifecycle
//!
//! ```text
//!   split_batch() ──→ submit() × N ──→ Recovery::run() × N ──→ combine()
//!                                  └─→ result() × N  (simulators)
//! ```

pub mod backend;
pub mod batch;
pub mod capability;
pub mod chunker;
pub mod combine;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod orchestrator;
pub mod probe;
pub mod recovery;
pub mod result;
pub mod submit;

#[cfg(test)]
mod testing;

pub use backend::{Backend, BackendAvailability, JobHandle, JobObserver};
pub use batch::{BatchKind, Experiment, WorkBatch};
pub use capability::Capabilities;
pub use chunker::split_batch;
pub use combine::combine;
pub use config::{ExecutionConfig, PollConfig, SubmitOptions};
pub use error::{BackendError, BackendResult, RunnerError, RunnerResult};
pub use job::{JobId, JobStatus, SubmittedJob};
pub use orchestrator::{execute, resolve_chunk_size};
pub use probe::{STATUS_RETRY_DELAY, probe_status};
pub use recovery::Recovery;
pub use result::{ChunkResult, Counts, ExperimentResult};
pub use submit::submit;

//! Execution configuration.
//!
//! ```toml
//! max_experiments_per_job = 100
//! expedited = false
//!
//! [poll]
//! wait_ms = 5000
//! timeout_ms = 600000
//!
//! [backend_options]
//! max_parallel_threads = 4
//!
//! [noise_config]
//! noise_model = "depolarizing"
//! ```
//!
//! Every field is optional. The chunk-size override may also come from the
//! `HAL_RUNNER_MAX_EXPERIMENTS_PER_JOB` environment variable, read once by
//! [`ExecutionConfig::with_env_overrides`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RunnerError, RunnerResult};

/// Environment variable overriding the maximum experiments per job.
pub const MAX_EXPERIMENTS_ENV: &str = "HAL_RUNNER_MAX_EXPERIMENTS_PER_JOB";

/// Job polling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay between two status polls, in milliseconds.
    pub wait_ms: u64,
    /// Upper bound a backend may apply to a blocking result fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl PollConfig {
    /// Poll every `wait`.
    pub fn every(wait: Duration) -> Self {
        Self {
            wait_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            timeout_ms: None,
        }
    }

    /// Delay between two status polls.
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    /// Result fetch timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            wait_ms: 5_000,
            timeout_ms: None,
        }
    }
}

/// Pass-through configuration handed to [`Backend::run`](crate::Backend::run).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitOptions {
    /// Backend-specific run options.
    pub backend_options: Map<String, Value>,
    /// Noise / simulation configuration.
    pub noise_config: Map<String, Value>,
    /// Skip backend-side payload validation.
    pub expedited: bool,
}

/// Everything the orchestrator needs besides the batch and the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Status polling and result fetch settings.
    pub poll: PollConfig,
    /// Explicit chunk size, taking precedence over the backend's limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_experiments_per_job: Option<usize>,
    /// Backend-specific run options.
    pub backend_options: Map<String, Value>,
    /// Noise / simulation configuration.
    pub noise_config: Map<String, Value>,
    /// Request the expedited submission path when the backend offers it.
    pub expedited: bool,
}

impl ExecutionConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> RunnerResult<Self> {
        let cfg: Self = toml::from_str(raw)
            .map_err(|e| RunnerError::Configuration(format!("parsing TOML: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply [`MAX_EXPERIMENTS_ENV`] if it is set.
    pub fn with_env_overrides(self) -> RunnerResult<Self> {
        self.with_max_experiments_override(std::env::var(MAX_EXPERIMENTS_ENV).ok().as_deref())
    }

    fn with_max_experiments_override(mut self, raw: Option<&str>) -> RunnerResult<Self> {
        if let Some(raw) = raw {
            let value = raw.trim().parse::<usize>().map_err(|e| {
                RunnerError::Configuration(format!("{MAX_EXPERIMENTS_ENV}={raw:?}: {e}"))
            })?;
            self.max_experiments_per_job = Some(value);
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the poll interval.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Set an explicit chunk size.
    pub fn with_max_experiments_per_job(mut self, max: usize) -> Self {
        self.max_experiments_per_job = Some(max);
        self
    }

    /// Request the expedited submission path.
    pub fn with_expedited(mut self, expedited: bool) -> Self {
        self.expedited = expedited;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> RunnerResult<()> {
        if self.max_experiments_per_job == Some(0) {
            return Err(RunnerError::Configuration(
                "max_experiments_per_job must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Options handed to the backend on every submission.
    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            backend_options: self.backend_options.clone(),
            noise_config: self.noise_config.clone(),
            expedited: self.expedited,
        }
    }
}

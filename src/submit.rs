//! Guarded submission: keep submitting until the backend hands back a job id.

use std::borrow::Cow;

use tracing::{info, warn};

use crate::backend::{Backend, JobHandle};
use crate::batch::WorkBatch;
use crate::config::SubmitOptions;
use crate::job::JobId;

/// Downgrade an expedited request for backends without the fast path.
pub fn effective_options<'a, B: Backend>(backend: &B, options: &'a SubmitOptions) -> Cow<'a, SubmitOptions> {
    if options.expedited && !backend.capabilities().expedited_submission {
        info!(
            backend = backend.name(),
            "Can't skip payload validation for this backend, submitting with full validation"
        );
        return Cow::Owned(SubmitOptions {
            expedited: false,
            ..options.clone()
        });
    }
    Cow::Borrowed(options)
}

/// Submit `batch` and return its handle together with the job id.
///
/// Never gives up: without a job id the caller cannot make progress, so any
/// failure to submit or to read the id back is logged and the batch is
/// submitted again straight away. Every retry goes out under a fresh batch
/// id.
pub async fn submit<B: Backend>(backend: &B, batch: &WorkBatch, options: &SubmitOptions) -> (B::Job, JobId) {
    let options = effective_options(backend, options);
    let mut batch = Cow::Borrowed(batch);
    loop {
        match backend.run(&batch, &options).await {
            Ok(job) => match job.job_id() {
                Ok(job_id) => return (job, job_id),
                Err(error) => warn!(
                    batch_id = %batch.batch_id,
                    %error,
                    "FAILURE: can not get job id, resubmitting the batch"
                ),
            },
            Err(error) => warn!(
                batch_id = %batch.batch_id,
                %error,
                "FAILURE: submission rejected, resubmitting the batch"
            ),
        }
        batch = Cow::Owned(batch.into_owned().with_fresh_id());
        // Not a backoff: lets sibling chunks progress on a shared task.
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use crate::testing::{ScriptedBackend, numbered_batch};

    #[tokio::test]
    async fn test_submit_first_try() {
        let backend = ScriptedBackend::new(Capabilities::device("fake", 10));
        let batch = numbered_batch(2);

        let (job, job_id) = submit(&backend, &batch, &SubmitOptions::default()).await;

        assert_eq!(job_id, JobId::new("job-1"));
        assert_eq!(job.job_id().unwrap(), job_id);
        assert_eq!(backend.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_retries_until_id_readable() {
        let backend = ScriptedBackend::new(Capabilities::device("fake", 10))
            .fail_runs(2)
            .fail_job_ids(3);
        let batch = numbered_batch(2);

        let (_job, job_id) = submit(&backend, &batch, &SubmitOptions::default()).await;

        assert_eq!(job_id, JobId::new("job-1"));
        let submissions = backend.submissions();
        assert_eq!(submissions.len(), 4);
        assert!(submissions[..3].iter().all(|s| s.job_id.is_none()));
        assert!(submissions.iter().all(|s| s.batch_id != batch.batch_id));
        assert!(submissions.iter().all(|s| s.experiments == ["exp-0", "exp-1"]));
    }

    #[tokio::test]
    async fn test_submit_retry_uses_new_batch_id() {
        let backend = ScriptedBackend::new(Capabilities::device("fake", 10)).fail_job_ids(2);
        let batch = numbered_batch(1);

        submit(&backend, &batch, &SubmitOptions::default()).await;

        let ids: Vec<String> = backend.submissions().into_iter().map(|s| s.batch_id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], batch.batch_id);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_ne!(ids[0], ids[2]);
    }

    #[tokio::test]
    async fn test_expedited_only_when_supported() {
        let options = SubmitOptions {
            expedited: true,
            ..SubmitOptions::default()
        };

        let plain = ScriptedBackend::new(Capabilities::device("fake", 10));
        submit(&plain, &numbered_batch(1), &options).await;
        assert!(!plain.submissions()[0].expedited);

        let fast = ScriptedBackend::new(
            Capabilities::local_simulator("aer").with_expedited_submission(),
        );
        submit(&fast, &numbered_batch(1), &options).await;
        assert!(fast.submissions()[0].expedited);
    }

    #[test]
    fn test_effective_options_borrows_when_unchanged() {
        let backend = ScriptedBackend::new(Capabilities::device("fake", 10));
        let options = SubmitOptions::default();
        assert!(matches!(effective_options(&backend, &options), Cow::Borrowed(_)));
    }
}

//! Splitting a batch into backend-sized chunks.

use crate::batch::{BatchKind, WorkBatch};
use crate::error::{RunnerError, RunnerResult};

/// Split `batch` into `ceil(len / max_experiments)` chunks of at most
/// `max_experiments` experiments each, in order.
///
/// A batch that already fits (including an empty one) is returned as the
/// single chunk, untouched. Only [`BatchKind::Qasm`] batches can be sliced.
pub fn split_batch(batch: WorkBatch, max_experiments: usize) -> RunnerResult<Vec<WorkBatch>> {
    if max_experiments == 0 {
        return Err(RunnerError::Configuration(
            "chunk size must be at least 1".into(),
        ));
    }

    if batch.len() <= max_experiments {
        return Ok(vec![batch]);
    }

    if batch.kind != BatchKind::Qasm {
        return Err(RunnerError::InvalidBatchKind(batch.kind));
    }

    let num_chunks = batch.len().div_ceil(max_experiments);
    let mut template = batch;
    let mut experiments = std::mem::take(&mut template.experiments).into_iter();

    let chunks = (0..num_chunks)
        .map(|_| template.derive(experiments.by_ref().take(max_experiments).collect()))
        .collect();

    Ok(chunks)
}

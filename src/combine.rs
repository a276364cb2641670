//! Merging per-chunk results back into one.

use crate::error::{RunnerError, RunnerResult};
use crate::result::ChunkResult;

/// Concatenate the experiment records of `results`, in order, onto the first
/// result. A single result is returned as is.
pub fn combine(results: Vec<ChunkResult>) -> RunnerResult<ChunkResult> {
    let mut results = results.into_iter();
    let Some(mut combined) = results.next() else {
        return Err(RunnerError::InvalidState(
            "no chunk results to combine".into(),
        ));
    };
    for result in results {
        combined.results.extend(result.results);
    }
    Ok(combined)
}

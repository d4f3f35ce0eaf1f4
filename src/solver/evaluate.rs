//! Distributed accuracy evaluation
//!
//! Scores a weight vector against a held-out partition. Pure with respect
//! to the weights and the partition; the only cross-worker traffic is one
//! sum-reduction of (errors, total) tallies.

use crate::comm::Allreduce;
use crate::core::{Result, SvmError};
use crate::data::Partition;

/// Count this partition's misclassifications under `w`.
///
/// A non-positive value of `y * (w . x)` counts as an error.
pub fn local_errors(w: &[f64], partition: &Partition) -> usize {
    partition
        .samples
        .iter()
        .filter(|s| s.label * s.features.dot_dense(w) <= 0.0)
        .count()
}

/// Evaluate accuracy over all workers' partitions.
///
/// Every worker calls this with its own partition; the combined accuracy
/// `1 - errors / total` is returned to each of them.
pub fn evaluate(
    w: &[f64],
    partition: &Partition,
    counts: &Allreduce<(usize, usize)>,
) -> Result<f64> {
    let local = (local_errors(w, partition), partition.len());
    let (errors, total) = counts.reduce(local)?;
    if total == 0 {
        return Err(SvmError::EmptyDataset);
    }
    Ok(1.0 - errors as f64 / total as f64)
}

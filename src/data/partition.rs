//! Worker partitions of a globally indexed dataset
//!
//! A training job splits its dataset into one contiguous, order-preserving
//! slice per worker. Each sample gets a constant `1` feature appended so the
//! learned bias folds into the weight vector. A partition's place in the
//! conceptual global index space `[0, N)` is established at run time through
//! a sum-reduction of per-worker sample counts.

use crate::comm::Allreduce;
use crate::core::{Dataset, Result, Sample, SvmError};

/// One worker's slice of the dataset, bias feature already appended
#[derive(Debug, Clone)]
pub struct Partition {
    /// Local samples, in dataset order
    pub samples: Vec<Sample>,
    /// Feature dimension including the appended bias feature
    pub dim: usize,
}

/// A partition's range within the global index space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalRange {
    /// First global index owned by this worker
    pub idx_low: usize,
    /// One past the last global index owned by this worker
    pub idx_high: usize,
    /// Total number of samples across all workers
    pub total: usize,
}

impl Partition {
    /// Split a dataset into `workers` contiguous partitions.
    ///
    /// `raw_dim` is the feature dimension before the bias append; the
    /// resulting partitions have dimension `raw_dim + 1` with the constant
    /// bias feature at index `raw_dim`. Passing a `raw_dim` larger than the
    /// dataset's own is how train and test sets are brought to a common
    /// dimension.
    pub fn split<D: Dataset + ?Sized>(dataset: &D, workers: usize, raw_dim: usize) -> Vec<Partition> {
        assert!(workers > 0, "Need at least one worker");
        assert!(raw_dim >= dataset.dim(), "raw_dim must cover the dataset");

        let len = dataset.len();
        let base = len / workers;
        let remainder = len % workers;

        let mut partitions = Vec::with_capacity(workers);
        let mut next = 0;
        for tid in 0..workers {
            let size = base + usize::from(tid < remainder);
            let mut samples = Vec::with_capacity(size);
            for i in next..next + size {
                let mut sample = dataset.get_sample(i);
                sample.features.append(raw_dim, 1.0);
                samples.push(sample);
            }
            next += size;
            partitions.push(Partition {
                samples,
                dim: raw_dim + 1,
            });
        }
        partitions
    }

    /// Number of local samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the partition holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Establish this partition's global index range.
    ///
    /// Every worker contributes its local count at its own slot; the summed
    /// vector is prefix-summed over ascending worker ids, which yields a
    /// disjoint, order-preserving cover of `[0, N)`.
    pub fn global_range(
        &self,
        tid: usize,
        workers: usize,
        counts: &Allreduce<Vec<usize>>,
    ) -> Result<GlobalRange> {
        if tid >= workers {
            return Err(SvmError::InvalidParameter(format!(
                "worker id {tid} out of range for {workers} workers"
            )));
        }
        let mut contribution = vec![0; workers];
        contribution[tid] = self.len();
        let counts = counts.reduce(contribution)?;

        let idx_low: usize = counts[..tid].iter().sum();
        let idx_high = idx_low + counts[tid];
        let total = idx_low + counts[tid..].iter().sum::<usize>();

        Ok(GlobalRange {
            idx_low,
            idx_high,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use std::sync::Arc;
    use std::thread;

    struct FakeDataset {
        samples: Vec<Sample>,
        dim: usize,
    }

    impl Dataset for FakeDataset {
        fn len(&self) -> usize {
            self.samples.len()
        }
        fn dim(&self) -> usize {
            self.dim
        }
        fn get_sample(&self, i: usize) -> Sample {
            self.samples[i].clone()
        }
    }

    fn dataset(n: usize) -> FakeDataset {
        let samples = (0..n)
            .map(|i| {
                Sample::new(
                    SparseVector::new(vec![0], vec![i as f64 + 1.0]),
                    if i % 2 == 0 { 1.0 } else { -1.0 },
                )
            })
            .collect();
        FakeDataset { samples, dim: 2 }
    }

    #[test]
    fn test_split_sizes_and_order() {
        let data = dataset(10);
        let parts = Partition::split(&data, 3, data.dim());

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 3);
        assert_eq!(parts[2].len(), 3);

        // Order preserved: first sample of partition 1 is global sample 4
        assert_eq!(parts[1].samples[0].features.get(0), 5.0);
    }

    #[test]
    fn test_split_appends_bias() {
        let data = dataset(4);
        let parts = Partition::split(&data, 2, data.dim());

        for part in &parts {
            assert_eq!(part.dim, 3);
            for sample in &part.samples {
                assert_eq!(sample.features.get(2), 1.0);
            }
        }
    }

    #[test]
    fn test_split_more_workers_than_samples() {
        let data = dataset(2);
        let parts = Partition::split(&data, 4, data.dim());
        assert_eq!(parts.iter().map(Partition::len).sum::<usize>(), 2);
        assert!(parts[2].is_empty());
        assert!(parts[3].is_empty());
    }

    #[test]
    fn test_global_range() {
        let data = dataset(10);
        let parts = Partition::split(&data, 3, data.dim());
        let counts = Arc::new(Allreduce::sum_counts(3));

        let mut handles = Vec::new();
        for (tid, part) in parts.into_iter().enumerate() {
            let counts = Arc::clone(&counts);
            handles.push(thread::spawn(move || {
                part.global_range(tid, 3, &counts).unwrap()
            }));
        }

        let ranges: Vec<GlobalRange> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(ranges[0], GlobalRange { idx_low: 0, idx_high: 4, total: 10 });
        assert_eq!(ranges[1], GlobalRange { idx_low: 4, idx_high: 7, total: 10 });
        assert_eq!(ranges[2], GlobalRange { idx_low: 7, idx_high: 10, total: 10 });
    }

    #[test]
    fn test_global_range_rejects_bad_tid() {
        let data = dataset(2);
        let parts = Partition::split(&data, 1, data.dim());
        let counts = Allreduce::sum_counts(1);
        assert!(parts[0].global_range(5, 1, &counts).is_err());
    }
}

//! Distributed box-constrained dual coordinate-descent solver
//!
//! Implements the data-parallel L2-loss linear SVM training method of
//! Lee et al. (2015): every worker runs local dual coordinate-descent
//! sweeps over its own partition, the local increments are combined
//! through synchronized reductions, and a trust-region step applies the
//! combined direction to the globally shared weight vector.

pub mod coordinate_descent;
pub mod evaluate;
pub mod trust_region;

pub use self::coordinate_descent::*;
pub use self::evaluate::*;
pub use self::trust_region::*;

use crate::comm::ReduceChannels;
use crate::core::{Result, Solution, SolverConfig, StopReason, SvmError};
use crate::data::Partition;
use log::{debug, info};
use std::time::Instant;

/// Outcome of one distributed training job
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// The reporting worker's solution (weights are identical on every
    /// worker at termination)
    pub solution: Solution,
    /// Test accuracy, when a held-out set was supplied
    pub accuracy: Option<f64>,
}

/// Driver that runs one worker thread per partition in lock-step
pub struct DistributedSolver {
    config: SolverConfig,
}

impl DistributedSolver {
    /// Create a solver driver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Get the solver configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Train on the given partitions, optionally evaluating on held-out
    /// partitions afterwards.
    ///
    /// `train` must hold exactly one partition per configured worker, all of
    /// the same dimension; `test`, when given, likewise. Workers run on OS
    /// threads and meet at the reduction barriers; there is no timeout — a
    /// worker that dies mid-job poisons the barriers and the job fails with
    /// a `Synchronization` error.
    pub fn solve(
        &self,
        train: Vec<Partition>,
        test: Option<Vec<Partition>>,
    ) -> Result<TrainOutcome> {
        let workers = self.config.workers;
        self.validate(&train, test.as_deref())?;

        let channels = ReduceChannels::new(workers);
        let mut tests: Vec<Option<Partition>> = match test {
            Some(parts) => parts.into_iter().map(Some).collect(),
            None => (0..workers).map(|_| None).collect(),
        };

        let mut outcomes: Vec<Option<Result<TrainOutcome>>> = (0..workers).map(|_| None).collect();

        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for (tid, partition) in train.into_iter().enumerate() {
                let test_partition = tests[tid].take();
                let channels = &channels;
                let config = &self.config;
                handles.push(scope.spawn(move || {
                    run_worker(tid, partition, test_partition, channels, config)
                }));
            }
            for (tid, handle) in handles.into_iter().enumerate() {
                outcomes[tid] = Some(handle.join().unwrap_or_else(|_| {
                    Err(SvmError::Synchronization(format!(
                        "worker {tid} panicked during training"
                    )))
                }));
            }
        });

        let mut reporter_outcome = None;
        for (tid, outcome) in outcomes.into_iter().enumerate() {
            let outcome = outcome.ok_or_else(|| {
                SvmError::Synchronization(format!("worker {tid} produced no result"))
            })??;
            if tid == self.config.reporter {
                reporter_outcome = Some(outcome);
            }
        }
        reporter_outcome.ok_or_else(|| {
            SvmError::InvalidParameter("reporter worker produced no result".to_string())
        })
    }

    fn validate(&self, train: &[Partition], test: Option<&[Partition]>) -> Result<()> {
        let workers = self.config.workers;
        if workers == 0 {
            return Err(SvmError::InvalidParameter(
                "worker count must be positive".to_string(),
            ));
        }
        if self.config.reporter >= workers {
            return Err(SvmError::InvalidParameter(format!(
                "reporter {} out of range for {} workers",
                self.config.reporter, workers
            )));
        }
        if self.config.c <= 0.0 || !self.config.c.is_finite() {
            return Err(SvmError::InvalidParameter(format!(
                "C must be positive and finite, got {}",
                self.config.c
            )));
        }
        if train.len() != workers {
            return Err(SvmError::InvalidParameter(format!(
                "expected {} training partitions, got {}",
                workers,
                train.len()
            )));
        }
        if train.iter().any(|p| p.dim != train[0].dim) {
            return Err(SvmError::InvalidParameter(
                "training partitions disagree on dimension".to_string(),
            ));
        }
        if let Some(test) = test {
            if test.len() != workers {
                return Err(SvmError::InvalidParameter(format!(
                    "expected {} test partitions, got {}",
                    workers,
                    test.len()
                )));
            }
        }
        Ok(())
    }
}

/// One worker's end-to-end training loop
fn run_worker(
    tid: usize,
    partition: Partition,
    test: Option<Partition>,
    channels: &ReduceChannels,
    config: &SolverConfig,
) -> Result<TrainOutcome> {
    let started = Instant::now();
    let reporter = tid == config.reporter;

    let range = partition.global_range(tid, config.workers, &channels.sample_counts)?;
    debug!(
        "worker {tid} owns global samples [{}, {})",
        range.idx_low, range.idx_high
    );
    if reporter {
        info!(
            "training on {} samples, {} features, {} workers",
            range.total, partition.dim, config.workers
        );
    }

    let n = partition.dim;
    let l = partition.len();
    let diag = 0.5 / config.c;

    let mut w = vec![0.0; n];
    let mut alpha = vec![0.0; l];
    let mut alpha_inc = vec![0.0; l];

    let mut local = LocalSolver::new(
        &partition.samples,
        config.c,
        config.max_inn_iter,
        config.seed.wrapping_add(tid as u64),
    );
    let mut tracker = ObjectiveTracker::new(n, config.c, range.total);

    let mut trace = Vec::new();
    let mut gap = f64::INFINITY;
    let mut stop = StopReason::IterationBudget;
    let mut iterations = 0;

    for iter in 0..config.max_iter {
        let w_orig = w.clone();
        let alpha_orig = alpha.clone();

        // Warm-started local sweeps; w drifts into w_orig + local increment
        local.run(&mut alpha, &mut w);

        let stats = local_increment(&alpha, &alpha_orig, &mut alpha_inc, diag);

        // One transient n+3 aggregate per iteration: the weight increment
        // followed by the three dual-increment invariants.
        let mut payload = Vec::with_capacity(n + 3);
        payload.extend(w.iter().zip(w_orig.iter()).map(|(a, b)| a - b));
        payload.push(stats.sum_alpha_inc);
        payload.push(stats.alpha_inc_square);
        payload.push(stats.alpha_inc_dot_alpha);
        let combined = channels.increment.reduce(payload)?;
        let max_step = channels.step_ceiling.reduce(stats.max_step)?;

        let (w_inc, scalars) = combined.split_at(n);
        let sum_alpha_inc = scalars[0];
        let alpha_inc_square = scalars[1];
        let alpha_inc_dot_alpha = scalars[2];

        // Curvature terms of this step only; computed fresh every iteration
        let w_inc_square = dot(w_inc, w_inc);
        let w_dot_w_inc = dot(&w_orig, w_inc);

        let grad_alpha_inc = w_dot_w_inc + alpha_inc_dot_alpha - sum_alpha_inc;
        let curvature = alpha_inc_square + w_inc_square;

        let Some(eta) = feasible_step(grad_alpha_inc, curvature, max_step) else {
            // Every worker sees the same reduced values, so all of them
            // take this branch together.
            stop = StopReason::NonDescent;
            break;
        };

        for i in 0..l {
            alpha[i] = alpha_orig[i] + eta * alpha_inc[i];
        }
        for j in 0..n {
            w[j] = w_orig[j] + eta * w_inc[j];
        }

        tracker.record_step(eta, curvature, grad_alpha_inc);

        let local_loss: f64 = partition
            .samples
            .iter()
            .map(|s| {
                let margin = 1.0 - s.label * s.features.dot_dense(&w);
                if margin > 0.0 {
                    config.c * margin * margin
                } else {
                    0.0
                }
            })
            .sum();
        let hinge_loss = channels.hinge_loss.reduce(local_loss)?;

        let iter_stats = tracker.observe(&w, hinge_loss);
        gap = iter_stats.gap;
        trace.push(iter_stats);
        iterations = iter + 1;

        if reporter {
            info!(
                "iteration {}: primal {:.6e} dual {:.6e} gap {:.6e}",
                iterations, iter_stats.primal, iter_stats.dual, iter_stats.gap
            );
        }

        if gap < config.gap_tolerance {
            stop = StopReason::GapConverged;
            break;
        }
    }

    // Every terminal state hands back the best snapshot
    w.copy_from_slice(&tracker.best_w);

    let accuracy = match &test {
        Some(test) => Some(evaluate(&w, test, &channels.eval_counts)?),
        None => None,
    };

    if reporter {
        info!(
            "stopped after {} iterations ({}), duality gap {:.6e}, elapsed {:.3}s",
            iterations,
            stop,
            gap,
            started.elapsed().as_secs_f64()
        );
        if let Some(accuracy) = accuracy {
            info!("test accuracy: {accuracy:.4}");
        }
    }

    Ok(TrainOutcome {
        solution: Solution {
            w,
            alpha,
            duality_gap: gap,
            stop,
            iterations,
            trace,
        },
        accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Sample, SparseVector};

    fn separable_partitions(workers: usize) -> Vec<Partition> {
        let points: [(f64, f64, f64); 4] = [
            (2.0, 1.0, 1.0),
            (1.5, 0.8, 1.0),
            (-2.0, -1.0, -1.0),
            (-1.5, -0.8, -1.0),
        ];
        let samples: Vec<Sample> = points
            .iter()
            .map(|&(x1, x2, y)| {
                let mut features = SparseVector::new(vec![0, 1], vec![x1, x2]);
                features.append(2, 1.0);
                Sample::new(features, y)
            })
            .collect();

        // Contiguous split, matching Partition::split
        let base = samples.len() / workers;
        let rem = samples.len() % workers;
        let mut parts = Vec::new();
        let mut next = 0;
        for tid in 0..workers {
            let size = base + usize::from(tid < rem);
            parts.push(Partition {
                samples: samples[next..next + size].to_vec(),
                dim: 3,
            });
            next += size;
        }
        parts
    }

    fn config(workers: usize, max_iter: usize) -> SolverConfig {
        SolverConfig {
            workers,
            max_iter,
            max_inn_iter: 5,
            seed: 42,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_single_worker_converges() {
        let solver = DistributedSolver::new(config(1, 50));
        let outcome = solver.solve(separable_partitions(1), None).unwrap();

        let solution = outcome.solution;
        assert_eq!(solution.stop, StopReason::GapConverged);
        assert!(solution.duality_gap < 1e-6);
        assert!(solution.alpha.iter().all(|&a| a >= 0.0));
    }

    #[test]
    fn test_zero_iteration_budget_returns_zero_model() {
        let solver = DistributedSolver::new(config(1, 0));
        let outcome = solver.solve(separable_partitions(1), None).unwrap();

        let solution = outcome.solution;
        assert_eq!(solution.stop, StopReason::IterationBudget);
        assert_eq!(solution.iterations, 0);
        assert!(solution.w.iter().all(|&v| v == 0.0));
        assert!(solution.alpha.iter().all(|&a| a == 0.0));
        assert!(solution.duality_gap.is_infinite());
    }

    #[test]
    fn test_best_primal_non_increasing() {
        let solver = DistributedSolver::new(config(1, 30));
        let outcome = solver.solve(separable_partitions(1), None).unwrap();

        let mut best = f64::INFINITY;
        for stats in &outcome.solution.trace {
            let running_best = best.min(stats.primal);
            assert!(running_best <= best);
            best = running_best;
        }
        assert!(best.is_finite());
    }

    #[test]
    fn test_multi_worker_agrees_with_single_worker() {
        let single = DistributedSolver::new(config(1, 100))
            .solve(separable_partitions(1), None)
            .unwrap();
        let multi = DistributedSolver::new(config(4, 100))
            .solve(separable_partitions(4), None)
            .unwrap();

        // Both converge to the unique optimum of the same strongly convex
        // problem; trajectories differ, the optimum does not.
        assert!(single.solution.duality_gap < 1e-6);
        assert!(multi.solution.duality_gap < 1e-6);
        for (a, b) in single.solution.w.iter().zip(multi.solution.w.iter()) {
            assert!((a - b).abs() < 1e-2, "weights diverged: {a} vs {b}");
        }
    }

    #[test]
    fn test_partition_count_mismatch_rejected() {
        let solver = DistributedSolver::new(config(2, 10));
        let result = solver.solve(separable_partitions(1), None);
        assert!(matches!(result, Err(SvmError::InvalidParameter(_))));
    }

    #[test]
    fn test_invalid_c_rejected() {
        let mut cfg = config(1, 10);
        cfg.c = 0.0;
        let solver = DistributedSolver::new(cfg);
        let result = solver.solve(separable_partitions(1), None);
        assert!(matches!(result, Err(SvmError::InvalidParameter(_))));
    }

    #[test]
    fn test_evaluation_accuracy_on_train_set() {
        let solver = DistributedSolver::new(config(1, 50));
        let outcome = solver
            .solve(separable_partitions(1), Some(separable_partitions(1)))
            .unwrap();
        assert_eq!(outcome.accuracy, Some(1.0));
    }
}

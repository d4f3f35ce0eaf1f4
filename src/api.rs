//! High-level API for distributed SVM training
//!
//! This module provides a user-friendly interface over the distributed
//! solver: a builder for configuring a training run and a trained-model
//! type for prediction and evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dsvm::api::SvmTrainer;
//! use dsvm::LibSvmDataset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let train = LibSvmDataset::from_file("train.libsvm")?;
//! let test = LibSvmDataset::from_file("test.libsvm")?;
//!
//! let (model, accuracy) = SvmTrainer::new()
//!     .with_c(1.0)
//!     .with_workers(4)
//!     .train_evaluate(&train, &test)?;
//!
//! println!("Accuracy: {:.2}%", accuracy * 100.0);
//! println!("Duality gap: {:.3e}", model.duality_gap());
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, IterationStats, Prediction, Result, Sample, Solution, SolverConfig, StopReason,
};
use crate::data::Partition;
use crate::solver::DistributedSolver;
use std::path::Path;

/// Builder for distributed training runs
#[derive(Debug, Clone, Default)]
pub struct SvmTrainer {
    config: SolverConfig,
}

impl SvmTrainer {
    /// Create a trainer with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set the outer iteration budget
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter;
        self
    }

    /// Set the inner sweep count per outer iteration
    pub fn with_max_inner_iter(mut self, max_inn_iter: usize) -> Self {
        self.config.max_inn_iter = max_inn_iter;
        self
    }

    /// Set the duality-gap stopping tolerance
    pub fn with_gap_tolerance(mut self, tolerance: f64) -> Self {
        self.config.gap_tolerance = tolerance;
        self
    }

    /// Set the number of data-parallel workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Fix the base seed of the per-worker sweep shuffles
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Pick which worker emits progress log lines
    pub fn with_reporter(mut self, reporter: usize) -> Self {
        self.config.reporter = reporter;
        self
    }

    /// Train on a dataset
    pub fn train<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<TrainedModel> {
        let partitions = Partition::split(dataset, self.config.workers, dataset.dim());
        let outcome = DistributedSolver::new(self.config.clone()).solve(partitions, None)?;
        Ok(TrainedModel::new(outcome.solution, self.config.clone()))
    }

    /// Train and evaluate against a held-out dataset.
    ///
    /// Train and test are brought to a common feature dimension before the
    /// bias append, the way the original data loader sizes its feature
    /// space over both files.
    pub fn train_evaluate<D, E>(&self, train: &D, test: &E) -> Result<(TrainedModel, f64)>
    where
        D: Dataset + ?Sized,
        E: Dataset + ?Sized,
    {
        let raw_dim = train.dim().max(test.dim());
        let train_parts = Partition::split(train, self.config.workers, raw_dim);
        let test_parts = Partition::split(test, self.config.workers, raw_dim);

        let outcome =
            DistributedSolver::new(self.config.clone()).solve(train_parts, Some(test_parts))?;
        let accuracy = outcome.accuracy.unwrap_or(0.0);
        Ok((TrainedModel::new(outcome.solution, self.config.clone()), accuracy))
    }

    /// Train from a LibSVM format file
    pub fn train_from_file<P: AsRef<Path>>(&self, path: P) -> Result<TrainedModel> {
        let dataset = crate::data::LibSvmDataset::from_file(path)?;
        self.train(&dataset)
    }
}

/// A trained linear model with its bias folded into the weight vector
#[derive(Debug, Clone)]
pub struct TrainedModel {
    solution: Solution,
    config: SolverConfig,
}

impl TrainedModel {
    pub(crate) fn new(solution: Solution, config: SolverConfig) -> Self {
        Self { solution, config }
    }

    /// Rebuild a model from persisted parts
    pub(crate) fn from_parts(
        w: Vec<f64>,
        duality_gap: f64,
        stop: StopReason,
        iterations: usize,
        config: SolverConfig,
    ) -> Self {
        Self {
            solution: Solution {
                w,
                alpha: Vec::new(),
                duality_gap,
                stop,
                iterations,
                trace: Vec::new(),
            },
            config,
        }
    }

    /// Weight vector, bias in the last component
    pub fn weights(&self) -> &[f64] {
        &self.solution.w
    }

    /// The learned bias term
    pub fn bias(&self) -> f64 {
        *self.solution.w.last().unwrap_or(&0.0)
    }

    /// Final duality gap of the training run
    pub fn duality_gap(&self) -> f64 {
        self.solution.duality_gap
    }

    /// Why training stopped
    pub fn stop_reason(&self) -> StopReason {
        self.solution.stop
    }

    /// Number of completed outer iterations
    pub fn iterations(&self) -> usize {
        self.solution.iterations
    }

    /// Per-iteration objective values recorded during training
    pub fn trace(&self) -> &[IterationStats] {
        &self.solution.trace
    }

    /// Training configuration the model was produced with
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Decision value for a raw sample (no bias feature appended)
    pub fn decision_function(&self, sample: &Sample) -> f64 {
        // Raw feature indices never reach the bias slot, and features the
        // model has never seen carry zero weight.
        sample.features.dot_dense(&self.solution.w) + self.bias()
    }

    /// Predict a single sample
    pub fn predict(&self, sample: &Sample) -> Prediction {
        let decision_value = self.decision_function(sample);
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Prediction::new(label, decision_value)
    }

    /// Evaluate accuracy on a dataset.
    ///
    /// Same error rule as the distributed evaluator: a non-positive
    /// `y * decision` counts against accuracy. Pure and deterministic.
    pub fn evaluate<D: Dataset + ?Sized>(&self, dataset: &D) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let errors = (0..dataset.len())
            .filter(|&i| {
                let sample = dataset.get_sample(i);
                sample.label * self.decision_function(&sample) <= 0.0
            })
            .count();
        1.0 - errors as f64 / dataset.len() as f64
    }

    /// Summary of the model
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            dimensions: self.solution.w.len(),
            bias: self.bias(),
            duality_gap: self.solution.duality_gap,
            iterations: self.solution.iterations,
            stop: self.solution.stop,
        }
    }
}

/// Lightweight model summary for reporting
#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    /// Weight dimension including the bias slot
    pub dimensions: usize,
    /// Learned bias
    pub bias: f64,
    /// Final duality gap
    pub duality_gap: f64,
    /// Completed outer iterations
    pub iterations: usize,
    /// Terminal state
    pub stop: StopReason,
}

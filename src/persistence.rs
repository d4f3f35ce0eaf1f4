//! Model serialization and persistence
//!
//! Saves and loads trained linear models for the CLI application and other
//! scenarios where a trained weight vector outlives the training job.

use crate::api::TrainedModel;
use crate::core::{Result, SolverConfig, StopReason, SvmError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable representation of a trained linear model
#[derive(Serialize, Deserialize)]
pub struct SerializableModel {
    /// Dense weight vector, bias folded into the last component
    pub weights: Vec<f64>,
    /// Final duality gap of the training run
    pub duality_gap: f64,
    /// Terminal state tag
    pub stop_reason: String,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Weight dimension including the bias slot
    pub dimensions: usize,
    /// Completed outer iterations
    pub iterations: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub max_iter: usize,
    pub max_inn_iter: usize,
    pub workers: usize,
}

fn stop_tag(stop: StopReason) -> &'static str {
    match stop {
        StopReason::GapConverged => "gap_converged",
        StopReason::NonDescent => "non_descent",
        StopReason::IterationBudget => "iteration_budget",
    }
}

fn parse_stop_tag(tag: &str) -> Option<StopReason> {
    match tag {
        "gap_converged" => Some(StopReason::GapConverged),
        "non_descent" => Some(StopReason::NonDescent),
        "iteration_budget" => Some(StopReason::IterationBudget),
        _ => None,
    }
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel) -> Self {
        let config = model.config();
        Self {
            weights: model.weights().to_vec(),
            duality_gap: model.duality_gap(),
            stop_reason: stop_tag(model.stop_reason()).to_string(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                dimensions: model.weights().len(),
                iterations: model.iterations(),
                training_params: TrainingParams {
                    c: config.c,
                    max_iter: config.max_iter,
                    max_inn_iter: config.max_inn_iter,
                    workers: config.workers,
                },
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(SvmError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SvmError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SvmError::SerializationError(e.to_string()))?;
        Ok(model)
    }

    /// Convert back to a trained model
    pub fn to_trained_model(&self) -> Result<TrainedModel> {
        let stop = parse_stop_tag(&self.stop_reason).ok_or_else(|| {
            SvmError::SerializationError(format!("unknown stop reason '{}'", self.stop_reason))
        })?;
        let params = &self.metadata.training_params;
        let config = SolverConfig {
            c: params.c,
            max_iter: params.max_iter,
            max_inn_iter: params.max_inn_iter,
            workers: params.workers,
            ..SolverConfig::default()
        };
        Ok(TrainedModel::from_parts(
            self.weights.clone(),
            self.duality_gap,
            stop,
            self.metadata.iterations,
            config,
        ))
    }

    /// Print a human-readable summary
    pub fn print_summary(&self) {
        println!("Model Summary:");
        println!("  Library version: {}", self.metadata.library_version);
        println!("  Created: {}", self.metadata.created_at);
        println!("  Dimensions: {}", self.metadata.dimensions);
        println!("  Iterations: {}", self.metadata.iterations);
        println!("  Stop reason: {}", self.stop_reason);
        println!("  Duality gap: {:.6e}", self.duality_gap);
        println!(
            "  Training: C={}, max_iter={}, max_inn_iter={}, workers={}",
            self.metadata.training_params.c,
            self.metadata.training_params.max_iter,
            self.metadata.training_params.max_inn_iter,
            self.metadata.training_params.workers
        );
    }
}

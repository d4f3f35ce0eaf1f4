//! Distributed dual coordinate-descent training for L2-loss linear SVMs
//!
//! Based on "Distributed Box-Constrained Quadratic Optimization for Dual
//! Linear SVM" by Lee et al., 2015

pub mod api;
pub mod comm;
pub mod config;
pub mod core;
pub mod data;
pub mod persistence;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::{ModelInfo, SvmTrainer, TrainedModel};
pub use crate::comm::{Allreduce, ReduceChannels};
pub use crate::config::{DataFormat, JobConfig};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{GlobalRange, LibSvmDataset, Partition, TsvDataset};
pub use crate::solver::{DistributedSolver, TrainOutcome};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

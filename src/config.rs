//! Job configuration files
//!
//! A training job is described by a `key=value` file, one pair per line,
//! with `#` comments:
//!
//! ```text
//! train=/path/to/training/data
//! test=/path/to/testing/data
//! format=libsvm
//! C=1
//! is_sparse=true
//! max_iter=200
//! max_inn_iter=10
//! ```
//!
//! Missing or unparseable numeric hyperparameters are configuration errors
//! and abort before any training starts; an unrecognized `format` is
//! rejected eagerly rather than risking a silent mis-parse.

use crate::core::{Dataset, Result, SvmError};
use crate::data::{LibSvmDataset, TsvDataset};
use log::warn;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supported sparse feature-vector encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// `label index:value ...` with 1-based indices
    LibSvm,
    /// Dense tab-separated columns, label last
    Tsv,
}

impl DataFormat {
    /// Load a dataset of this format from a file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Box<dyn Dataset>> {
        match self {
            DataFormat::LibSvm => Ok(Box::new(LibSvmDataset::from_file(path)?)),
            DataFormat::Tsv => Ok(Box::new(TsvDataset::from_file(path)?)),
        }
    }
}

impl FromStr for DataFormat {
    type Err = SvmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "libsvm" => Ok(DataFormat::LibSvm),
            "tsv" => Ok(DataFormat::Tsv),
            other => Err(SvmError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A parsed and validated training job description
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Path to the training dataset
    pub train: PathBuf,
    /// Path to the testing dataset
    pub test: PathBuf,
    /// Encoding of both datasets
    pub format: DataFormat,
    /// Regularization strength
    pub c: f64,
    /// Sparse-data switch; `false` is accepted but produces a no-op run
    pub is_sparse: bool,
    /// Outer iteration budget
    pub max_iter: usize,
    /// Inner sweeps per outer iteration
    pub max_inn_iter: usize,
}

/// Keys the job parser understands
const KNOWN_KEYS: [&str; 7] = [
    "train",
    "test",
    "format",
    "C",
    "is_sparse",
    "max_iter",
    "max_inn_iter",
];

impl JobConfig {
    /// Read and validate a job file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(SvmError::IoError)?;
        Self::from_str_content(&content)
    }

    /// Parse and validate job-file content
    pub fn from_str_content(content: &str) -> Result<Self> {
        let mut pairs = HashMap::new();
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                SvmError::ConfigError(format!("line {}: expected key=value", line_num + 1))
            })?;
            let key = key.trim();
            if !KNOWN_KEYS.contains(&key) {
                warn!("ignoring unknown configuration key '{key}'");
                continue;
            }
            pairs.insert(key.to_string(), value.trim().to_string());
        }
        Self::from_pairs(&pairs)
    }

    /// Build a config from raw key/value pairs
    pub fn from_pairs(pairs: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &str| -> Result<&str> {
            pairs
                .get(key)
                .map(String::as_str)
                .ok_or_else(|| SvmError::ConfigError(format!("missing required key '{key}'")))
        };

        let format: DataFormat = required("format")?.parse()?;

        let c = parse_numeric::<f64>("C", required("C")?)?;
        if c <= 0.0 || !c.is_finite() {
            return Err(SvmError::ConfigError(format!(
                "C must be positive and finite, got {c}"
            )));
        }
        let max_iter = parse_numeric::<usize>("max_iter", required("max_iter")?)?;
        let max_inn_iter = parse_numeric::<usize>("max_inn_iter", required("max_inn_iter")?)?;

        let is_sparse = match pairs.get("is_sparse").map(String::as_str) {
            None | Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(SvmError::ConfigError(format!(
                    "is_sparse must be true or false, got '{other}'"
                )))
            }
        };

        Ok(JobConfig {
            train: PathBuf::from(required("train")?),
            test: PathBuf::from(required("test")?),
            format,
            c,
            is_sparse,
            max_iter,
            max_inn_iter,
        })
    }
}

fn parse_numeric<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        SvmError::ConfigError(format!("key '{key}' is not a valid number: '{value}'"))
    })
}

//! TSV format dataset implementation
//!
//! Supports loading datasets from tab-separated files where:
//! - Each row is one sample, all feature columns dense
//! - The last column is the label
//!
//! Example:
//! 0.5	1.2	+1
//! 0.3	2.1	-1

use crate::core::{Dataset, Result, Sample, SparseVector, SvmError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for TSV format files
#[derive(Debug, Clone)]
pub struct TsvDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl TsvDataset {
    /// Load a dataset from a TSV file
    ///
    /// The last column is the label; zero feature values are dropped so the
    /// stored representation stays sparse.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SvmError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut samples = Vec::new();
        let mut dimensions = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SvmError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (sample, width) = Self::parse_line(line).map_err(|e| {
                SvmError::ParseError(format!("line {}: {}", line_num + 1, e))
            })?;
            dimensions = dimensions.max(width);
            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(SvmError::EmptyDataset);
        }

        Ok(TsvDataset {
            samples,
            dimensions,
        })
    }

    /// Parse one dense TSV row into a sample and its feature-column count
    fn parse_line(line: &str) -> Result<(Sample, usize)> {
        let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();

        if fields.len() < 2 {
            return Err(SvmError::ParseError(format!(
                "Row has too few columns: {line}"
            )));
        }

        let label_str = fields[fields.len() - 1];
        let label = label_str
            .parse::<f64>()
            .map_err(|_| SvmError::ParseError(format!("Invalid label: {label_str}")))?;
        let label = if label > 0.0 { 1.0 } else { -1.0 };

        let mut indices = Vec::new();
        let mut values = Vec::new();

        for (idx, field) in fields.iter().take(fields.len() - 1).enumerate() {
            let value = field.parse::<f64>().map_err(|_| {
                SvmError::ParseError(format!("Invalid feature value at column {}: {field}", idx + 1))
            })?;
            // Only store non-zero values for sparsity
            if value != 0.0 {
                indices.push(idx);
                values.push(value);
            }
        }

        let features = if indices.is_empty() {
            SparseVector::empty()
        } else {
            SparseVector::new(indices, values)
        };

        Ok((Sample::new(features, label), fields.len() - 1))
    }
}

impl Dataset for TsvDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

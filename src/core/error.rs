//! Error types for distributed SVM training

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvmError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Unsupported data format: {0} (expected 'libsvm' or 'tsv')")]
    UnsupportedFormat(String),

    #[error("Synchronization failure: {0}")]
    Synchronization(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SvmError>;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for the batch runner
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Failed to parse configuration: {0}")]
    ConfigError(String),

    #[error("Data root is not a directory: {0}")]
    DataRootNotFound(PathBuf),

    #[error("Evaluate process exited with status {status} for {metric_dir}")]
    EvaluateFailed { metric_dir: PathBuf, status: i32 },

    #[error("Aggregate process exited with status {status}")]
    AggregateFailed { status: i32 },

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for batch runner operations
pub type BenchResult<T> = Result<T, BenchError>;

impl From<anyhow::Error> for BenchError {
    fn from(err: anyhow::Error) -> Self {
        BenchError::Other(err.to_string())
    }
}

impl BenchError {
    /// Exit code to propagate when this error came from a child process.
    pub fn child_exit_code(&self) -> Option<i32> {
        match self {
            BenchError::EvaluateFailed { status, .. } => Some(*status),
            BenchError::AggregateFailed { status } => Some(*status),
            _ => None,
        }
    }
}

//! Benchmark error type.

use thiserror::Error;

/// Errors raised while running or recording benchmarks.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unknown dataset '{0}'")]
    UnknownDataset(String),
}

/// Result alias for benchmark operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Error types for the dataset pipelines
///
/// Only configuration and orchestration failures are errors here.
/// A single image or copy that fails is reported as an `Outcome::Failure`
/// by the worker pool and never turns into a `PrepError`.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that stop a pipeline before or between classes
#[derive(Debug, Error)]
pub enum PrepError {
    /// The configured input root does not exist
    #[error("source directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    /// Split ratios do not add up to 1.0 (within 0.001)
    #[error("ratios must sum to 1 (train={train}, val={val}, test={test}, sum={sum})")]
    InvalidRatios {
        train: f64,
        val: f64,
        test: f64,
        sum: f64,
    },

    /// A split ratio is negative or not a number
    #[error("{name} ratio must be a finite value >= 0, got {value}")]
    NegativeRatio { name: &'static str, value: f64 },

    /// Target width or height is zero
    #[error("target size must be non-zero, got {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },

    /// Filesystem error outside of a single item task
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Worker pool could not be started
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PrepError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

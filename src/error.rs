//! Error types for rust_specificity

use thiserror::Error;

/// Main error type for specificity index operations
#[derive(Error, Debug)]
pub enum SpecificityError {
    #[error("Invalid sample grouping: {reason}")]
    InvalidGrouping { reason: String },

    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("Invalid expression matrix: {reason}")]
    InvalidMatrix { reason: String },

    #[error("Invalid metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

/// Result type alias for specificity operations
pub type Result<T> = std::result::Result<T, SpecificityError>;

/// Non-fatal conditions detected while preparing a computation.
///
/// These never abort a run; they are logged and can be inspected by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecificityWarning {
    /// A group has exactly one member sample, so bootstrap resampling
    /// always redraws that sample and adds no variance for the group.
    DegenerateGroup { group: String, sample: String },
}

impl std::fmt::Display for SpecificityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecificityWarning::DegenerateGroup { group, sample } => write!(
                f,
                "group '{}' has a single sample ('{}'); resampling is deterministic for it",
                group, sample
            ),
        }
    }
}

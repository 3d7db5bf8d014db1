//! Error types for the scaler pipeline.

use thiserror::Error;

/// Errors that can occur while fitting or applying a scaler.
#[derive(Debug, Error)]
pub enum ScalerError {
    // === Numeric Domain Errors ===
    /// A continuous value is not strictly positive after the Box-Cox shift.
    #[error("column '{column}': value {value} is not positive after the Box-Cox shift")]
    Domain { column: String, value: f64 },

    /// Null cell in a column that is being encoded or scaled.
    #[error("column '{column}': missing value at row {row}")]
    MissingValue { column: String, row: usize },

    // === Encoding Errors ===
    /// Categorical value that was not observed during fit.
    #[error("column '{column}': unseen category '{value}'")]
    UnseenCategory { column: String, value: String },

    // === Shape Errors ===
    /// Output blocks could not be concatenated with either strategy.
    #[error("cannot concatenate output blocks: {message}")]
    ShapeMismatch { message: String },

    /// Input width differs from the width seen during fit.
    #[error("feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// No rows to fit on, or no columns to transform.
    #[error("empty data: {message}")]
    EmptyData { message: String },

    // === Configuration Errors ===
    /// Invalid column override, verbosity name or scaling range.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl ScalerError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn empty(message: impl Into<String>) -> Self {
        Self::EmptyData {
            message: message.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for ScalerError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for scaler operations.
pub type Result<T> = std::result::Result<T, ScalerError>;

//! Error types for the praktool facade

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from loading, deriving and printing tables
#[derive(Debug, Error)]
pub enum Error {
    /// Table or column error
    #[error(transparent)]
    Core(#[from] praktool_core::Error),

    /// Data file error
    #[error(transparent)]
    Data(#[from] praktool_io::IoError),

    /// IO error while printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed `name[unit] = formula` definition
    #[error("Invalid definition '{text}': {reason}")]
    InvalidDefinition { text: String, reason: String },
}

impl From<praktool_formula::FormulaError> for Error {
    fn from(err: praktool_formula::FormulaError) -> Self {
        Error::Core(err.into())
    }
}

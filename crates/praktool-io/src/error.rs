//! Data file error types

use thiserror::Error;

/// Result type for reading and writing data files
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Errors that can occur while reading or writing data files
#[derive(Debug, Error)]
pub enum IoError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed line in a data file
    #[error("Parse error at line {line}, field {field}: {message}")]
    Parse {
        line: usize,
        field: usize,
        message: String,
    },

    /// File format could not be determined
    #[error("Unknown data format: {0}")]
    UnknownFormat(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] praktool_core::Error),
}

impl IoError {
    pub(crate) fn parse(line: usize, field: usize, message: impl Into<String>) -> Self {
        IoError::Parse {
            line,
            field,
            message: message.into(),
        }
    }
}

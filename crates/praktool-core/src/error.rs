//! Error types for praktool-core

use praktool_formula::FormulaError;
use thiserror::Error;

use crate::uncertainty::UncertaintyKind;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in praktool-core
#[derive(Debug, Error)]
pub enum Error {
    /// A column with this symbol or name is already registered
    #[error("Duplicate symbol: {0}")]
    DuplicateSymbol(String),

    /// Formula references a symbol that is not a column of the table
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Lookup of a column that does not exist
    #[error("Column not found: {0}")]
    UnknownColumn(String),

    /// Value or formula whose dimension does not match the column unit
    #[error("Incompatible unit for column {column}: expected [{expected}], got [{found}]")]
    IncompatibleUnit {
        column: String,
        expected: String,
        found: String,
    },

    /// Attachment declared twice for the same kind
    #[error("Attachment {kind} already defined on column {column}")]
    AttachmentExists {
        column: String,
        kind: UncertaintyKind,
    },

    /// Attachment declared without default on a column that already has rows
    #[error("Cannot add {kind} attachment to non-empty column {column} without a default")]
    MissingAttachmentDefault {
        column: String,
        kind: UncertaintyKind,
    },

    /// Row appended without a value for an attachment that has no default
    #[error("Must have a value for {kind} attachment of column {column} (no default given)")]
    MissingAttachmentValue {
        column: String,
        kind: UncertaintyKind,
    },

    /// Columns that must be aligned row by row have different lengths
    #[error("Row count mismatch: column {column} has {found} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Dependency cycle between derived columns
    #[error("Cyclic reference: {}", .cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },

    /// Operation that cannot carry uncertainties through
    #[error("{operation} does not support columns with attachments ({column})")]
    AttachmentsNotSupported {
        column: String,
        operation: &'static str,
    },

    /// Not enough values for a statistic
    #[error("Insufficient data: need at least {needed} values, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid argument to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Formula that cannot define a derived column
    #[error("Invalid formula for column {column}: {reason}")]
    InvalidFormula { column: String, reason: String },

    /// Reading appended to a column that is not a measurement column
    #[error("Column {0} is not a measurement column")]
    NotMeasurement(String),

    /// Error from the formula layer
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

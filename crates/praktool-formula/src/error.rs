//! Formula error types

use crate::units::Dimension;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing, analysing or evaluating expressions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Identifier that is neither a column nor a known unit
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// Unit name that the registry cannot resolve
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Operands whose physical dimensions do not fit together
    #[error("Incompatible dimensions in {operation}: [{left}] vs [{right}]")]
    IncompatibleDimensions {
        operation: String,
        left: Dimension,
        right: Dimension,
    },

    /// Numeric evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

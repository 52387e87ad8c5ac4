//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// The parser needed a token after the End sentinel
    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    /// Reference text that is not a valid cell address
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A result too large to represent
    #[error("Numeric overflow")]
    Overflow,

    /// Circular reference
    #[error("Circular reference detected")]
    CircularReference,
}

impl From<sheetcalc_core::Error> for FormulaError {
    fn from(err: sheetcalc_core::Error) -> Self {
        FormulaError::InvalidReference(err.to_string())
    }
}

//! Error types for the child support engine.
//!
//! Every fallible operation returns [`EngineResult`]. Input problems are
//! reported as [`EngineError::InputValidation`] before any computation starts,
//! so a failed call never yields a partial result.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the child support engine.
///
/// # Example
///
/// ```
/// use child_support_engine::error::EngineError;
///
/// let error = EngineError::InputValidation {
///     field: "parent_a.adjusted_taxable_income".to_string(),
///     message: "must not be negative".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid input 'parent_a.adjusted_taxable_income': must not be negative"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller input failed validation.
    #[error("Invalid input '{field}': {message}")]
    InputValidation {
        /// Dotted path of the offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is structurally unusable.
    #[error("Invalid configuration in '{path}': {message}")]
    ConfigInvalid {
        /// The path to the offending file.
        path: String,
        /// A description of the problem.
        message: String,
    },

    /// No rate table is effective on the requested date.
    #[error("No child support rates effective on {date}")]
    RatesNotFound {
        /// The assessment date that was requested.
        date: NaiveDate,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InputValidation`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

//! Errors from formatter construction and use.

use thiserror::Error;

/// Malformed formatter configuration, reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Precision magnitude above six digits.
    #[error("precision {0} out of range (magnitude must be at most 6)")]
    InvalidPrecision(i32),
    /// List mode configured with an empty separator.
    #[error("list separator must not be empty")]
    EmptySeparator,
    /// A formatter kind, case or charset tag that is not recognised.
    #[error("unsupported {what} tag: {tag:?}")]
    Unsupported { what: &'static str, tag: String },
    /// Date pattern with no tokens or literals.
    #[error("date pattern must not be empty")]
    EmptyPattern,
    /// Locale document could not be read.
    #[error("invalid locale table: {0}")]
    InvalidLocale(String),
}

/// A formatter was handed a value of the wrong variant.
///
/// This signals a wiring bug in the binding, not bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("{formatter} formatter expects {expected}, got {found}")]
    TypeMismatch {
        formatter: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

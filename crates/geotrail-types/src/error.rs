//! Error types for record normalization in geotrail-types.

use thiserror::Error;

/// Errors that can occur when converting a raw database cell into a typed value.
///
/// Apart from [`ParseError::InvalidSchema`], these errors are scoped to a
/// single cell of a single row. Callers are expected to reject that one
/// record and keep going.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A timestamp cell could not be converted to an absolute time.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A column required to build a record is absent from the table.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A cell holds a value of the wrong kind for its column.
    #[error("Invalid value in column {column}: {reason}")]
    InvalidValue { column: String, reason: String },

    /// A schema descriptor is inconsistent.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

/// Result type alias using geotrail-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

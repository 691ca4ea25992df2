//! Error types for sweep-report
//!
//! Malformed input surfaces as an error at the boundary where it is detected;
//! the aggregation layer guards reductions instead of relying on errors.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// sweep-report error types
#[derive(Error, Debug)]
pub enum Error {
    /// A dotted projection path is absent from an element
    #[error("Key lookup failed: path '{path}' is missing from at least one record\nPre-filter records that may lack this field")]
    KeyLookup {
        /// Dotted path that could not be resolved
        path: String,
    },

    /// Numeric reduction over zero elements
    #[error("Empty reduction: {op}() called on an empty sequence")]
    EmptyReduction {
        /// Name of the reduction (`mean`, `std`)
        op: &'static str,
    },

    /// Projected value has the wrong type for the requested operation
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected value kind
        expected: &'static str,
        /// Rendered value that was found instead
        found: String,
    },

    /// Invalid argument to a query or report operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A logged checkpoint does not carry the fields a record needs
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Selection method slug not recognised
    #[error("Unknown selection method '{0}' (expected one of: iid, loo, oracle)")]
    UnknownSelectionMethod(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

//! # Error types
//!
//! Only recoverable conditions live here. A token/label length mismatch in the
//! assembler is a bug in tagger integration and panics instead.

use thiserror::Error;

/// Errors surfaced by `address-core`.
#[derive(Error, Debug)]
pub enum AddressError {
    /// No trained tagger installed in the parser.
    #[error(
        "missing model: train one with AddressModel::train (or AddressModel::build for the \
         embedded corpus) and install it with AddressParser::with_tagger before calling parse or tag"
    )]
    ModelUnavailable,

    /// Malformed reference table.
    #[error("reference data error at line {line}: {reason}")]
    ReferenceData {
        /// 1-based line number in the source table
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Training could not start.
    #[error("training failed: {reason}")]
    Training {
        /// Why the corpus was rejected
        reason: String,
    },

    /// I/O error while reading reference data
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model (de)serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for address-core operations
pub type Result<T> = std::result::Result<T, AddressError>;

//! Error types for ipgeo-batch
//!
//! Per-address lookup failures never appear here: the lookup client folds
//! them into the result as error markers. These variants cover batch-level
//! precondition failures and export failures only.

use std::path::PathBuf;
use thiserror::Error;

/// Batch-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// No fields were selected
    #[error("At least one field must be selected")]
    EmptyFieldSet,

    /// Field name outside the catalog
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Address source yielded no addresses
    #[error("No addresses to look up")]
    EmptyInput,

    /// Address source could not be read
    #[error("Failed to read addresses from {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Result destination could not be written
    #[error("Failed to export results to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// HTTP client could not be constructed
    #[error("Client error: {0}")]
    Client(String),

    /// ipgeo-common error
    #[error("Common error: {0}")]
    Common(#[from] ipgeo_common::Error),
}

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, Error>;

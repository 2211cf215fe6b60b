//! Error taxonomy for the bookkeeping layers.

use std::path::Path;

/// Errors raised by entities, tables, ledgers and collections
#[derive(Debug, thiserror::Error)]
pub enum ZenithError {
    /// A record id, collection item or source file does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Malformed delimited file, missing required column or non-numeric value
    #[error("Parse error: {0}")]
    Parse(String),
    /// Strict insert received fields outside the declared schema
    #[error("Fields outside the declared schema: {}", .0.join(", "))]
    SchemaMismatch(Vec<String>),
    /// An operation would break a ledger invariant (duplicate id, bad operator output)
    #[error("Integrity violation: {0}")]
    Integrity(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ZenithError {
    pub(crate) fn missing_file(path: &Path) -> Self {
        ZenithError::NotFound(format!("file {}", path.display()))
    }

    pub(crate) fn missing_record(id: &str) -> Self {
        ZenithError::NotFound(format!("record {}", id))
    }
}

pub type Result<T> = std::result::Result<T, ZenithError>;

//! Table loading errors

use std::path::PathBuf;
use thiserror::Error;

use domain_rating::TableError;

/// Errors that can occur while loading reference tables
#[derive(Debug, Error)]
pub enum LoadError {
    /// A table file could not be opened
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be parsed as CSV or deserialized
    #[error("Malformed {table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header
    #[error("Missing column '{column}' in {table} table")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    /// A cell holds a value of the wrong shape
    #[error("Invalid value in {table} table at line {line}: {message}")]
    InvalidValue {
        table: &'static str,
        line: u64,
        message: String,
    },

    /// The rows parsed but do not form a valid snapshot
    #[error("Invalid reference tables: {0}")]
    Table(#[from] TableError),
}

impl LoadError {
    pub(crate) fn csv(table: &'static str) -> impl FnOnce(csv::Error) -> LoadError {
        move |source| LoadError::Csv { table, source }
    }
}

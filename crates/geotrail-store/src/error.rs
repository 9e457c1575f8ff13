//! Error types for geotrail-store.

use std::path::PathBuf;

/// Result type for geotrail-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in geotrail-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The database file could not be opened.
    #[error("Failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    /// The database file does not exist.
    #[error("Database file not found: {0}")]
    NotFound(PathBuf),

    /// An expected table is absent from the database.
    #[error("Table {0} not located")]
    MissingTable(String),
}

impl Error {
    /// Whether this error only means a table is absent.
    pub fn is_missing_table(&self) -> bool {
        matches!(self, Error::MissingTable(_))
    }
}

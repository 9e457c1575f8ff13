//! Error types for geotrail-core.
//!
//! # Fatal vs. recoverable
//!
//! Only conditions that make the whole run meaningless are errors here:
//!
//! | Error | Meaning |
//! |-------|---------|
//! | [`Error::ArchiveNotFound`] | Input path does not exist |
//! | [`Error::InvalidArchive`] | Input is not a zip container |
//! | [`Error::ScratchDirectory`] | Scratch directory could not be created after a purge |
//! | [`Error::ScratchConflict`] | Scratch directory would swallow the input, the outputs or the working directory |
//! | [`Error::ForeignScratchDirectory`] | Scratch path is taken by something geotrail did not create |
//! | [`Error::Store`] | A query failed for a reason other than a missing table |
//!
//! A missing embedded database, a missing table and a bad timestamp in one
//! row are not errors. They are logged and recorded in the
//! [`RunReport`](crate::RunReport) while the run continues.

use std::path::PathBuf;

/// Result type for geotrail-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an extraction run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input path does not exist.
    #[error("'{0}' does not exist or is not a file")]
    ArchiveNotFound(PathBuf),

    /// The input is not a readable zip container.
    #[error("'{path}' does not appear to be a zipfile: {reason}")]
    InvalidArchive { path: PathBuf, reason: String },

    /// Reading an entry from an already opened archive failed.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An archive entry name would escape the scratch directory.
    #[error("Refusing to extract unsafe entry path: {0}")]
    UnsafeEntryPath(String),

    /// The extracted file could not be found again under the scratch directory.
    #[error("Extracted file ending in {suffix} not found under {dir}")]
    ExtractedFileMissing { suffix: String, dir: PathBuf },

    /// The scratch directory could not be created, even after purging it.
    #[error("Failed to create scratch directory {path}: {source}")]
    ScratchDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Purging the scratch directory would delete `other`.
    #[error("Scratch directory {scratch} contains the {what} {other}")]
    ScratchConflict {
        scratch: PathBuf,
        what: &'static str,
        other: PathBuf,
    },

    /// The scratch path exists and was not created by geotrail.
    #[error("Refusing to purge {0}: not an empty or geotrail-created scratch directory")]
    ForeignScratchDirectory(PathBuf),

    /// Database error.
    #[error(transparent)]
    Store(#[from] geotrail_store::Error),

    /// The schema descriptor is inconsistent.
    #[error(transparent)]
    Schema(#[from] geotrail_types::ParseError),

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

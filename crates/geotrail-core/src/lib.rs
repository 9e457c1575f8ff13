//! Extraction pipeline for iOS `routined` location caches.
//!
//! Given a zip image of a device file system, this crate finds the
//! `routined` SQLite caches inside it, extracts each one into a scratch
//! directory, reads the track and visit tables, converts Cocoa timestamps
//! to UTC and writes the track as `trackLog.csv` and `routined.kml`.
//!
//! # Example
//!
//! ```no_run
//! use geotrail_core::{ExtractOptions, Extractor};
//! use geotrail_types::SchemaDescriptor;
//!
//! let extractor = Extractor::new(SchemaDescriptor::default(), ExtractOptions::default())?;
//! let report = extractor.run("extraction.zip")?;
//! for path in report.outputs() {
//!     println!("wrote {}", path.display());
//! }
//! # Ok::<(), geotrail_core::Error>(())
//! ```
//!
//! Use [`inspect`] to list which caches an archive holds without
//! extracting anything.

pub mod archive;
pub mod error;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod scratch;

pub use archive::{Archive, EntryStatus, Inventory, inspect};
pub use error::{Error, Result};
pub use normalize::{normalize_track, normalize_visits};
pub use pipeline::{
    DatabaseReport, DatabaseStatus, ExtractOptions, Extractor, RunReport, TableOutcome,
    TableReport,
};
pub use scratch::{SCRATCH_MARKER, ScratchDir};

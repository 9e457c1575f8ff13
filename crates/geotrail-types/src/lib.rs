//! Shared types for geotrail.
//!
//! This crate holds everything that does not touch the file system: cell
//! values, normalized records, the schema descriptor for the embedded
//! databases, Cocoa time conversion and column renaming.
//!
//! # Features
//!
//! - [`Value`] and [`RawTable`] for rows read verbatim from SQLite
//! - [`LocationRecord`] and [`VisitRecord`] with absolute UTC timestamps
//! - [`RecordSet`], the single normalized snapshot every exporter reads
//! - [`SchemaDescriptor`] with the iOS `routined` defaults
//! - [`epoch`] for Cocoa ↔ Unix time
//! - [`ColumnMap`] for output column naming
//!
//! # Example
//!
//! ```
//! use geotrail_types::{ColumnMap, SchemaDescriptor, epoch};
//!
//! let schema = SchemaDescriptor::default();
//! assert_eq!(schema.databases.len(), 2);
//!
//! let map = ColumnMap::new().rename("ZLATITUDE", "LATITUDE");
//! assert_eq!(map.map("ZLATITUDE"), "LATITUDE");
//!
//! assert_eq!(epoch::cocoa_to_unix(0), Some(epoch::COCOA_EPOCH_OFFSET));
//! ```

pub mod epoch;
pub mod error;
pub mod mapping;
pub mod records;
pub mod schema;
pub mod value;

pub use error::{ParseError, ParseResult};
pub use mapping::ColumnMap;
pub use records::{
    LocationRecord, RecordSet, Row, RowRejection, TrackLog, VisitLog, VisitRecord,
};
pub use schema::{DatabaseSchema, SchemaDescriptor, TrackSchema, VisitSchema};
pub use value::{RawTable, Value};

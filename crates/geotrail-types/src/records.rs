//! Normalized location and visit records.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;
use crate::value::Value;

/// One location fix from the track table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocationRecord {
    /// Primary key of the source row.
    pub id: i64,
    /// Absolute time of the fix.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Latitude in decimal degrees, as stored. `None` when the cell is
    /// empty or not a number.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, as stored.
    pub longitude: Option<f64>,
    /// Horizontal accuracy radius in metres.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub horizontal_accuracy: Option<f64>,
    /// Vertical accuracy in metres.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub vertical_accuracy: Option<f64>,
    /// Speed in metres per second. Negative when the device did not report one.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub speed: Option<f64>,
}

/// One dwell event from the visit table.
///
/// Each timestamp is optional because an ongoing visit has no exit yet and
/// older rows may lack a detection date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisitRecord {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    pub detection_date: Option<OffsetDateTime>,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    pub entry_date: Option<OffsetDateTime>,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    pub exit_date: Option<OffsetDateTime>,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    pub location_date: Option<OffsetDateTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A normalized row: the typed record plus the full cell list it came from.
///
/// Keeping both together means every exporter reads the record and its
/// cells from the same source row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<R> {
    pub record: R,
    pub cells: Vec<Value>,
}

/// A source row that could not be normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// Zero-based position of the row in the source table.
    pub row: usize,
    /// Source column whose value was rejected.
    pub column: String,
    pub error: ParseError,
}

/// Ordered, immutable set of normalized rows from one table.
///
/// `columns` are the output column names (after renaming), one per cell.
/// Row order is the source table's row order with rejected rows left out.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet<R> {
    table: String,
    columns: Vec<String>,
    rows: Vec<Row<R>>,
    rejected: Vec<RowRejection>,
}

impl<R> RecordSet<R> {
    /// Assemble a record set. Every row must have one cell per column.
    pub fn from_parts(
        table: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Row<R>>,
        rejected: Vec<RowRejection>,
    ) -> Self {
        debug_assert!(rows.iter().all(|r| r.cells.len() == columns.len()));
        Self {
            table: table.into(),
            columns,
            rows,
            rejected,
        }
    }

    /// Source table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Output column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row<R>] {
        &self.rows
    }

    /// Iterate the typed records in row order.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().map(|r| &r.record)
    }

    /// Rows that were left out, in source order.
    pub fn rejected(&self) -> &[RowRejection] {
        &self.rejected
    }

    /// Number of normalized rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalized track table.
pub type TrackLog = RecordSet<LocationRecord>;

/// Normalized visit table.
pub type VisitLog = RecordSet<VisitRecord>;

//! Cell values and raw tables as read from an embedded database.

use core::fmt;

use time::OffsetDateTime;

/// A single cell value.
///
/// The first five variants mirror the SQLite storage classes. `Timestamp`
/// only appears after normalization, when a Cocoa time cell has been
/// converted to an absolute UTC time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
    /// Absolute UTC time produced by the time normalizer.
    Timestamp(OffsetDateTime),
}

impl Value {
    /// Returns `true` for SQL `NULL`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell.
    ///
    /// Integers are widened, text is parsed after trimming. Everything else
    /// yields `None`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Real(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integer view of the cell. Reals are accepted only when they hold a whole number.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Real(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Short name of the storage class, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{v}"),
            // Debug keeps the fraction on whole reals: `65.0`, not `65`.
            Value::Real(v) => write!(f, "{v:?}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Timestamp(ts) => f.write_str(&crate::epoch::format_timestamp(*ts)),
        }
    }
}

/// A table exactly as stored: every column, every row, in storage order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Table name in the source database.
    pub name: String,
    /// Column names in declaration order.
    pub columns: Vec<String>,
    /// Rows in the order the database returned them.
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// Create an empty table with the given columns.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64_accepts_numeric_text() {
        assert_eq!(Value::Text(" 12.5 ".into()).as_f64(), Some(12.5));
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Text("north".into()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_as_i64_rejects_fractional_reals() {
        assert_eq!(Value::Real(7.0).as_i64(), Some(7));
        assert_eq!(Value::Real(7.5).as_i64(), None);
        assert_eq!(Value::Blob(vec![1]).as_i64(), None);
    }

    #[test]
    fn test_display_renders_blob_as_hex() {
        assert_eq!(Value::Blob(vec![0x00, 0xab, 0x10]).to_string(), "00ab10");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_display_keeps_reals_fractional() {
        assert_eq!(Value::Real(65.0).to_string(), "65.0");
        assert_eq!(Value::Real(-1.0).to_string(), "-1.0");
        assert_eq!(Value::Real(48.85).to_string(), "48.85");
        assert_eq!(Value::Integer(65).to_string(), "65");
    }

    #[test]
    fn test_column_index() {
        let table = RawTable::new("T", vec!["Z_PK".into(), "ZTIMESTAMP".into()]);
        assert_eq!(table.column_index("ZTIMESTAMP"), Some(1));
        assert_eq!(table.column_index("ztimestamp"), None);
        assert!(table.is_empty());
    }
}

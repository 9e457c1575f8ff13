//! Read-only connection to an extracted cache database.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use geotrail_types::{RawTable, Value};

use crate::error::{Error, Result};
use crate::queries;

/// A read-only SQLite connection to one extracted database.
///
/// Nothing is ever written through this handle. Call [`CacheDb::close`]
/// before the file is deleted so close errors are reported instead of
/// being dropped silently.
pub struct CacheDb {
    conn: Connection,
    path: PathBuf,
}

impl CacheDb {
    /// Open an existing database file read-only.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        info!("Connecting to database {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether a table exists.
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let exists: bool = self
            .conn
            .query_row(queries::TABLE_EXISTS, [table], |row| row.get(0))?;
        Ok(exists)
    }

    /// List user tables, alphabetically.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(queries::LIST_TABLES)?;
        let tables = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(tables)
    }

    /// Count rows in a table.
    pub fn count_rows(&self, table: &str) -> Result<u64> {
        if !self.table_exists(table)? {
            return Err(Error::MissingTable(table.to_string()));
        }
        let count: i64 = self
            .conn
            .query_row(&queries::count_rows(table), [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Read every row and column of a table, unmodified.
    ///
    /// Returns [`Error::MissingTable`] when the table does not exist so the
    /// caller can decide whether that is fatal.
    pub fn read_table(&self, table: &str) -> Result<RawTable> {
        if !self.table_exists(table)? {
            return Err(Error::MissingTable(table.to_string()));
        }

        let sql = queries::select_all(table);
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(value_from_ref))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Read {} rows from {}", rows.len(), table);

        let mut raw = RawTable::new(table, columns);
        raw.rows = rows;
        Ok(raw)
    }

    /// Close the connection.
    pub fn close(self) -> Result<()> {
        info!("Closing database connection");
        self.conn.close().map_err(|(_, e)| Error::Database(e))
    }
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

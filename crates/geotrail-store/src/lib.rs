//! Read-only access to SQLite caches pulled out of a device image.
//!
//! The extractor never writes to evidence. [`CacheDb`] opens a database with
//! `SQLITE_OPEN_READ_ONLY`, runs fixed `SELECT *` queries and hands back
//! [`RawTable`](geotrail_types::RawTable)s with every cell exactly as stored.
//!
//! # Example
//!
//! ```no_run
//! use geotrail_store::{CacheDb, Error};
//!
//! let db = CacheDb::open_read_only("temp/com.apple.routined/Cache.sqlite")?;
//! match db.read_table("ZRTCLLOCATIONMO") {
//!     Ok(table) => println!("{} datapoints located", table.len()),
//!     Err(Error::MissingTable(name)) => eprintln!("{name} not located, skipping"),
//!     Err(e) => return Err(e),
//! }
//! db.close()?;
//! # Ok::<(), geotrail_store::Error>(())
//! ```

mod error;
mod queries;
mod store;

pub use error::{Error, Result};
pub use store::CacheDb;

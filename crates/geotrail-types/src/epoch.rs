//! Cocoa (Core Data) time conversion.
//!
//! Apple platforms store `NSDate` values as seconds relative to
//! 2001-01-01T00:00:00 UTC rather than the Unix epoch. The two reference
//! points are exactly [`COCOA_EPOCH_OFFSET`] seconds apart, the Unix epoch
//! being the earlier one.
//!
//! # Example
//!
//! ```
//! use geotrail_types::epoch::{cocoa_to_unix, from_cocoa_seconds, format_timestamp};
//!
//! assert_eq!(cocoa_to_unix(0), Some(978_307_200));
//!
//! let ts = from_cocoa_seconds(631_152_000.0)?;
//! assert_eq!(format_timestamp(ts), "2021/01/01 00:00:00");
//! # Ok::<(), geotrail_types::ParseError>(())
//! ```

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::error::{ParseError, ParseResult};
use crate::value::Value;

/// Seconds between 1970-01-01T00:00:00 UTC and 2001-01-01T00:00:00 UTC.
pub const COCOA_EPOCH_OFFSET: i64 = 978_307_200;

/// Rendering used for absolute timestamps in every export.
pub const EXPORT_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");

/// Shift Cocoa seconds to Unix seconds. `None` on overflow.
#[must_use]
pub const fn cocoa_to_unix(secs: i64) -> Option<i64> {
    secs.checked_add(COCOA_EPOCH_OFFSET)
}

/// Shift Unix seconds to Cocoa seconds. `None` on overflow.
#[must_use]
pub const fn unix_to_cocoa(secs: i64) -> Option<i64> {
    secs.checked_sub(COCOA_EPOCH_OFFSET)
}

/// The Cocoa reference date as an absolute time.
#[must_use]
pub fn cocoa_epoch() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH + Duration::seconds(COCOA_EPOCH_OFFSET)
}

/// Convert whole Cocoa seconds to an absolute UTC time.
pub fn from_cocoa_timestamp(secs: i64) -> ParseResult<OffsetDateTime> {
    let unix = cocoa_to_unix(secs)
        .ok_or_else(|| ParseError::InvalidTimestamp(format!("{secs} overflows the Unix range")))?;
    OffsetDateTime::from_unix_timestamp(unix)
        .map_err(|e| ParseError::InvalidTimestamp(format!("{secs}: {e}")))
}

/// Convert fractional Cocoa seconds to an absolute UTC time.
///
/// Sub-second precision is kept down to the nanosecond.
pub fn from_cocoa_seconds(secs: f64) -> ParseResult<OffsetDateTime> {
    if !secs.is_finite() {
        return Err(ParseError::InvalidTimestamp(format!("{secs} is not finite")));
    }

    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return Err(ParseError::InvalidTimestamp(format!("{secs} is out of range")));
    }

    let mut whole = whole as i64;
    let mut nanos = ((secs - whole as f64) * 1e9).round() as i64;
    if nanos >= 1_000_000_000 {
        whole = whole.saturating_add(1);
        nanos -= 1_000_000_000;
    }

    Ok(from_cocoa_timestamp(whole)? + Duration::nanoseconds(nanos))
}

/// Convert one cell holding Cocoa time.
///
/// `NULL` stays absent. Integers and reals are converted directly, text is
/// accepted when it parses as a number. A cell that was already normalized
/// is passed through so repeated normalization is harmless.
pub fn cocoa_value_to_datetime(value: &Value) -> ParseResult<Option<OffsetDateTime>> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(secs) => from_cocoa_timestamp(*secs).map(Some),
        Value::Real(secs) => from_cocoa_seconds(*secs).map(Some),
        Value::Text(s) => {
            let secs: f64 = s
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidTimestamp(format!("{s:?} is not numeric")))?;
            from_cocoa_seconds(secs).map(Some)
        }
        Value::Blob(_) => Err(ParseError::InvalidTimestamp(
            "blob values cannot hold a timestamp".to_string(),
        )),
        Value::Timestamp(ts) => Ok(Some(*ts)),
    }
}

/// Render an absolute time as `YYYY/MM/DD HH:MM:SS` in UTC.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.to_offset(UtcOffset::UTC)
        .format(EXPORT_TIME_FORMAT)
        .unwrap_or_default()
}

//! Turning raw tables into normalized record sets.
//!
//! Normalization runs two independent steps per table:
//!
//! 1. Time conversion, row by row. A row whose timestamp cannot be
//!    converted is rejected on its own; its siblings are unaffected.
//!    Coordinates are taken as stored: a missing or non-numeric one leaves
//!    the record without a position but keeps the row.
//! 2. Column renaming on the header via the schema's [`ColumnMap`](geotrail_types::ColumnMap).
//!
//! Track rows gain one extra cell holding the absolute time. Visit rows
//! have their four Cocoa time cells replaced in place.

use geotrail_types::epoch::cocoa_value_to_datetime;
use geotrail_types::{
    LocationRecord, ParseError, ParseResult, RawTable, Row, RowRejection, TrackLog, TrackSchema,
    Value, VisitLog, VisitRecord, VisitSchema,
};
use time::OffsetDateTime;
use tracing::warn;

/// Column positions needed to project a track row.
struct TrackColumns {
    id: usize,
    timestamp: usize,
    latitude: usize,
    longitude: usize,
    horizontal_accuracy: Option<usize>,
    vertical_accuracy: Option<usize>,
    speed: Option<usize>,
}

impl TrackColumns {
    fn resolve(raw: &RawTable, schema: &TrackSchema) -> ParseResult<Self> {
        Ok(Self {
            id: require(raw, &schema.id_column)?,
            timestamp: require(raw, &schema.timestamp_column)?,
            latitude: require(raw, &schema.latitude_column)?,
            longitude: require(raw, &schema.longitude_column)?,
            horizontal_accuracy: optional(raw, schema.horizontal_accuracy_column.as_deref()),
            vertical_accuracy: optional(raw, schema.vertical_accuracy_column.as_deref()),
            speed: optional(raw, schema.speed_column.as_deref()),
        })
    }
}

fn require(raw: &RawTable, column: &str) -> ParseResult<usize> {
    raw.column_index(column)
        .ok_or_else(|| ParseError::MissingColumn(format!("{}.{}", raw.name, column)))
}

fn optional(raw: &RawTable, column: Option<&str>) -> Option<usize> {
    column.and_then(|c| raw.column_index(c))
}

/// Normalize a track table.
///
/// Fails only when a required column is missing from the table header;
/// per-row problems end up in [`RecordSet::rejected`](geotrail_types::RecordSet::rejected).
pub fn normalize_track(raw: RawTable, schema: &TrackSchema) -> ParseResult<TrackLog> {
    let cols = TrackColumns::resolve(&raw, schema)?;
    let RawTable {
        name,
        mut columns,
        rows: raw_rows,
    } = raw;

    let time_index = columns.iter().position(|c| *c == schema.time_column);
    if time_index.is_none() {
        columns.push(schema.time_column.clone());
    }

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut rejected = Vec::new();

    for (i, mut cells) in raw_rows.into_iter().enumerate() {
        match project_location(&cols, schema, &cells) {
            Ok(record) => {
                let stamp = Value::Timestamp(record.timestamp);
                match time_index {
                    Some(idx) => cells[idx] = stamp,
                    None => cells.push(stamp),
                }
                rows.push(Row { record, cells });
            }
            Err((column, error)) => {
                warn!("Skipping row {} of {}: {}", i, name, error);
                rejected.push(RowRejection { row: i, column, error });
            }
        }
    }

    schema.renames.apply(&mut columns);
    Ok(TrackLog::from_parts(name, columns, rows, rejected))
}

type RowResult<T> = Result<T, (String, ParseError)>;

fn project_location(
    cols: &TrackColumns,
    schema: &TrackSchema,
    cells: &[Value],
) -> RowResult<LocationRecord> {
    let id = cells[cols.id].as_i64().ok_or_else(|| {
        invalid(&schema.id_column, format!("expected an integer id, got {}", cells[cols.id].kind()))
    })?;

    let timestamp = cocoa_value_to_datetime(&cells[cols.timestamp])
        .map_err(|e| (schema.timestamp_column.clone(), e))?
        .ok_or_else(|| {
            (
                schema.timestamp_column.clone(),
                ParseError::InvalidTimestamp("value is null".to_string()),
            )
        })?;

    Ok(LocationRecord {
        id,
        timestamp,
        latitude: coordinate(&cells[cols.latitude]),
        longitude: coordinate(&cells[cols.longitude]),
        horizontal_accuracy: cols.horizontal_accuracy.and_then(|i| cells[i].as_f64()),
        vertical_accuracy: cols.vertical_accuracy.and_then(|i| cells[i].as_f64()),
        speed: cols.speed.and_then(|i| cells[i].as_f64()),
    })
}

fn coordinate(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn invalid(column: &str, reason: String) -> (String, ParseError) {
    (
        column.to_string(),
        ParseError::InvalidValue {
            column: column.to_string(),
            reason,
        },
    )
}

/// Normalize a visit table.
///
/// All four timestamp columns must exist. `NULL` timestamps stay `NULL`
/// (an ongoing visit has no exit date); any other unconvertible value
/// rejects that visit only.
pub fn normalize_visits(raw: RawTable, schema: &VisitSchema) -> ParseResult<VisitLog> {
    let time_cols: Vec<usize> = schema
        .timestamp_columns()
        .iter()
        .map(|c| require(&raw, c))
        .collect::<ParseResult<_>>()?;
    let lat_col = optional(&raw, Some(schema.latitude_column.as_str()));
    let lon_col = optional(&raw, Some(schema.longitude_column.as_str()));

    let RawTable {
        name,
        mut columns,
        rows: raw_rows,
    } = raw;

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut rejected = Vec::new();

    'rows: for (i, mut cells) in raw_rows.into_iter().enumerate() {
        let mut dates: [Option<OffsetDateTime>; 4] = [None; 4];

        for (slot, (&idx, column)) in time_cols
            .iter()
            .zip(schema.timestamp_columns())
            .enumerate()
        {
            match cocoa_value_to_datetime(&cells[idx]) {
                Ok(ts) => dates[slot] = ts,
                Err(error) => {
                    warn!("Skipping row {} of {}: {}", i, name, error);
                    rejected.push(RowRejection {
                        row: i,
                        column: column.to_string(),
                        error,
                    });
                    continue 'rows;
                }
            }
        }

        for (&idx, ts) in time_cols.iter().zip(dates) {
            if let Some(ts) = ts {
                cells[idx] = Value::Timestamp(ts);
            }
        }

        let [detection_date, entry_date, exit_date, location_date] = dates;
        let record = VisitRecord {
            detection_date,
            entry_date,
            exit_date,
            location_date,
            latitude: lat_col.and_then(|c| cells[c].as_f64()),
            longitude: lon_col.and_then(|c| cells[c].as_f64()),
        };
        rows.push(Row { record, cells });
    }

    schema.renames.apply(&mut columns);
    Ok(VisitLog::from_parts(name, columns, rows, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrail_types::epoch::COCOA_EPOCH_OFFSET;
    use time::macros::datetime;

    fn track_table(rows: Vec<Vec<Value>>) -> RawTable {
        let mut raw = RawTable::new(
            "ZRTCLLOCATIONMO",
            [
                "Z_PK",
                "ZTIMESTAMP",
                "ZLATITUDE",
                "ZLONGITUDE",
                "ZHORIZONTALACCURACY",
                "ZSPEED",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        raw.rows = rows;
        raw
    }

    fn fix(id: i64, ts: Value, lat: f64, lon: f64) -> Vec<Value> {
        vec![
            Value::Integer(id),
            ts,
            Value::Real(lat),
            Value::Real(lon),
            Value::Real(5.0),
            Value::Real(-1.0),
        ]
    }

    #[test]
    fn test_track_appends_time_and_renames() {
        let raw = track_table(vec![fix(7, Value::Integer(0), -33.86, 151.2)]);
        let log = normalize_track(raw, &TrackSchema::default()).unwrap();

        assert_eq!(
            log.columns(),
            [
                "Z_PK",
                "ZTIMESTAMP",
                "LATITUDE",
                "LONGITUDE",
                "HORIZONTALACCURACY",
                "SPEED",
                "dateTime"
            ]
        );
        let row = &log.rows()[0];
        assert_eq!(row.record.id, 7);
        assert_eq!(row.record.timestamp, datetime!(2001-01-01 0:00 UTC));
        assert_eq!(row.record.horizontal_accuracy, Some(5.0));
        assert_eq!(row.record.vertical_accuracy, None);
        assert_eq!(row.record.speed, Some(-1.0));
        // Raw Cocoa value is kept, absolute time is appended.
        assert_eq!(row.cells[1], Value::Integer(0));
        assert_eq!(row.cells[6], Value::Timestamp(datetime!(2001-01-01 0:00 UTC)));
    }

    #[test]
    fn test_bad_timestamp_rejects_only_that_row() {
        let raw = track_table(vec![
            fix(1, Value::Real(600_000_000.0), 10.0, 20.0),
            fix(2, Value::Text("garbage".into()), 10.0, 20.0),
            fix(3, Value::Null, 10.0, 20.0),
            fix(4, Value::Real(600_000_060.0), 10.5, 20.5),
        ]);
        let log = normalize_track(raw, &TrackSchema::default()).unwrap();

        let ids: Vec<i64> = log.records().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(log.rejected().len(), 2);
        assert_eq!(log.rejected()[0].row, 1);
        assert_eq!(log.rejected()[0].column, "ZTIMESTAMP");
        assert!(matches!(
            log.rejected()[1].error,
            ParseError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn test_unusual_coordinates_keep_their_row() {
        let mut missing = fix(3, Value::Integer(3), 0.0, 0.0);
        missing[2] = Value::Null;
        missing[3] = Value::Text("n/a".into());
        let raw = track_table(vec![
            fix(1, Value::Integer(1), 91.0, 0.0),
            fix(2, Value::Integer(2), 0.0, -180.0),
            missing,
        ]);
        let log = normalize_track(raw, &TrackSchema::default()).unwrap();

        assert_eq!(log.len(), 3);
        assert!(log.rejected().is_empty());
        let records: Vec<&LocationRecord> = log.records().collect();
        assert_eq!(records[0].latitude, Some(91.0));
        assert_eq!(records[1].longitude, Some(-180.0));
        assert_eq!(records[2].latitude, None);
        assert_eq!(records[2].longitude, None);
        assert_eq!(log.rows()[2].cells[2], Value::Null);
    }

    #[test]
    fn test_missing_required_column_fails_table() {
        let mut raw = RawTable::new("ZRTCLLOCATIONMO", vec!["Z_PK".into(), "ZLATITUDE".into()]);
        raw.rows.push(vec![Value::Integer(1), Value::Real(1.0)]);

        let err = normalize_track(raw, &TrackSchema::default()).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingColumn("ZRTCLLOCATIONMO.ZTIMESTAMP".to_string())
        );
    }

    #[test]
    fn test_normalizing_twice_keeps_columns_stable() {
        let raw = track_table(vec![fix(1, Value::Integer(10), 1.0, 2.0)]);
        let schema = TrackSchema::default();
        let once = normalize_track(raw, &schema).unwrap();

        // Feed the normalized output back in with source names restored.
        let mut again = RawTable::new("ZRTCLLOCATIONMO", once.columns().to_vec());
        again.rows = once.rows().iter().map(|r| r.cells.clone()).collect();
        let mut schema_out = schema.clone();
        schema_out.latitude_column = "LATITUDE".into();
        schema_out.longitude_column = "LONGITUDE".into();
        let twice = normalize_track(again, &schema_out).unwrap();

        assert_eq!(twice.columns(), once.columns());
        assert_eq!(twice.rows()[0].cells, once.rows()[0].cells);
    }

    fn visit_table(rows: Vec<Vec<Value>>) -> RawTable {
        let mut raw = RawTable::new(
            "ZRTVISITMO",
            [
                "Z_PK",
                "ZDETECTIONDATE",
                "ZENTRYDATE",
                "ZEXITDATE",
                "ZLOCATIONDATE",
                "ZLOCATIONLATITUDE",
                "ZLOCATIONLONGITUDE",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        raw.rows = rows;
        raw
    }

    #[test]
    fn test_visit_converts_four_columns_independently() {
        let day = 86_400;
        let raw = visit_table(vec![vec![
            Value::Integer(1),
            Value::Integer(day),
            Value::Integer(2 * day),
            Value::Null,
            Value::Real(3.0 * day as f64),
            Value::Real(51.5),
            Value::Real(-0.12),
        ]]);
        let log = normalize_visits(raw, &VisitSchema::default()).unwrap();

        assert_eq!(log.columns()[5], "LATITUDE");
        assert_eq!(log.columns()[6], "LONGITUDE");

        let visit = &log.rows()[0].record;
        assert_eq!(visit.detection_date, Some(datetime!(2001-01-02 0:00 UTC)));
        assert_eq!(visit.entry_date, Some(datetime!(2001-01-03 0:00 UTC)));
        assert_eq!(visit.exit_date, None);
        assert_eq!(visit.location_date, Some(datetime!(2001-01-04 0:00 UTC)));
        assert_eq!(visit.latitude, Some(51.5));

        let cells = &log.rows()[0].cells;
        assert_eq!(
            cells[1],
            Value::Timestamp(
                time::OffsetDateTime::from_unix_timestamp(COCOA_EPOCH_OFFSET + day).unwrap()
            )
        );
        assert_eq!(cells[3], Value::Null);
    }

    #[test]
    fn test_visit_with_bad_date_is_rejected_alone() {
        let raw = visit_table(vec![
            vec![
                Value::Integer(1),
                Value::Blob(vec![1, 2]),
                Value::Integer(0),
                Value::Integer(0),
                Value::Integer(0),
                Value::Null,
                Value::Null,
            ],
            vec![
                Value::Integer(2),
                Value::Integer(0),
                Value::Integer(0),
                Value::Integer(0),
                Value::Integer(0),
                Value::Null,
                Value::Null,
            ],
        ]);
        let log = normalize_visits(raw, &VisitSchema::default()).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.rejected()[0].column, "ZDETECTIONDATE");
        assert_eq!(log.rows()[0].cells[0], Value::Integer(2));
    }
}

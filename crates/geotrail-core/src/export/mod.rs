//! Writing normalized record sets to disk.
//!
//! Both exporters for a track read the same [`TrackLog`], so the CSV data
//! rows and the KML placemarks always describe the same fixes in the
//! same order.

mod kml;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use geotrail_types::{RecordSet, TrackLog, TrackSchema, VisitLog, VisitSchema};
use tracing::info;

use crate::error::Result;

pub use kml::{write_kml, xml_escape};

/// Write a record set as CSV: one header line, then one line per row.
///
/// Cells are rendered with their `Display` form, so `NULL` becomes an
/// empty field and converted times use `YYYY/MM/DD HH:MM:SS`.
pub fn write_csv<R, W: Write>(set: &RecordSet<R>, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(set.columns())?;
    for row in set.rows() {
        csv.write_record(row.cells.iter().map(|cell| cell.to_string()))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the track CSV and KML into `output_dir`, replacing earlier files.
///
/// Returns the paths written, CSV first.
pub fn export_track(log: &TrackLog, schema: &TrackSchema, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let csv_path = output_dir.join(&schema.csv_file);
    write_csv(log, BufWriter::new(File::create(&csv_path)?))?;
    info!("Wrote {} rows to {}", log.len(), csv_path.display());

    let kml_path = output_dir.join(&schema.kml_file);
    let name = Path::new(&schema.kml_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(schema.table.as_str());
    write_kml(log, name, BufWriter::new(File::create(&kml_path)?))?;
    info!("Wrote {} placemarks to {}", log.len(), kml_path.display());

    Ok(vec![csv_path, kml_path])
}

/// Write the visit CSV into `output_dir`.
pub fn export_visits(log: &VisitLog, schema: &VisitSchema, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(&schema.csv_file);
    write_csv(log, BufWriter::new(File::create(&path)?))?;
    info!("Wrote {} visits to {}", log.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrail_types::{LocationRecord, Row, Value};
    use tempfile::TempDir;
    use time::macros::datetime;

    fn sample_log() -> TrackLog {
        let ts = datetime!(2019-07-04 12:00:00 UTC);
        let rows = vec![
            Row {
                record: LocationRecord {
                    id: 1,
                    timestamp: ts,
                    latitude: Some(40.0),
                    longitude: Some(-74.0),
                    horizontal_accuracy: Some(10.0),
                    vertical_accuracy: None,
                    speed: None,
                },
                cells: vec![
                    Value::Integer(1),
                    Value::Text("a, \"quoted\" note".into()),
                    Value::Null,
                    Value::Timestamp(ts),
                ],
            },
        ];
        TrackLog::from_parts(
            "ZRTCLLOCATIONMO",
            vec!["Z_PK".into(), "ZNOTE".into(), "SPEED".into(), "dateTime".into()],
            rows,
            Vec::new(),
        )
    }

    #[test]
    fn test_csv_header_and_escaping() {
        let mut buf = Vec::new();
        write_csv(&sample_log(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Z_PK,ZNOTE,SPEED,dateTime");
        assert_eq!(lines[1], "1,\"a, \"\"quoted\"\" note\",,2019/07/04 12:00:00");
    }

    #[test]
    fn test_export_track_overwrites_existing_files() {
        let dir = TempDir::new().unwrap();
        let schema = TrackSchema::default();
        std::fs::write(dir.path().join("trackLog.csv"), "stale\nstale\nstale\n").unwrap();

        let written = export_track(&sample_log(), &schema, dir.path()).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join("trackLog.csv"), dir.path().join("routined.kml")]
        );

        let csv = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(csv.lines().count(), 2);
        let kml = std::fs::read_to_string(&written[1]).unwrap();
        assert!(kml.contains("<name>routined</name>"));
        assert!(kml.contains("<coordinates>-74,40</coordinates>"));
    }
}

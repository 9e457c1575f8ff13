//! KML rendering of a track log.
//!
//! One `Placemark` per fix, named by the row id, with the fix time as the
//! description and a `Point` at `longitude,latitude`. No altitude is
//! written, so viewers clamp the points to the ground. A fix without a
//! usable coordinate pair still gets its placemark, just without a `Point`.

use std::io::{self, Write};

use geotrail_types::TrackLog;
use geotrail_types::epoch::format_timestamp;

const KML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
<Document>
"#;

const KML_FOOTER: &str = "</Document>\n</kml>\n";

/// Write `log` as a KML document named `name`.
pub fn write_kml<W: Write>(log: &TrackLog, name: &str, mut writer: W) -> io::Result<()> {
    writer.write_all(KML_HEADER.as_bytes())?;
    writeln!(writer, "  <name>{}</name>", xml_escape(name))?;

    for record in log.records() {
        writeln!(writer, "  <Placemark>")?;
        writeln!(writer, "    <name>{}</name>", record.id)?;
        writeln!(
            writer,
            "    <description>{}</description>",
            format_timestamp(record.timestamp)
        )?;
        if let (Some(lon), Some(lat)) = (record.longitude, record.latitude) {
            writeln!(
                writer,
                "    <Point><coordinates>{},{}</coordinates></Point>",
                lon, lat
            )?;
        }
        writeln!(writer, "  </Placemark>")?;
    }

    writer.write_all(KML_FOOTER.as_bytes())?;
    writer.flush()
}

/// Escape the five XML special characters.
#[must_use]
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

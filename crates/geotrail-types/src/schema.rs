//! Schema descriptors for the embedded databases.
//!
//! A [`SchemaDescriptor`] says which archive entries to look for, which
//! tables to query in each, which columns carry time and position, how
//! columns are renamed, and where exports go. [`SchemaDescriptor::default`]
//! describes the `routined` caches found in iOS full file system images;
//! a different platform version only needs a different descriptor.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};
use crate::mapping::ColumnMap;

/// Archive path of the `routined` location cache.
pub const ROUTINED_CACHE_PATH: &str =
    "/private/var/mobile/Library/Caches/com.apple.routined/Cache.sqlite";

/// Archive path of the `routined` local cache.
pub const LOCAL_CACHE_PATH: &str =
    "/private/var/mobile/Library/Caches/com.apple.routined/Local.sqlite";

/// Track table in the location cache (one row per location fix).
pub const TRACK_TABLE: &str = "ZRTCLLOCATIONMO";

/// Visit table in the location cache (one row per dwell).
pub const VISIT_TABLE: &str = "ZRTVISITMO";

/// Name of the column appended to track exports with the absolute time.
pub const DEFAULT_TIME_COLUMN: &str = "dateTime";

/// Every embedded database the extractor knows about.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SchemaDescriptor {
    /// Databases in processing order.
    pub databases: Vec<DatabaseSchema>,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self {
            databases: vec![DatabaseSchema::routined_cache(), DatabaseSchema::local_cache()],
        }
    }
}

impl SchemaDescriptor {
    /// Look up a database by display name.
    pub fn database(&self, name: &str) -> Option<&DatabaseSchema> {
        self.databases.iter().find(|db| db.name == name)
    }

    /// Check the descriptor for problems that would make a run ambiguous.
    pub fn validate(&self) -> ParseResult<()> {
        if self.databases.is_empty() {
            return Err(ParseError::InvalidSchema(
                "no databases are described".to_string(),
            ));
        }

        for (i, db) in self.databases.iter().enumerate() {
            if db.entry_path.trim().is_empty() {
                return Err(ParseError::InvalidSchema(format!(
                    "database '{}' has an empty entry path",
                    db.name
                )));
            }
            if self.databases[..i].iter().any(|other| other.name == db.name) {
                return Err(ParseError::InvalidSchema(format!(
                    "database name '{}' is used twice",
                    db.name
                )));
            }
            if let Some(track) = &db.track
                && !track.renames.is_idempotent()
            {
                return Err(ParseError::InvalidSchema(format!(
                    "track renames for '{}' rename an output column again",
                    db.name
                )));
            }
            if let Some(visits) = &db.visits
                && !visits.renames.is_idempotent()
            {
                return Err(ParseError::InvalidSchema(format!(
                    "visit renames for '{}' rename an output column again",
                    db.name
                )));
            }
        }

        Ok(())
    }
}

/// One embedded database and what to read from it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatabaseSchema {
    /// Display name used in log messages and reports.
    pub name: String,
    /// Full, case-sensitive path of the entry inside the archive.
    pub entry_path: String,
    /// Track table, if this database has one worth exporting.
    #[cfg_attr(feature = "serde", serde(default))]
    pub track: Option<TrackSchema>,
    /// Visit table, if this database has one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub visits: Option<VisitSchema>,
}

impl DatabaseSchema {
    /// The `routined` location cache with its track and visit tables.
    pub fn routined_cache() -> Self {
        Self {
            name: "routined cache".to_string(),
            entry_path: ROUTINED_CACHE_PATH.to_string(),
            track: Some(TrackSchema::default()),
            visits: Some(VisitSchema::default()),
        }
    }

    /// The `routined` local cache. No tables are exported from it yet.
    pub fn local_cache() -> Self {
        Self {
            name: "local cache".to_string(),
            entry_path: LOCAL_CACHE_PATH.to_string(),
            track: None,
            visits: None,
        }
    }

    /// Trailing path used to find the extracted file regardless of nesting.
    ///
    /// This is the parent directory name plus the file name, e.g.
    /// `com.apple.routined/Cache.sqlite`.
    pub fn file_suffix(&self) -> String {
        let parts: Vec<&str> = self
            .entry_path
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();
        let start = parts.len().saturating_sub(2);
        parts[start..].join("/")
    }

    /// Whether any table is read from this database.
    pub fn has_tables(&self) -> bool {
        self.track.is_some() || self.visits.is_some()
    }
}

/// Columns and outputs of a track table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSchema {
    pub table: String,
    /// Primary key, used as the placemark name.
    pub id_column: String,
    /// Cocoa timestamp of the fix.
    pub timestamp_column: String,
    pub latitude_column: String,
    pub longitude_column: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub horizontal_accuracy_column: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub vertical_accuracy_column: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub speed_column: Option<String>,
    /// Column appended to the output holding the absolute time.
    #[cfg_attr(feature = "serde", serde(default = "default_time_column"))]
    pub time_column: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub renames: ColumnMap,
    /// CSV output file name.
    #[cfg_attr(feature = "serde", serde(default = "default_track_csv"))]
    pub csv_file: String,
    /// KML output file name.
    #[cfg_attr(feature = "serde", serde(default = "default_track_kml"))]
    pub kml_file: String,
}

impl Default for TrackSchema {
    fn default() -> Self {
        Self {
            table: TRACK_TABLE.to_string(),
            id_column: "Z_PK".to_string(),
            timestamp_column: "ZTIMESTAMP".to_string(),
            latitude_column: "ZLATITUDE".to_string(),
            longitude_column: "ZLONGITUDE".to_string(),
            horizontal_accuracy_column: Some("ZHORIZONTALACCURACY".to_string()),
            vertical_accuracy_column: Some("ZVERTICALACCURACY".to_string()),
            speed_column: Some("ZSPEED".to_string()),
            time_column: default_time_column(),
            renames: ColumnMap::new()
                .rename("ZLATITUDE", "LATITUDE")
                .rename("ZLONGITUDE", "LONGITUDE")
                .rename("ZHORIZONTALACCURACY", "HORIZONTALACCURACY")
                .rename("ZVERTICALACCURACY", "VERTICALACCURACY")
                .rename("ZSPEED", "SPEED"),
            csv_file: default_track_csv(),
            kml_file: default_track_kml(),
        }
    }
}

/// Columns and outputs of a visit table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisitSchema {
    pub table: String,
    pub detection_date_column: String,
    pub entry_date_column: String,
    pub exit_date_column: String,
    pub location_date_column: String,
    pub latitude_column: String,
    pub longitude_column: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub renames: ColumnMap,
    /// CSV output file name, used when visit export is enabled.
    #[cfg_attr(feature = "serde", serde(default = "default_visit_csv"))]
    pub csv_file: String,
}

impl VisitSchema {
    /// The four Cocoa timestamp columns, in record field order.
    pub fn timestamp_columns(&self) -> [&str; 4] {
        [
            &self.detection_date_column,
            &self.entry_date_column,
            &self.exit_date_column,
            &self.location_date_column,
        ]
    }
}

impl Default for VisitSchema {
    fn default() -> Self {
        Self {
            table: VISIT_TABLE.to_string(),
            detection_date_column: "ZDETECTIONDATE".to_string(),
            entry_date_column: "ZENTRYDATE".to_string(),
            exit_date_column: "ZEXITDATE".to_string(),
            location_date_column: "ZLOCATIONDATE".to_string(),
            latitude_column: "ZLOCATIONLATITUDE".to_string(),
            longitude_column: "ZLOCATIONLONGITUDE".to_string(),
            renames: ColumnMap::new()
                .rename("ZLOCATIONLATITUDE", "LATITUDE")
                .rename("ZLOCATIONLONGITUDE", "LONGITUDE"),
            csv_file: default_visit_csv(),
        }
    }
}

fn default_time_column() -> String {
    DEFAULT_TIME_COLUMN.to_string()
}

fn default_track_csv() -> String {
    "trackLog.csv".to_string()
}

fn default_track_kml() -> String {
    "routined.kml".to_string()
}

fn default_visit_csv() -> String {
    "visitLog.csv".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_describes_both_caches() {
        let schema = SchemaDescriptor::default();
        assert_eq!(schema.databases.len(), 2);

        let routined = schema.database("routined cache").unwrap();
        assert_eq!(routined.entry_path, ROUTINED_CACHE_PATH);
        assert_eq!(routined.track.as_ref().unwrap().table, TRACK_TABLE);
        assert_eq!(routined.visits.as_ref().unwrap().table, VISIT_TABLE);

        let local = schema.database("local cache").unwrap();
        assert_eq!(local.entry_path, LOCAL_CACHE_PATH);
        assert!(!local.has_tables());
    }

    #[test]
    fn test_file_suffix() {
        let db = DatabaseSchema::routined_cache();
        assert_eq!(db.file_suffix(), "com.apple.routined/Cache.sqlite");

        let mut flat = DatabaseSchema::local_cache();
        flat.entry_path = "Local.sqlite".to_string();
        assert_eq!(flat.file_suffix(), "Local.sqlite");
    }

    #[test]
    fn test_default_validates() {
        SchemaDescriptor::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let schema = SchemaDescriptor {
            databases: vec![DatabaseSchema::local_cache(), DatabaseSchema::local_cache()],
        };
        assert!(matches!(
            schema.validate(),
            Err(ParseError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_validate_rejects_chained_renames() {
        let mut db = DatabaseSchema::routined_cache();
        if let Some(track) = db.track.as_mut() {
            track.renames = ColumnMap::new()
                .rename("ZLATITUDE", "LATITUDE")
                .rename("LATITUDE", "LAT");
        }
        let schema = SchemaDescriptor { databases: vec![db] };
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_visit_timestamp_columns_order() {
        let visits = VisitSchema::default();
        assert_eq!(
            visits.timestamp_columns(),
            ["ZDETECTIONDATE", "ZENTRYDATE", "ZEXITDATE", "ZLOCATIONDATE"]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_round_trip_of_default() {
        let schema = SchemaDescriptor::default();
        let text = toml::to_string_pretty(&schema).unwrap();
        let parsed: SchemaDescriptor = toml::from_str(&text).unwrap();
        assert_eq!(parsed, schema);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_fills_defaults() {
        let text = r#"
            [[databases]]
            name = "older cache"
            entry_path = "/private/var/root/Library/Caches/locationd/cache.sqlite"

            [databases.track]
            table = "CellLocation"
            id_column = "rowid"
            timestamp_column = "Timestamp"
            latitude_column = "Latitude"
            longitude_column = "Longitude"
        "#;
        let schema: SchemaDescriptor = toml::from_str(text).unwrap();
        let track = schema.databases[0].track.as_ref().unwrap();
        assert_eq!(track.time_column, "dateTime");
        assert_eq!(track.csv_file, "trackLog.csv");
        assert_eq!(track.kml_file, "routined.kml");
        assert!(track.renames.is_empty());
        assert!(schema.databases[0].visits.is_none());
    }
}

//! The extraction run: inspect, extract, read, normalize, export.
//!
//! Databases are processed strictly one after another. For each present
//! database the scratch directory is created, the entry extracted, the
//! tables read and exported, the connection closed and the directory
//! purged before the next database starts.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use geotrail_store::CacheDb;
use geotrail_types::{DatabaseSchema, SchemaDescriptor, TrackSchema, VisitSchema};

use crate::archive::Archive;
use crate::error::{Error, Result};
use crate::export;
use crate::normalize::{normalize_track, normalize_visits};
use crate::scratch::ScratchDir;

/// Default scratch directory, relative to the working directory.
pub const DEFAULT_SCRATCH_DIR: &str = "temp";

/// Where outputs and scratch files go, and what gets exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Directory receiving the CSV and KML files.
    pub output_dir: PathBuf,
    /// Ephemeral directory for one extracted database at a time.
    pub scratch_dir: PathBuf,
    /// Also write the visit table to CSV.
    pub export_visits: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            export_visits: false,
        }
    }
}

/// Runs the pipeline for one archive at a time.
#[derive(Debug, Clone)]
pub struct Extractor {
    schema: SchemaDescriptor,
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor after checking the schema descriptor is consistent.
    pub fn new(schema: SchemaDescriptor, options: ExtractOptions) -> Result<Self> {
        schema.validate()?;
        Ok(Self { schema, options })
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Process every described database found in the archive.
    ///
    /// The archive and the scratch location are validated before anything
    /// touches the filesystem, so an invalid input never leaves a scratch
    /// directory behind.
    pub fn run<P: AsRef<Path>>(&self, archive_path: P) -> Result<RunReport> {
        let mut archive = Archive::open(archive_path)?;
        self.check_scratch_location(archive.path())?;
        let inventory = archive.inventory(&self.schema);

        for entry in inventory.present() {
            info!("{} exists", entry.name);
        }
        for entry in inventory.missing() {
            warn!("{} not found", entry.name);
        }

        let mut report = RunReport {
            archive: archive.path().to_path_buf(),
            databases: Vec::with_capacity(self.schema.databases.len()),
        };

        for (db, status) in self.schema.databases.iter().zip(&inventory.databases) {
            let db_report = if status.present {
                self.process_database(&mut archive, db)?
            } else {
                DatabaseReport::missing(db)
            };
            report.databases.push(db_report);
        }

        info!(
            "Finished {}: {} file(s) written",
            report.archive.display(),
            report.outputs().count()
        );
        Ok(report)
    }

    /// Refuse a scratch directory whose purge would take the archive, an
    /// output or the working directory with it.
    fn check_scratch_location(&self, archive: &Path) -> Result<()> {
        let scratch = resolve(&self.options.scratch_dir)?;
        let cwd = std::env::current_dir()?;
        let guarded = [
            ("input archive", resolve(archive)?),
            ("output directory", resolve(&self.options.output_dir)?),
            ("working directory", resolve(&cwd)?),
        ];

        for (what, other) in guarded {
            if other.starts_with(&scratch) {
                return Err(Error::ScratchConflict {
                    scratch: self.options.scratch_dir.clone(),
                    what,
                    other,
                });
            }
        }
        Ok(())
    }

    fn process_database(&self, archive: &mut Archive, db: &DatabaseSchema) -> Result<DatabaseReport> {
        let scratch = ScratchDir::create(&self.options.scratch_dir)?;
        let db_path = scratch.extract(archive, &db.entry_path, &db.file_suffix())?;
        let cache = CacheDb::open_read_only(&db_path)?;

        let mut report = DatabaseReport {
            name: db.name.clone(),
            entry_path: db.entry_path.clone(),
            status: DatabaseStatus::Processed,
            tables: Vec::new(),
            survey: None,
            outputs: Vec::new(),
        };

        if db.has_tables() {
            if let Some(track) = &db.track {
                report.tables.push(self.read_track(&cache, track, &mut report.outputs)?);
            }
            if let Some(visits) = &db.visits {
                report.tables.push(self.read_visits(&cache, visits, &mut report.outputs)?);
            }
        } else {
            report.survey = survey_tables(&cache, &db.name);
        }

        cache.close()?;
        scratch.close()?;
        Ok(report)
    }

    fn read_track(
        &self,
        cache: &CacheDb,
        schema: &TrackSchema,
        outputs: &mut Vec<PathBuf>,
    ) -> Result<TableReport> {
        info!("Extracting tracklog");
        let raw = match read_or_skip(cache, &schema.table)? {
            Some(raw) => raw,
            None => return Ok(TableReport::new(&schema.table, TableOutcome::Missing)),
        };

        let log = match normalize_track(raw, schema) {
            Ok(log) => log,
            Err(e) => {
                warn!("Table {} does not match the expected layout, skipping: {}", schema.table, e);
                return Ok(TableReport::new(
                    &schema.table,
                    TableOutcome::SchemaMismatch {
                        reason: e.to_string(),
                    },
                ));
            }
        };
        info!("{} datapoints located.", log.len());
        log_rejections(&schema.table, log.rejected().len());

        outputs.extend(export::export_track(&log, schema, &self.options.output_dir)?);

        Ok(TableReport::new(
            &schema.table,
            TableOutcome::Extracted {
                rows: log.len(),
                rejected: log.rejected().len(),
            },
        ))
    }

    fn read_visits(
        &self,
        cache: &CacheDb,
        schema: &VisitSchema,
        outputs: &mut Vec<PathBuf>,
    ) -> Result<TableReport> {
        info!("Extracting visits");
        let raw = match read_or_skip(cache, &schema.table)? {
            Some(raw) => raw,
            None => return Ok(TableReport::new(&schema.table, TableOutcome::Missing)),
        };

        let log = match normalize_visits(raw, schema) {
            Ok(log) => log,
            Err(e) => {
                warn!("Table {} does not match the expected layout, skipping: {}", schema.table, e);
                return Ok(TableReport::new(
                    &schema.table,
                    TableOutcome::SchemaMismatch {
                        reason: e.to_string(),
                    },
                ));
            }
        };
        info!("{} visits located.", log.len());
        log_rejections(&schema.table, log.rejected().len());

        if self.options.export_visits {
            outputs.push(export::export_visits(&log, schema, &self.options.output_dir)?);
        } else {
            debug!("Visit export disabled, {} visits not written", log.len());
        }

        Ok(TableReport::new(
            &schema.table,
            TableOutcome::Extracted {
                rows: log.len(),
                rejected: log.rejected().len(),
            },
        ))
    }
}

/// Absolute, symlink-free form of `path`, which need not exist yet.
///
/// `.` and `..` are folded lexically, then the longest existing ancestor
/// is canonicalized and the remaining components appended.
fn resolve(path: &Path) -> Result<PathBuf> {
    let mut lexical = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    let mut existing = lexical.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name);
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize().unwrap_or_else(|_| existing.to_path_buf());
    resolved.extend(tail.iter().rev());
    Ok(resolved)
}

/// Read a whole table, turning an absent table into `None`.
fn read_or_skip(cache: &CacheDb, table: &str) -> Result<Option<geotrail_types::RawTable>> {
    match cache.read_table(table) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.is_missing_table() => {
            warn!("Table {} not located, skipping", table);
            Ok(None)
        }
        Err(e) => Err(Error::Store(e)),
    }
}

fn log_rejections(table: &str, rejected: usize) {
    if rejected > 0 {
        warn!("{} row(s) of {} rejected", rejected, table);
    }
}

/// List the tables of a database nothing is read from.
///
/// Purely diagnostic; a failure is logged and yields `None`.
fn survey_tables(cache: &CacheDb, name: &str) -> Option<Vec<String>> {
    match cache.list_tables() {
        Ok(tables) => {
            info!("{} holds {} table(s): {}", name, tables.len(), tables.join(", "));
            Some(tables)
        }
        Err(e) => {
            warn!("Could not list tables of {}: {}", name, e);
            None
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub archive: PathBuf,
    pub databases: Vec<DatabaseReport>,
}

impl RunReport {
    /// Every file written during the run, in write order.
    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.databases.iter().flat_map(|d| d.outputs.iter())
    }

    /// Databases that were absent from the archive.
    pub fn missing_databases(&self) -> impl Iterator<Item = &DatabaseReport> {
        self.databases
            .iter()
            .filter(|d| d.status == DatabaseStatus::Missing)
    }
}

/// What happened to one embedded database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseReport {
    pub name: String,
    pub entry_path: String,
    pub status: DatabaseStatus,
    pub tables: Vec<TableReport>,
    /// Tables found in a database nothing is read from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey: Option<Vec<String>>,
    pub outputs: Vec<PathBuf>,
}

impl DatabaseReport {
    fn missing(db: &DatabaseSchema) -> Self {
        Self {
            name: db.name.clone(),
            entry_path: db.entry_path.clone(),
            status: DatabaseStatus::Missing,
            tables: Vec::new(),
            survey: None,
            outputs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    /// Entry not present in the archive.
    Missing,
    /// Extracted and read.
    Processed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub outcome: TableOutcome,
}

impl TableReport {
    fn new(table: &str, outcome: TableOutcome) -> Self {
        Self {
            table: table.to_string(),
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    /// The table does not exist in the database.
    Missing,
    /// The table lacks a column needed to build records.
    SchemaMismatch { reason: String },
    /// Rows were read; `rejected` of them failed normalization.
    Extracted { rows: usize, rejected: usize },
}

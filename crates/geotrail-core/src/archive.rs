//! Archive inspection: is the input a zip, and which known entries does it hold?

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use zip::ZipArchive;

use geotrail_types::SchemaDescriptor;

use crate::error::{Error, Result};

/// An opened, read-only zip container.
pub struct Archive {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl std::fmt::Debug for Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("entries", &self.zip.len())
            .finish()
    }
}

impl Archive {
    /// Open a zip container.
    ///
    /// A path that does not exist yields [`Error::ArchiveNotFound`]; anything
    /// that exists but is not a zip yields [`Error::InvalidArchive`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::ArchiveNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(Error::InvalidArchive {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        let file = File::open(path).map_err(|e| Error::InvalidArchive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let zip = ZipArchive::new(file).map_err(|e| Error::InvalidArchive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Opened {} ({} entries)", path.display(), zip.len());

        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries, directories included.
    pub fn entry_count(&self) -> usize {
        self.zip.len()
    }

    /// Exact, case-sensitive membership test on the full entry name.
    pub fn contains(&self, entry_path: &str) -> bool {
        self.zip.file_names().any(|name| name == entry_path)
    }

    /// Which of the described databases are present.
    pub fn inventory(&self, schema: &SchemaDescriptor) -> Inventory {
        let databases = schema
            .databases
            .iter()
            .map(|db| EntryStatus {
                name: db.name.clone(),
                entry_path: db.entry_path.clone(),
                present: self.contains(&db.entry_path),
            })
            .collect();

        Inventory {
            archive: self.path.clone(),
            entry_count: self.entry_count(),
            databases,
        }
    }

    /// Copy one entry's bytes to `dest`, creating parent directories.
    ///
    /// Returns the number of bytes written.
    pub(crate) fn copy_entry_to(&mut self, entry_path: &str, dest: &Path) -> Result<u64> {
        let mut entry = self.zip.by_name(entry_path)?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut out = File::create(dest)?;
        let written = io::copy(&mut entry, &mut out)?;
        out.sync_all()?;

        info!("Extracted {} ({} bytes)", entry_path, written);
        Ok(written)
    }
}

/// Presence of each described database in one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub archive: PathBuf,
    pub entry_count: usize,
    pub databases: Vec<EntryStatus>,
}

impl Inventory {
    /// Databases found in the archive.
    pub fn present(&self) -> impl Iterator<Item = &EntryStatus> {
        self.databases.iter().filter(|d| d.present)
    }

    /// Databases absent from the archive.
    pub fn missing(&self) -> impl Iterator<Item = &EntryStatus> {
        self.databases.iter().filter(|d| !d.present)
    }
}

/// Whether one known entry is in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub name: String,
    pub entry_path: String,
    pub present: bool,
}

/// Open `path` and report which described databases it contains.
///
/// Nothing is extracted.
pub fn inspect<P: AsRef<Path>>(path: P, schema: &SchemaDescriptor) -> Result<Inventory> {
    Ok(Archive::open(path)?.inventory(schema))
}

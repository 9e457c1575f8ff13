//! Ephemeral scratch directory for extracted databases.
//!
//! A [`ScratchDir`] owns its directory for exactly one embedded database:
//! extract, read, close, purge. It is removed by [`ScratchDir::close`] on the
//! success path and by `Drop` on every other path.
//!
//! Every scratch directory carries a [`SCRATCH_MARKER`] file. A leftover
//! directory is only purged when it holds that marker or is empty, so a
//! mistyped `--scratch-dir` never wipes a directory geotrail did not make.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::archive::Archive;
use crate::error::{Error, Result};

/// Name of the file tagging a directory as a geotrail scratch directory.
pub const SCRATCH_MARKER: &str = ".geotrail-scratch";

/// A freshly created, empty scratch directory.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    removed: bool,
}

impl ScratchDir {
    /// Create an empty directory at `path`.
    ///
    /// A leftover directory from an aborted run is purged and created
    /// again. Only a failure on that second attempt is an error. Anything
    /// at `path` that is not an empty or marked directory is left alone and
    /// reported as [`Error::ForeignScratchDirectory`].
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        info!("Creating temporary folder {}", path.display());
        if let Err(first) = fs::create_dir(&path) {
            if path.exists() && !is_purgeable(&path) {
                return Err(Error::ForeignScratchDirectory(path));
            }
            warn!(
                "Temporary folder {} could not be created ({}), purging",
                path.display(),
                first
            );
            purge(&path);
            fs::create_dir_all(&path).map_err(|source| Error::ScratchDirectory {
                path: path.clone(),
                source,
            })?;
        }

        let scratch = Self {
            path,
            removed: false,
        };
        fs::write(scratch.path.join(SCRATCH_MARKER), b"").map_err(|source| {
            Error::ScratchDirectory {
                path: scratch.path.clone(),
                source,
            }
        })?;
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract one archive entry, keeping its internal directory layout.
    ///
    /// Returns the path of the extracted file as found by a suffix search
    /// for `suffix` (see [`ScratchDir::locate`]).
    pub fn extract(&self, archive: &mut Archive, entry_path: &str, suffix: &str) -> Result<PathBuf> {
        let relative = relative_entry_path(entry_path)?;
        let dest = self.path.join(&relative);
        archive.copy_entry_to(entry_path, &dest)?;

        let found = self.locate(suffix)?;
        info!("Using {} as the input file", found.display());
        Ok(found)
    }

    /// Find the first regular file whose trailing path components equal `suffix`.
    pub fn locate(&self, suffix: &str) -> Result<PathBuf> {
        let suffix_path = Path::new(suffix);

        WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .find(|p| p.ends_with(suffix_path))
            .ok_or_else(|| Error::ExtractedFileMissing {
                suffix: suffix.to_string(),
                dir: self.path.clone(),
            })
    }

    /// Remove the directory and everything in it.
    pub fn close(mut self) -> Result<()> {
        self.removed = true;
        debug!("Removing temporary folder {}", self.path.display());
        match fs::remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        debug!("Cleaning up temporary folder {}", self.path.display());
        if let Err(e) = fs::remove_dir_all(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(
                "Failed to remove temporary folder {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// An empty directory, or one tagged with [`SCRATCH_MARKER`].
fn is_purgeable(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    if path.join(SCRATCH_MARKER).is_file() {
        return true;
    }
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}

fn purge(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Purging {} failed: {}", path.display(), e);
    }
}

/// Turn an archive entry name into a path relative to the scratch root.
///
/// Leading `/` is dropped so absolute image paths nest under the scratch
/// directory. Entries that would climb out with `..` are refused.
pub(crate) fn relative_entry_path(entry_path: &str) -> Result<PathBuf> {
    let mut relative = PathBuf::new();

    for part in entry_path.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return Err(Error::UnsafeEntryPath(entry_path.to_string())),
            _ => {
                let component = Path::new(part);
                if !matches!(component.components().next(), Some(Component::Normal(_)))
                    || component.components().count() != 1
                {
                    return Err(Error::UnsafeEntryPath(entry_path.to_string()));
                }
                relative.push(part);
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(Error::UnsafeEntryPath(entry_path.to_string()));
    }
    Ok(relative)
}

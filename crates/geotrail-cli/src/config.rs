//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use geotrail_core::ExtractOptions;
use geotrail_types::SchemaDescriptor;

use crate::cli::ExtractArgs;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory receiving the CSV and KML files
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Scratch directory for extracted databases
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Write visitLog.csv on every run
    #[serde(default)]
    pub export_visits: bool,

    /// Schema descriptor file used instead of the built-in layout
    #[serde(default)]
    pub schema: Option<PathBuf>,
}

impl Config {
    /// Get the default config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geotrail")
            .join("config.toml")
    }

    /// Load config from `path`.
    ///
    /// A missing file gives the defaults silently; a file that cannot be
    /// read or parsed gives the defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        warn!("Failed to parse config {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read config {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Extraction options from flags, falling back to config, then defaults.
    pub fn extract_options(&self, args: &ExtractArgs) -> ExtractOptions {
        let defaults = ExtractOptions::default();
        ExtractOptions {
            output_dir: args
                .output_dir
                .clone()
                .or_else(|| self.output_dir.clone())
                .unwrap_or(defaults.output_dir),
            scratch_dir: args
                .scratch_dir
                .clone()
                .or_else(|| self.scratch_dir.clone())
                .unwrap_or(defaults.scratch_dir),
            export_visits: args.visits || self.export_visits,
        }
    }

    /// Schema descriptor path from flag, falling back to config.
    pub fn schema_path<'a>(&'a self, flag: Option<&'a Path>) -> Option<&'a Path> {
        flag.or(self.schema.as_deref())
    }
}

/// Load a schema descriptor, or the built-in one when no path is given.
pub fn load_schema(path: Option<&Path>) -> Result<SchemaDescriptor> {
    let Some(path) = path else {
        return Ok(SchemaDescriptor::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    let schema: SchemaDescriptor = toml::from_str(&content)
        .with_context(|| format!("Failed to parse schema: {}", path.display()))?;
    schema
        .validate()
        .with_context(|| format!("Invalid schema: {}", path.display()))?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputArgs, OutputFormat};
    use tempfile::TempDir;

    fn args() -> ExtractArgs {
        ExtractArgs {
            file: PathBuf::from("image.zip"),
            output_dir: None,
            scratch_dir: None,
            visits: false,
            schema: None,
            output: OutputArgs {
                format: OutputFormat::Text,
                compact: false,
            },
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "output_dir = [not toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "output_dir = \"/cases/42\"\nexport_visits = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.output_dir, Some(PathBuf::from("/cases/42")));
        assert_eq!(config.scratch_dir, None);
        assert!(config.export_visits);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            output_dir: Some(PathBuf::from("from-config")),
            scratch_dir: Some(PathBuf::from("scratch-config")),
            export_visits: false,
            schema: None,
        };
        let mut args = args();
        args.output_dir = Some(PathBuf::from("from-flag"));
        args.visits = true;

        let opts = config.extract_options(&args);
        assert_eq!(opts.output_dir, PathBuf::from("from-flag"));
        assert_eq!(opts.scratch_dir, PathBuf::from("scratch-config"));
        assert!(opts.export_visits);
    }

    #[test]
    fn test_defaults_without_flags_or_config() {
        let opts = Config::default().extract_options(&args());
        assert_eq!(opts, ExtractOptions::default());
    }

    #[test]
    fn test_schema_path_prefers_flag() {
        let config = Config {
            schema: Some(PathBuf::from("config.toml")),
            ..Config::default()
        };
        assert_eq!(
            config.schema_path(Some(Path::new("flag.toml"))),
            Some(Path::new("flag.toml"))
        );
        assert_eq!(config.schema_path(None), Some(Path::new("config.toml")));
    }

    #[test]
    fn test_load_schema_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        let schema = SchemaDescriptor::default();
        fs::write(&path, toml::to_string_pretty(&schema).unwrap()).unwrap();

        assert_eq!(load_schema(Some(path.as_path())).unwrap(), schema);
        assert_eq!(load_schema(None).unwrap(), schema);
    }

    #[test]
    fn test_load_schema_rejects_empty_descriptor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.toml");
        fs::write(&path, "databases = []\n").unwrap();

        let err = load_schema(Some(path.as_path())).unwrap_err();
        assert!(format!("{err:#}").contains("no databases"));
    }
}

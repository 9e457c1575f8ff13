//! Command-line interface for extracting iOS location history.
//!
//! The `geotrail` binary takes a zip image of an iOS file system (as
//! produced by GrayKey and similar tools), pulls the `routined` location
//! caches out of it and writes the location track as CSV and KML.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `extract` | Extract the track and write `trackLog.csv` and `routined.kml` |
//! | `inspect` | Report which caches an archive holds, without extracting |
//! | `schema` | Print the built-in schema descriptor as TOML |
//! | `config` | Show the configuration file path and contents |
//! | `completions` | Generate shell completions |
//!
//! # Output Formats
//!
//! `extract` and `inspect` print a summary as text (default) or JSON
//! (`--format json`). Logs go to stderr; `-v` enables debug logging and
//! `-q` limits logging to warnings. `RUST_LOG` is honoured otherwise.
//!
//! # Configuration
//!
//! The CLI reads `~/.config/geotrail/config.toml` (or platform equivalent,
//! or the file given with `--config`):
//!
//! - `output_dir`: Directory receiving the exports (default: current directory)
//! - `scratch_dir`: Scratch directory for extracted databases (default: `./temp`)
//! - `export_visits`: Also write `visitLog.csv`
//! - `schema`: Schema descriptor file replacing the built-in layout
//!
//! Command-line flags override the file.
//!
//! # Examples
//!
//! Extract into the current directory:
//! ```bash
//! geotrail extract --file extraction.zip
//! ```
//!
//! Extract visits too, into a case folder, with a JSON summary:
//! ```bash
//! geotrail extract -f extraction.zip --output-dir case-42 --visits --format json
//! ```
//!
//! Check an archive before extracting:
//! ```bash
//! geotrail inspect -f extraction.zip
//! ```

// This crate is primarily a binary CLI application.
// The entry point and command implementations are in main.rs.

// Re-export core dependencies for convenience
pub use geotrail_core;
pub use geotrail_types;

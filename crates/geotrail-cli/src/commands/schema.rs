//! Schema and config commands - show the built-in layout and the active configuration.

use std::path::Path;

use anyhow::{Context, Result};
use geotrail_types::SchemaDescriptor;

use crate::config::Config;
use crate::util::write_output;

/// Print the built-in schema descriptor as TOML.
///
/// The output is a valid `--schema` file and a starting point for other layouts.
pub fn cmd_schema(output: Option<&Path>) -> Result<()> {
    let content = toml::to_string_pretty(&SchemaDescriptor::default())
        .context("Failed to serialize schema")?;
    write_output(output, &content)
}

/// Show where the config file lives and what it resolves to.
pub fn cmd_config(path: &Path, config: &Config, output: Option<&Path>) -> Result<()> {
    let state = if path.exists() { "" } else { " (not found, using defaults)" };
    let body = toml::to_string_pretty(config).context("Failed to serialize config")?;
    write_output(output, &format!("# {}{}\n{}", path.display(), state, body))
}

//! Inspect command - list known caches in an archive without extracting.

use std::path::{Path, PathBuf};

use anyhow::Result;
use geotrail_core::inspect;

use crate::cli::{OutputArgs, OutputFormat};
use crate::config::{Config, load_schema};
use crate::format::{FormatOptions, format_inventory_text};
use crate::util::write_output;

/// Execute the inspect command.
pub fn cmd_inspect(
    file: &Path,
    schema: Option<PathBuf>,
    format: OutputArgs,
    config: &Config,
    opts: &FormatOptions,
    output: Option<&Path>,
) -> Result<()> {
    let schema = load_schema(config.schema_path(schema.as_deref()))?;
    let inventory = inspect(file, &schema)?;

    let opts = opts.with_compact(format.compact);
    let content = match format.format {
        OutputFormat::Text => format_inventory_text(&inventory, &opts),
        OutputFormat::Json => opts.as_json(&inventory)?,
    };
    write_output(output, &content)
}

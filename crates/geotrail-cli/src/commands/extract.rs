//! Extract command - run the pipeline on one archive.

use std::path::Path;

use anyhow::{Context, Result};
use geotrail_core::Extractor;
use tracing::info;

use crate::cli::{ExtractArgs, OutputFormat};
use crate::config::{Config, load_schema};
use crate::format::{FormatOptions, format_report_text};
use crate::util::write_output;

/// Execute the extract command.
pub fn cmd_extract(
    args: ExtractArgs,
    config: &Config,
    opts: &FormatOptions,
    output: Option<&Path>,
) -> Result<()> {
    let schema = load_schema(config.schema_path(args.schema.as_deref()))?;
    let options = config.extract_options(&args);
    info!(
        "Writing exports to {} (scratch: {})",
        options.output_dir.display(),
        options.scratch_dir.display()
    );

    let extractor = Extractor::new(schema, options).context("Invalid schema descriptor")?;
    let report = extractor.run(&args.file)?;

    let opts = opts.with_compact(args.output.compact);
    let content = match args.output.format {
        OutputFormat::Text => format_report_text(&report, &opts),
        OutputFormat::Json => opts.as_json(&report)?,
    };
    write_output(output, &content)
}

use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;
mod util;

use cli::{Cli, Commands};
use commands::{cmd_config, cmd_extract, cmd_inspect, cmd_schema};
use config::Config;
use format::FormatOptions;

fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "geotrail", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so JSON summaries on stdout stay parseable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::path);
    let config = Config::load_from(&config_path);
    let opts = FormatOptions::new(cli.no_color);
    let output = cli.output.as_deref();

    match cli.command {
        Commands::Extract(args) => cmd_extract(args, &config, &opts, output),
        Commands::Inspect {
            file,
            schema,
            output: format,
        } => cmd_inspect(&file, schema, format, &config, &opts, output),
        Commands::Schema => cmd_schema(output),
        Commands::Config => cmd_config(&config_path, &config, output),
        Commands::Completions { .. } => Ok(()),
    }
}

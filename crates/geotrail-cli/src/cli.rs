//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for command summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Compact JSON (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}

/// Arguments of the `extract` command
#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Zip image of the device file system
    #[arg(short, long, value_name = "ZIP")]
    pub file: PathBuf,

    /// Directory receiving trackLog.csv and routined.kml (overrides config)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Scratch directory for extracted databases, removed after use (overrides config)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Also write the visit table to visitLog.csv
    #[arg(long)]
    pub visits: bool,

    /// Schema descriptor in TOML, replacing the built-in routined layout
    #[arg(long, value_name = "TOML")]
    pub schema: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
#[command(name = "geotrail")]
#[command(
    author,
    version,
    about = "Extract iOS routined location history from forensic zip images",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the command summary to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the location history and write CSV and KML files
    Extract(ExtractArgs),

    /// Report which location caches an archive contains, without extracting
    Inspect {
        /// Zip image of the device file system
        #[arg(short, long, value_name = "ZIP")]
        file: PathBuf,

        /// Schema descriptor in TOML, replacing the built-in routined layout
        #[arg(long, value_name = "TOML")]
        schema: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the built-in schema descriptor as TOML
    Schema,

    /// Show the configuration file path and contents
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_requires_file() {
        assert!(Cli::try_parse_from(["geotrail", "extract"]).is_err());
    }

    #[test]
    fn test_extract_flags() {
        let cli = Cli::try_parse_from([
            "geotrail",
            "-v",
            "extract",
            "-f",
            "image.zip",
            "--output-dir",
            "out",
            "--visits",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.file, PathBuf::from("image.zip"));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.scratch_dir, None);
        assert!(args.visits);
        assert_eq!(args.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["geotrail", "-v", "-q", "schema"]).is_err());
    }
}

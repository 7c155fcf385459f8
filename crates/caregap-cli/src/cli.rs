//! CLI argument definitions for the caregap toolkit.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use caregap_engine::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_FILES};

#[derive(Parser)]
#[command(
    name = "caregap",
    version,
    about = "Care-gap roster tooling - merge portal exports, sort patient PDFs",
    long_about = "Reconcile insurer care-gap exports into the master roster and\n\
                  sort patient PDF batches into per-insurer folders.\n\
                  Field mappings and the gaps taxonomy live in a local store\n\
                  managed through the config and taxonomy subcommands."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Configuration store directory.
    #[arg(
        long = "store",
        value_name = "DIR",
        default_value = ".caregap",
        global = true
    )]
    pub store: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge care-gap exports into the master roster spreadsheet.
    Merge(MergeArgs),

    /// Sort a batch of patient PDFs into per-insurer folders.
    Sort(SortArgs),

    /// Manage field-mapping configurations.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage the gaps taxonomy.
    Taxonomy {
        #[command(subcommand)]
        command: TaxonomyCommand,
    },
}

#[derive(Parser)]
pub struct MergeArgs {
    /// Master roster spreadsheet (.csv or .xlsx).
    #[arg(long = "master", value_name = "FILE")]
    pub master: PathBuf,

    /// Care-gap export paired with its mapping config, as PATH=CONFIG_ID.
    /// Repeat for each source.
    #[arg(long = "source", value_name = "PATH=CONFIG_ID", required = true)]
    pub sources: Vec<String>,

    /// Where to write the merged workbook.
    #[arg(long = "out", value_name = "FILE")]
    pub out: PathBuf,
}

#[derive(Parser)]
pub struct SortArgs {
    /// Master roster spreadsheet (.csv or .xlsx).
    #[arg(long = "master", value_name = "FILE")]
    pub master: PathBuf,

    /// Where to write the sorted archive (zip).
    #[arg(long = "out", value_name = "FILE")]
    pub out: PathBuf,

    /// Classification strategy.
    #[arg(long = "strategy", value_enum, default_value = "name")]
    pub strategy: StrategyArg,

    /// Reject batches larger than this many PDFs.
    #[arg(long = "max-files", value_name = "N", default_value_t = DEFAULT_MAX_FILES)]
    pub max_files: usize,

    /// Batch size for the member-id strategy.
    #[arg(long = "batch-size", value_name = "N", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// PDF files, or directories whose .pdf files are taken directly.
    #[arg(value_name = "PDF", required = true)]
    pub pdfs: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Add (or replace) a field-mapping config from a JSON file.
    Add {
        /// JSON file holding the mapping config.
        file: PathBuf,
        /// Store under this ID instead of one derived from the name.
        #[arg(long = "id")]
        id: Option<String>,
    },
    /// List stored mapping configs.
    List,
    /// Print one mapping config as JSON.
    Show { id: String },
    /// Delete a mapping config.
    Rm { id: String },
}

#[derive(Subcommand)]
pub enum TaxonomyCommand {
    /// Replace the gaps taxonomy from a tabular file (.csv or .xlsx).
    Set { file: PathBuf },
    /// Print the current taxonomy headers and synonym counts.
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Match roster names derived from PDF filenames.
    Name,
    /// Match a member-id token against any roster cell.
    MemberId,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

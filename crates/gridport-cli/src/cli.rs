//! CLI argument definitions for Gridport.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "gridport",
    version,
    about = "Gridport - Import vendor device exports through a mapping configuration",
    long_about = "Import vendor-exported device data (CSV, XLSX) into a typed record store.\n\n\
                  Sections are located and classified by header signature, rows are\n\
                  populated with tolerant coercion, and duplicate keys keep the first\n\
                  occurrence. Mapping configurations are authored as JSON and can be\n\
                  validated and auto-suggested from source headers."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Import source files into a record store.
    Import(ImportArgs),

    /// Validate a mapping configuration and report problems.
    Validate(ValidateArgs),

    /// Suggest column-to-field bindings for a source file.
    Suggest(SuggestArgs),

    /// List the record types an import can populate.
    Types,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Path to the mapping configuration JSON.
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Source files to import (.csv, .xlsx, .xlsm, .xls).
    #[arg(value_name = "SOURCE", required = true)]
    pub sources: Vec<PathBuf>,

    /// Write the populated store as JSON to this path.
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Fail the import when a required header is never observed.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Import only these worksheets (repeatable; workbook sources only).
    #[arg(long = "worksheet", value_name = "NAME")]
    pub worksheets: Vec<String>,

    /// Append engine diagnostics to this file.
    #[arg(long = "diagnostics", value_name = "PATH")]
    pub diagnostics: Option<PathBuf>,

    /// Include row-level detail in the diagnostics.
    #[arg(long = "verbose-diagnostics")]
    pub verbose_diagnostics: bool,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Path to the mapping configuration JSON.
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,
}

#[derive(Parser)]
pub struct SuggestArgs {
    /// Source file whose header row should be matched.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Record type to suggest bindings for.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Minimum score for a suggestion to be proposed.
    #[arg(long = "min-score", value_name = "SCORE", default_value_t = 0.5)]
    pub min_score: f64,

    /// Read the header row from this worksheet (workbook sources only).
    #[arg(long = "worksheet", value_name = "NAME")]
    pub worksheets: Vec<String>,
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

//! CLI argument definitions for the `qmap` runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "qmap",
    version,
    about = "Object mapper - synthesize and run transformations between object shapes",
    long_about = "Synthesize, inspect, and run transformations between registered object shapes.\n\n\
                  Ships with sample Person and Book shapes; mapping input can be supplied as JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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
    /// Map sample or JSON input through one of the sample pairs.
    Map(MapArgs),

    /// Print the synthesized transformation for a sample pair.
    Inspect(InspectArgs),

    /// List registered shapes.
    Types,
}

#[derive(Parser)]
pub struct MapArgs {
    /// Which sample pair to run.
    #[arg(value_enum)]
    pub pair: SamplePairArg,

    /// JSON file holding an array of source objects (default: built-in samples).
    #[arg(long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Print mapped objects as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Which sample pair to inspect.
    #[arg(value_enum)]
    pub pair: SamplePairArg,

    /// Show the self-contained projection handed to query providers.
    #[arg(long = "projection", conflicts_with = "table")]
    pub projection: bool,

    /// Summarize constructor arguments and member bindings as a table.
    #[arg(long = "table")]
    pub table: bool,
}

/// Sample type pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SamplePairArg {
    /// Person -> PersonDto
    People,
    /// Book -> ReadBookResponse
    Books,
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

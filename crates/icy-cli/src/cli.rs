//! CLI argument definitions for the `icy` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use icy_scaler::ColumnOverrides;

#[derive(Parser)]
#[command(
    name = "icy",
    version,
    about = "Encode and scale mixed tabular data",
    long_about = "Encode categorical columns as one-hot blocks and rescale continuous\n\
                  columns with a shifted Box-Cox transform followed by min-max scaling."
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
    /// Show which columns would be treated as categorical or continuous.
    Columns(ColumnsArgs),

    /// Fit the pipeline and print the fitted state.
    Fit(FitArgs),

    /// Fit the pipeline and write the transformed matrix as CSV.
    Transform(TransformArgs),
}

#[derive(Args)]
pub struct ColumnsArgs {
    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,
}

/// Column selection shared by `fit` and `transform`.
#[derive(Args)]
pub struct ColumnArgs {
    /// Comma-separated categorical columns (default: string columns).
    #[arg(long = "categorical", value_name = "COLS", value_delimiter = ',')]
    pub categorical: Option<Vec<String>>,

    /// Comma-separated continuous columns (default: all other columns).
    #[arg(long = "continuous", value_name = "COLS", value_delimiter = ',')]
    pub continuous: Option<Vec<String>>,

    /// Select no categorical columns.
    #[arg(long = "no-categorical", conflicts_with = "categorical")]
    pub no_categorical: bool,

    /// Select no continuous columns.
    #[arg(long = "no-continuous", conflicts_with = "continuous")]
    pub no_continuous: bool,

    /// Lower bound of the scaled range.
    #[arg(long = "range-min", value_name = "MIN", default_value_t = 0.0)]
    pub range_min: f64,

    /// Upper bound of the scaled range.
    #[arg(long = "range-max", value_name = "MAX", default_value_t = 1.0)]
    pub range_max: f64,
}

impl ColumnArgs {
    /// Column overrides described by the flags.
    pub fn overrides(&self) -> ColumnOverrides {
        ColumnOverrides {
            categorical: explicit_list(self.categorical.as_ref(), self.no_categorical),
            continuous: explicit_list(self.continuous.as_ref(), self.no_continuous),
        }
    }
}

fn explicit_list(columns: Option<&Vec<String>>, none: bool) -> Option<Vec<String>> {
    if none {
        return Some(Vec::new());
    }
    columns.map(|columns| {
        columns
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    })
}

#[derive(Args)]
pub struct FitArgs {
    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub columns: ColumnArgs,
}

#[derive(Args)]
pub struct TransformArgs {
    /// CSV file to transform.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Fit on this CSV instead of the input.
    #[arg(long = "fit-data", value_name = "CSV")]
    pub fit_data: Option<PathBuf>,

    #[command(flatten)]
    pub columns: ColumnArgs,

    /// Write the result here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
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

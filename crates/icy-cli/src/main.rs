//! The `icy` command-line tool.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use icy_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use icy_cli::commands::{run_columns, run_fit, run_transform};
use icy_cli::logging::{LogConfig, LogFormat, init_logging};
use icy_cli::summary::{print_columns, print_fit_summary, print_transform_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    // With RUST_LOG in charge the subscriber does the filtering.
    let level_filter = if log_config.use_env_filter && std::env::var_os("RUST_LOG").is_some() {
        LevelFilter::TRACE
    } else {
        log_config.level_filter
    };
    let result = match &cli.command {
        Command::Columns(args) => run_columns(args, level_filter).map(|selection| {
            print_columns(&selection);
        }),
        Command::Fit(args) => run_fit(args, level_filter).map(|fitted| {
            print_fit_summary(&fitted);
        }),
        Command::Transform(args) => run_transform(args, level_filter).map(|summary| {
            print_transform_summary(&summary);
        }),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
///
/// An explicit `--log-level` beats `-v`/`-q`, and either one disables the
/// `RUST_LOG` override. File output is timestamped and never colored.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let to_file = cli.log_file.is_some();
    let ansi = match cli.color.color {
        ColorChoice::Always => !to_file,
        ColorChoice::Never => false,
        ColorChoice::Auto => !to_file && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level_filter(level_filter)
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()))
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_timestamps(to_file)
        .with_ansi(ansi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["icy"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_log_level_beats_verbosity() {
        let cli = parse(&["-vv", "--log-level", "error", "columns", "in.csv"]);
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::ERROR);
        assert!(!config.use_env_filter);
    }

    #[test]
    fn test_defaults_defer_to_env() {
        let config = log_config_from_cli(&parse(&["columns", "in.csv"]));
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert!(config.use_env_filter);
        assert!(!config.with_timestamps);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_log_file_is_timestamped_without_color() {
        let cli = parse(&[
            "--log-file",
            "icy.log",
            "--color",
            "always",
            "--log-format",
            "json",
            "columns",
            "in.csv",
        ]);
        let config = log_config_from_cli(&cli);
        assert_eq!(config.log_file.as_deref(), Some(std::path::Path::new("icy.log")));
        assert!(config.with_timestamps);
        assert!(!config.with_ansi);
        assert_eq!(config.format, LogFormat::Json);
    }
}

//! Subcommand implementations.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::level_filters::LevelFilter;
use tracing::{Level, info, info_span};

use icy_scaler::{
    ColumnClassifier, ColumnSelection, FeatureMatrix, FittedIcyScaler, IcyScaler, ScalerConfig,
};

use crate::cli::{ColumnArgs, ColumnsArgs, FitArgs, TransformArgs};

/// Outcome of `icy transform`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSummary {
    pub rows: usize,
    pub columns: usize,
    pub sparse: bool,
    /// `None` when the matrix went to stdout.
    pub output: Option<PathBuf>,
}

/// Read a CSV file with a header row into a DataFrame.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("open CSV {}", path.display()))?
        .finish()
        .with_context(|| format!("parse CSV {}", path.display()))?;
    Ok(df)
}

/// Scaler configuration for the given log level and range flags.
pub fn scaler_config(level_filter: LevelFilter, columns: &ColumnArgs) -> Result<ScalerConfig> {
    ScalerConfig::default()
        .with_verbose(level_filter)
        .with_feature_range(columns.range_min, columns.range_max)
        .context("invalid scaling range")
}

pub fn run_columns(args: &ColumnsArgs, level_filter: LevelFilter) -> Result<ColumnSelection> {
    let df = read_frame(&args.input)?;
    let config = ScalerConfig::default().with_verbose(level_filter);
    Ok(ColumnClassifier::new(config).classify(&df))
}

pub fn run_fit(args: &FitArgs, level_filter: LevelFilter) -> Result<FittedIcyScaler> {
    let df = read_frame(&args.input)?;
    let config = scaler_config(level_filter, &args.columns)?;
    IcyScaler::with_config(config)
        .fit_with_columns(&df, &args.columns.overrides())
        .with_context(|| format!("fit {}", args.input.display()))
}

pub fn run_transform(args: &TransformArgs, level_filter: LevelFilter) -> Result<TransformSummary> {
    let span = info_span!("transform", input = %args.input.display());
    let _guard = span.enter();

    let config = scaler_config(level_filter, &args.columns)?;
    let df = read_frame(&args.input)?;
    let fit_path = args.fit_data.as_deref().unwrap_or(&args.input);
    let fitted = if fit_path == args.input {
        IcyScaler::with_config(config).fit_with_columns(&df, &args.columns.overrides())
    } else {
        let fit_df = read_frame(fit_path)?;
        IcyScaler::with_config(config).fit_with_columns(&fit_df, &args.columns.overrides())
    }
    .with_context(|| format!("fit {}", fit_path.display()))?;

    let matrix = fitted
        .transform(&df)
        .with_context(|| format!("transform {}", args.input.display()))?;
    let (rows, columns) = matrix.shape();
    let sparse = matrix.is_sparse();
    let names = fitted.feature_names();

    match &args.output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            write_matrix(file, &names, matrix)
                .with_context(|| format!("write {}", path.display()))?;
            if config.enabled(Level::INFO) {
                info!(path = %path.display(), rows, columns, "wrote transformed matrix");
            }
        }
        None => {
            let stdout = io::stdout();
            write_matrix(stdout.lock(), &names, matrix).context("write to stdout")?;
        }
    }

    Ok(TransformSummary {
        rows,
        columns,
        sparse,
        output: args.output.clone(),
    })
}

/// Write the matrix densely as CSV, with feature names as the header row.
pub fn write_matrix<W: Write>(writer: W, names: &[String], matrix: FeatureMatrix) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(names)?;
    let dense = matrix.into_dense();
    for row in dense.rows() {
        csv.write_record(row.iter().map(ToString::to_string))?;
    }
    csv.flush()?;
    Ok(())
}

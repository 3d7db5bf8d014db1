//! Partitioning of DataFrame columns into categorical and continuous sets.
//!
//! Auto-detection is type based: `String` columns are categorical and every
//! other dtype is continuous. Caller overrides are used verbatim, without
//! checking their dtype, but their names must exist in the frame.

use std::collections::BTreeSet;

use polars::prelude::{DataFrame, DataType};
use serde::{Deserialize, Serialize};
use tracing::{Level, info};

use crate::config::ScalerConfig;
use crate::error::{Result, ScalerError};

/// Resolved, disjoint column sets in frame order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    /// Columns encoded as categories.
    pub categorical: Vec<String>,
    /// Columns power-transformed and rescaled.
    pub continuous: Vec<String>,
}

impl ColumnSelection {
    /// Returns true when neither set has a column.
    pub fn is_empty(&self) -> bool {
        self.categorical.is_empty() && self.continuous.is_empty()
    }

    /// Total number of selected columns.
    pub fn len(&self) -> usize {
        self.categorical.len() + self.continuous.len()
    }
}

/// Optional caller-supplied column lists.
///
/// `None` resolves by default; `Some(vec![])` selects no column of that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOverrides {
    /// Explicit categorical columns.
    pub categorical: Option<Vec<String>>,
    /// Explicit continuous columns.
    pub continuous: Option<Vec<String>>,
}

impl ColumnOverrides {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the categorical list.
    #[must_use]
    pub fn with_categorical<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the continuous list.
    #[must_use]
    pub fn with_continuous<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.continuous = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if neither list was supplied.
    pub fn is_empty(&self) -> bool {
        self.categorical.is_none() && self.continuous.is_none()
    }
}

/// Returns true for dtypes classified as categorical.
pub fn is_categorical_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

/// Classifies columns and resolves overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnClassifier {
    config: ScalerConfig,
}

impl ColumnClassifier {
    /// Classifier emitting records according to `config.verbose`.
    pub fn new(config: ScalerConfig) -> Self {
        Self { config }
    }

    /// Split every column of the frame by dtype.
    pub fn classify(&self, df: &DataFrame) -> ColumnSelection {
        let selection = detect(df);
        self.report(&selection);
        selection
    }

    /// Resolve the column sets for `df`, honouring overrides.
    ///
    /// A supplied list is taken as is. A missing list is auto-detected, minus
    /// any name already claimed by the other list.
    pub fn resolve(&self, df: &DataFrame, overrides: &ColumnOverrides) -> Result<ColumnSelection> {
        if overrides.is_empty() {
            return Ok(self.classify(df));
        }
        validate_overrides(df, overrides)?;

        let detected = detect(df);
        let selection = match (&overrides.categorical, &overrides.continuous) {
            (Some(categorical), Some(continuous)) => ColumnSelection {
                categorical: categorical.clone(),
                continuous: continuous.clone(),
            },
            (Some(categorical), None) => ColumnSelection {
                categorical: categorical.clone(),
                continuous: without(&detected.continuous, categorical),
            },
            (None, Some(continuous)) => ColumnSelection {
                categorical: without(&detected.categorical, continuous),
                continuous: continuous.clone(),
            },
            (None, None) => detected,
        };
        self.report(&selection);
        Ok(selection)
    }

    fn report(&self, selection: &ColumnSelection) {
        if self.config.enabled(Level::INFO) {
            info!(
                categorical = selection.categorical.len(),
                continuous = selection.continuous.len(),
                "{} categorical columns found, {} continuous columns found",
                selection.categorical.len(),
                selection.continuous.len()
            );
        }
    }
}

fn detect(df: &DataFrame) -> ColumnSelection {
    let mut selection = ColumnSelection::default();
    for column in df.get_columns() {
        let name = column.name().to_string();
        if is_categorical_dtype(column.dtype()) {
            selection.categorical.push(name);
        } else {
            selection.continuous.push(name);
        }
    }
    selection
}

fn without(columns: &[String], claimed: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|name| !claimed.contains(name))
        .cloned()
        .collect()
}

fn validate_overrides(df: &DataFrame, overrides: &ColumnOverrides) -> Result<()> {
    let present: BTreeSet<&str> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let lists = [
        ("categorical", overrides.categorical.as_deref()),
        ("continuous", overrides.continuous.as_deref()),
    ];
    for (kind, columns) in lists {
        for name in columns.unwrap_or_default() {
            if !present.contains(name.as_str()) {
                return Err(ScalerError::configuration(format!(
                    "{kind} column '{name}' not found in DataFrame"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(ScalerError::configuration(format!(
                    "column '{name}' selected more than once"
                )));
            }
        }
    }
    Ok(())
}

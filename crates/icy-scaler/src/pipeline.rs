//! The composite IcyScaler pipeline.
//!
//! Categorical columns go through label encoding and one joint one-hot
//! encoder. Continuous columns go through the shifted Box-Cox transform and
//! then min-max scaling. The two blocks are concatenated as
//! `[categorical, continuous]`.
//!
//! Fitting is a separate state: [`IcyScaler::fit`] returns an immutable
//! [`FittedIcyScaler`] that remembers which columns it was fitted on, so a
//! later `transform` never re-detects column kinds from the new frame.

use ndarray::{Array2, ArrayView2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, info, info_span};

use crate::columns::{ColumnClassifier, ColumnOverrides, ColumnSelection};
use crate::config::ScalerConfig;
use crate::encoding::CategoricalEncoder;
use crate::error::{Result, ScalerError};
use crate::frame::{categorical_block, continuous_block};
use crate::matrix::{FeatureMatrix, hstack};
use crate::power::{BoxCoxScaler, FittedBoxCoxScaler};
use crate::scaling::{FittedMinMaxScaler, MinMaxScaler};

/// Unfitted pipeline.
///
/// # Example
///
/// ```
/// use icy_scaler::IcyScaler;
/// use polars::prelude::df;
///
/// let df = df!("city" => ["NYC", "LA", "NYC"], "price" => [10.0, 20.0, 15.0]).unwrap();
/// let out = IcyScaler::new().fit(&df).unwrap().transform(&df).unwrap();
/// assert_eq!(out.shape(), (3, 3));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct IcyScaler {
    config: ScalerConfig,
}

impl IcyScaler {
    /// Pipeline with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with the given configuration.
    pub fn with_config(config: ScalerConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    /// Fit on auto-detected columns.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedIcyScaler> {
        self.fit_with_columns(df, &ColumnOverrides::none())
    }

    /// Fit on the columns resolved from `overrides`.
    ///
    /// Either branch is skipped when its column set is empty.
    pub fn fit_with_columns(
        &self,
        df: &DataFrame,
        overrides: &ColumnOverrides,
    ) -> Result<FittedIcyScaler> {
        let span = info_span!("icy_scaler.fit", rows = df.height(), columns = df.width());
        let _guard = span.enter();

        if df.height() == 0 {
            return Err(ScalerError::empty("cannot fit on a DataFrame with zero rows"));
        }
        let columns = ColumnClassifier::new(self.config).resolve(df, overrides)?;
        if columns.is_empty() {
            return Err(ScalerError::empty("no categorical or continuous columns selected"));
        }

        let categorical = if columns.categorical.is_empty() {
            None
        } else {
            let block = categorical_block(df, &columns.categorical)?;
            Some(CategoricalEncoder::fit(&block)?)
        };

        let (box_cox, min_max) = if columns.continuous.is_empty() {
            (None, None)
        } else {
            let block = continuous_block(df, &columns.continuous)?;
            let box_cox = BoxCoxScaler::new()
                .with_feature_names(block.names.clone())
                .fit(block.data.view())?;
            let powered = box_cox.transform(block.data.view())?;
            let (min, max) = self.config.feature_range;
            let min_max = MinMaxScaler::new().with_range(min, max)?.fit(powered.view())?;
            (Some(box_cox), Some(min_max))
        };

        let fitted = FittedIcyScaler {
            config: self.config,
            columns,
            categorical,
            box_cox,
            min_max,
        };
        if self.config.enabled(Level::DEBUG) {
            for (column, lambda) in fitted.lambdas() {
                debug!(column, lambda, "fitted Box-Cox lambda");
            }
        }
        Ok(fitted)
    }

    /// Fit on auto-detected columns, then transform the same frame.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        self.fit(df)?.transform(df)
    }
}

/// Fitted pipeline state.
///
/// Immutable once built; `transform` takes `&self` and may be called from
/// several threads at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedIcyScaler {
    #[serde(skip)]
    config: ScalerConfig,
    columns: ColumnSelection,
    categorical: Option<CategoricalEncoder>,
    box_cox: Option<FittedBoxCoxScaler>,
    min_max: Option<FittedMinMaxScaler>,
}

impl FittedIcyScaler {
    /// Columns the pipeline was fitted on.
    pub fn columns(&self) -> &ColumnSelection {
        &self.columns
    }

    /// Fitted categorical encoder, if any categorical column was selected.
    pub fn categorical_encoder(&self) -> Option<&CategoricalEncoder> {
        self.categorical.as_ref()
    }

    /// Fitted Box-Cox stage, if any continuous column was selected.
    pub fn box_cox(&self) -> Option<&FittedBoxCoxScaler> {
        self.box_cox.as_ref()
    }

    /// Fitted min-max stage, if any continuous column was selected.
    pub fn min_max(&self) -> Option<&FittedMinMaxScaler> {
        self.min_max.as_ref()
    }

    /// `(column, λ)` for every continuous column, in fit order.
    pub fn lambdas(&self) -> Vec<(&str, f64)> {
        self.box_cox
            .as_ref()
            .map(|box_cox| {
                self.columns
                    .continuous
                    .iter()
                    .map(String::as_str)
                    .zip(box_cox.lambdas().iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// λ of one continuous column.
    pub fn lambda_for(&self, column: &str) -> Option<f64> {
        self.lambdas()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, lambda)| lambda)
    }

    /// Output column names: `column=value` for one-hot columns, the column
    /// name for continuous ones.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self
            .categorical
            .as_ref()
            .map(CategoricalEncoder::feature_names)
            .unwrap_or_default();
        names.extend(self.columns.continuous.iter().cloned());
        names
    }

    /// Output width of a full transform.
    pub fn n_features_out(&self) -> usize {
        self.categorical
            .as_ref()
            .map_or(0, CategoricalEncoder::n_features_out)
            + self.columns.continuous.len()
    }

    /// Transform using every fitted column.
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        self.transform_selection(df, &self.columns)
    }

    /// Transform a subset of the fitted columns.
    ///
    /// A missing list means all fitted columns of that kind. Every name in a
    /// supplied list must have been fitted in the same role.
    pub fn transform_with_columns(
        &self,
        df: &DataFrame,
        overrides: &ColumnOverrides,
    ) -> Result<FeatureMatrix> {
        let selection = ColumnSelection {
            categorical: fitted_subset(
                "categorical",
                overrides.categorical.as_deref(),
                &self.columns.categorical,
            )?,
            continuous: fitted_subset(
                "continuous",
                overrides.continuous.as_deref(),
                &self.columns.continuous,
            )?,
        };
        self.transform_selection(df, &selection)
    }

    /// Map a scaled continuous block back to original units.
    ///
    /// Undoes min-max scaling and then the Box-Cox transform. Values outside
    /// the invertible region are clamped, see
    /// [`FittedBoxCoxScaler::inverse_transform`].
    pub fn inverse_transform_continuous(&self, block: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let (Some(box_cox), Some(min_max)) = (&self.box_cox, &self.min_max) else {
            return Err(ScalerError::configuration(
                "pipeline was fitted without continuous columns",
            ));
        };
        let powered = min_max.inverse_transform(block)?;
        box_cox.inverse_transform(powered.view())
    }

    fn transform_selection(
        &self,
        df: &DataFrame,
        selection: &ColumnSelection,
    ) -> Result<FeatureMatrix> {
        let span = info_span!(
            "icy_scaler.transform",
            rows = df.height(),
            categorical = selection.categorical.len(),
            continuous = selection.continuous.len()
        );
        let _guard = span.enter();

        let mut blocks = Vec::with_capacity(2);
        if let Some(encoder) = &self.categorical
            && !selection.categorical.is_empty()
        {
            let block = categorical_block(df, &selection.categorical)?;
            blocks.push(FeatureMatrix::Sparse(encoder.transform(&block)?));
        }
        if let (Some(box_cox), Some(min_max)) = (&self.box_cox, &self.min_max)
            && !selection.continuous.is_empty()
        {
            let block = continuous_block(df, &selection.continuous)?;
            let positions = positions_in(&block.names, &self.columns.continuous);
            let powered = box_cox.transform_columns(block.data.view(), &positions)?;
            let scaled = min_max.transform_columns(powered.view(), &positions)?;
            blocks.push(FeatureMatrix::Dense(scaled));
        }

        let out = hstack(&blocks)?;
        if self.config.enabled(Level::INFO) {
            let (rows, cols) = out.shape();
            info!(rows, cols, sparse = out.is_sparse(), "transformed DataFrame");
        }
        Ok(out)
    }
}

/// Validate an override list against the columns fitted in one role.
fn fitted_subset(kind: &str, requested: Option<&[String]>, fitted: &[String]) -> Result<Vec<String>> {
    let Some(requested) = requested else {
        return Ok(fitted.to_vec());
    };
    let mut selected: Vec<String> = Vec::with_capacity(requested.len());
    for name in requested {
        if !fitted.contains(name) {
            return Err(ScalerError::configuration(format!(
                "column '{name}' was not fitted as {kind}"
            )));
        }
        if selected.contains(name) {
            return Err(ScalerError::configuration(format!(
                "column '{name}' selected more than once"
            )));
        }
        selected.push(name.clone());
    }
    Ok(selected)
}

// Names were checked by `fitted_subset`, so every lookup succeeds.
fn positions_in(names: &[String], fitted: &[String]) -> Vec<usize> {
    names
        .iter()
        .filter_map(|name| fitted.iter().position(|candidate| candidate == name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn test_fit_records_columns() {
        let df = df!("city" => ["NYC", "LA"], "price" => [1.0, 2.0]).unwrap();
        let fitted = IcyScaler::new().fit(&df).unwrap();
        assert_eq!(fitted.columns().categorical, vec!["city"]);
        assert_eq!(fitted.columns().continuous, vec!["price"]);
        assert_eq!(fitted.n_features_out(), 3);
        assert_eq!(
            fitted.feature_names(),
            vec!["city=LA", "city=NYC", "price"]
        );
    }

    #[test]
    fn test_zero_rows_is_empty_data() {
        let df = df!("price" => Vec::<f64>::new()).unwrap();
        let err = IcyScaler::new().fit(&df).unwrap_err();
        assert!(matches!(err, ScalerError::EmptyData { .. }));
    }

    #[test]
    fn test_subset_rejects_unfitted_role() {
        let fitted = ["a".to_string()];
        let err = fitted_subset("continuous", Some(&["b".to_string()]), &fitted).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: column 'b' was not fitted as continuous"
        );
    }

    #[test]
    fn test_missing_override_selects_all_fitted() {
        let fitted = ["a".to_string(), "b".to_string()];
        assert_eq!(fitted_subset("categorical", None, &fitted).unwrap(), fitted);
    }

    #[test]
    fn test_positions_follow_fit_order() {
        let fitted = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let names = vec!["c".to_string(), "a".to_string()];
        assert_eq!(positions_in(&names, &fitted), vec![2, 0]);
    }
}

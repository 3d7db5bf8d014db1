//! Min-max scaling.
//!
//! ```text
//! X_scaled = (X - X_min) / (X_max - X_min) * (max - min) + min
//! ```

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_FEATURE_RANGE, validate_range};
use crate::error::{Result, ScalerError};

/// Unfitted min-max scaler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    feature_range: (f64, f64),
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self {
            feature_range: DEFAULT_FEATURE_RANGE,
        }
    }
}

impl MinMaxScaler {
    /// Scaler with target range `[0, 1]`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target range.
    pub fn with_range(mut self, min: f64, max: f64) -> Result<Self> {
        validate_range(min, max)?;
        self.feature_range = (min, max);
        Ok(self)
    }

    /// Record the per-column minimum and maximum.
    pub fn fit(&self, data: ArrayView2<'_, f64>) -> Result<FittedMinMaxScaler> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(ScalerError::empty("cannot fit min-max scaler on zero rows"));
        }
        let mut data_min = Vec::with_capacity(cols);
        let mut data_max = Vec::with_capacity(cols);
        for column in data.columns() {
            data_min.push(column.iter().copied().fold(f64::INFINITY, f64::min));
            data_max.push(column.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        }

        // Constant feature: unit range, maps to the range minimum
        let data_range = data_min
            .iter()
            .zip(&data_max)
            .map(|(&min, &max)| if max > min { max - min } else { 1.0 })
            .collect();

        Ok(FittedMinMaxScaler {
            feature_range: self.feature_range,
            data_min,
            data_max,
            data_range,
        })
    }
}

/// Fitted min-max scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedMinMaxScaler {
    feature_range: (f64, f64),
    data_min: Vec<f64>,
    data_max: Vec<f64>,
    data_range: Vec<f64>,
}

impl FittedMinMaxScaler {
    /// Per-column minimum of the fitting data.
    pub fn data_min(&self) -> &[f64] {
        &self.data_min
    }

    /// Per-column maximum of the fitting data.
    pub fn data_max(&self) -> &[f64] {
        &self.data_max
    }

    /// Target range.
    pub fn feature_range(&self) -> (f64, f64) {
        self.feature_range
    }

    /// Number of columns seen during fit.
    pub fn n_features_in(&self) -> usize {
        self.data_range.len()
    }

    /// Rescale into the target range.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.transform_columns(data, &self.all_columns())
    }

    /// Rescale columns that correspond to fitted columns `positions`.
    pub fn transform_columns(
        &self,
        data: ArrayView2<'_, f64>,
        positions: &[usize],
    ) -> Result<Array2<f64>> {
        self.check_positions(data.ncols(), positions)?;
        let (target_min, target_max) = self.feature_range;
        let width = target_max - target_min;
        let mut out = data.to_owned();
        for (col, &pos) in positions.iter().enumerate() {
            let (min, range) = (self.data_min[pos], self.data_range[pos]);
            out.column_mut(col)
                .mapv_inplace(|x| (x - min) / range * width + target_min);
        }
        Ok(out)
    }

    /// Undo the rescaling.
    pub fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.inverse_transform_columns(data, &self.all_columns())
    }

    /// Undo the rescaling for columns that correspond to fitted `positions`.
    pub fn inverse_transform_columns(
        &self,
        data: ArrayView2<'_, f64>,
        positions: &[usize],
    ) -> Result<Array2<f64>> {
        self.check_positions(data.ncols(), positions)?;
        let (target_min, target_max) = self.feature_range;
        let width = target_max - target_min;
        let mut out = data.to_owned();
        for (col, &pos) in positions.iter().enumerate() {
            let (min, range) = (self.data_min[pos], self.data_range[pos]);
            out.column_mut(col)
                .mapv_inplace(|y| (y - target_min) / width * range + min);
        }
        Ok(out)
    }

    fn all_columns(&self) -> Vec<usize> {
        (0..self.data_range.len()).collect()
    }

    fn check_positions(&self, got: usize, positions: &[usize]) -> Result<()> {
        if got != positions.len() {
            return Err(ScalerError::FeatureMismatch {
                expected: positions.len(),
                got,
            });
        }
        let fitted = self.data_range.len();
        if let Some(&pos) = positions.iter().find(|&&pos| pos >= fitted) {
            return Err(ScalerError::FeatureMismatch {
                expected: fitted,
                got: pos + 1,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_scales_into_unit_range() {
        let data = array![[1.0, -2.0], [3.0, 0.0], [5.0, 2.0]];
        let fitted = MinMaxScaler::new().fit(data.view()).unwrap();
        let out = fitted.transform(data.view()).unwrap();
        assert_eq!(fitted.data_min(), &[1.0, -2.0]);
        assert_eq!(fitted.data_max(), &[5.0, 2.0]);
        assert_eq!(out, array![[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]]);
    }

    #[test]
    fn test_custom_range() {
        let data = array![[0.0], [10.0]];
        let fitted = MinMaxScaler::new()
            .with_range(-1.0, 1.0)
            .unwrap()
            .fit(data.view())
            .unwrap();
        let out = fitted.transform(array![[5.0]].view()).unwrap();
        assert_relative_eq!(out[[0, 0]], 0.0);
    }

    #[test]
    fn test_constant_column_maps_to_range_min() {
        let data = array![[7.0], [7.0]];
        let fitted = MinMaxScaler::new().fit(data.view()).unwrap();
        let out = fitted.transform(data.view()).unwrap();
        assert_eq!(out, array![[0.0], [0.0]]);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let data = array![[1.0, 100.0], [2.0, 300.0], [4.0, 200.0]];
        let fitted = MinMaxScaler::new().fit(data.view()).unwrap();
        let scaled = fitted.transform(data.view()).unwrap();
        let back = fitted.inverse_transform(scaled.view()).unwrap();
        for (a, b) in data.iter().zip(back.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_subset_uses_fitted_positions() {
        let data = array![[0.0, 10.0], [1.0, 20.0]];
        let fitted = MinMaxScaler::new().fit(data.view()).unwrap();
        let out = fitted
            .transform_columns(array![[15.0]].view(), &[1])
            .unwrap();
        assert_relative_eq!(out[[0, 0]], 0.5);
    }

    #[test]
    fn test_width_mismatch() {
        let fitted = MinMaxScaler::new().fit(array![[1.0], [2.0]].view()).unwrap();
        let err = fitted.transform(array![[1.0, 2.0]].view()).unwrap_err();
        assert!(matches!(err, ScalerError::FeatureMismatch { .. }));
    }

    #[test]
    fn test_position_outside_fitted_columns() {
        let fitted = MinMaxScaler::new().fit(array![[1.0], [2.0]].view()).unwrap();
        let err = fitted
            .transform_columns(array![[1.5]].view(), &[3])
            .unwrap_err();
        assert!(matches!(
            err,
            ScalerError::FeatureMismatch {
                expected: 1,
                got: 4
            }
        ));
        let err = fitted
            .inverse_transform_columns(array![[0.5]].view(), &[1])
            .unwrap_err();
        assert!(matches!(err, ScalerError::FeatureMismatch { .. }));
    }
}

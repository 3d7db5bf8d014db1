//! Box-Cox power transform with an additive shift.
//!
//! Every continuous value is shifted by [`BOXCOX_SHIFT`] before the transform
//! so that zeros stay inside the Box-Cox domain:
//!
//! ```text
//! y = ((x + δ)^λ - 1) / λ    if λ != 0
//! y = ln(x + δ)              if λ == 0
//! ```
//!
//! One λ is estimated per column by maximising the Box-Cox log-likelihood.
//! Columns are fitted and transformed independently of each other.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::config::BOXCOX_SHIFT;
use crate::error::{Result, ScalerError};

/// |λ| below this is treated as the logarithmic case.
pub const LAMBDA_EPSILON: f64 = 1e-10;

/// Lambda used for degenerate columns (single row or zero variance).
pub const DEFAULT_LAMBDA: f64 = 1.0;

/// Spacing of the seed grid over `[-2, 2]`.
const LAMBDA_GRID_STEP: f64 = 0.01;

/// Bracket expansion stops once |λ| passes this.
const LAMBDA_EXPANSION_LIMIT: f64 = 100.0;

const GOLDEN_TOLERANCE: f64 = 1e-9;
const GOLDEN_MAX_ITERATIONS: usize = 200;

/// Unfitted Box-Cox scaler.
///
/// # Example
///
/// ```
/// use icy_scaler::power::BoxCoxScaler;
/// use ndarray::array;
///
/// let data = array![[0.0, 1.0], [2.0, 3.0], [5.0, 8.0]];
/// let fitted = BoxCoxScaler::new().fit(data.view()).unwrap();
/// assert_eq!(fitted.lambdas().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoxCoxScaler {
    feature_names: Option<Vec<String>>,
}

impl BoxCoxScaler {
    /// Create a scaler that labels columns `x0`, `x1`, ... in errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the columns so errors can point at the offending one.
    #[must_use]
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Estimate one λ per column from the shifted values.
    pub fn fit(&self, data: ArrayView2<'_, f64>) -> Result<FittedBoxCoxScaler> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(ScalerError::empty("cannot fit Box-Cox scaler on zero rows"));
        }
        let feature_names = match &self.feature_names {
            Some(names) if names.len() == cols => names.clone(),
            Some(names) => {
                return Err(ScalerError::FeatureMismatch {
                    expected: names.len(),
                    got: cols,
                });
            }
            None => (0..cols).map(|idx| format!("x{idx}")).collect(),
        };

        let mut lambdas = Vec::with_capacity(cols);
        for (idx, name) in feature_names.iter().enumerate() {
            let shifted = shifted_column(data, idx, name)?;
            lambdas.push(boxcox_lambda(&shifted));
        }

        Ok(FittedBoxCoxScaler {
            lambdas,
            shift: BOXCOX_SHIFT,
            feature_names,
        })
    }

    /// Fit, then transform the same data.
    pub fn fit_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.fit(data)?.transform(data)
    }
}

/// Fitted Box-Cox scaler: one λ per column plus the shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedBoxCoxScaler {
    lambdas: Vec<f64>,
    shift: f64,
    feature_names: Vec<String>,
}

impl FittedBoxCoxScaler {
    /// Per-column λ in fit order.
    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas
    }

    /// The additive shift applied before the transform.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Column labels used in error messages.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of columns seen during fit.
    pub fn n_features_in(&self) -> usize {
        self.lambdas.len()
    }

    /// Apply the shifted Box-Cox map with each column's λ.
    ///
    /// Either every column is transformed or an error is returned.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let positions: Vec<usize> = (0..self.lambdas.len()).collect();
        self.transform_columns(data, &positions)
    }

    /// Transform columns that correspond to fitted columns `positions`.
    pub fn transform_columns(
        &self,
        data: ArrayView2<'_, f64>,
        positions: &[usize],
    ) -> Result<Array2<f64>> {
        if data.ncols() != positions.len() {
            return Err(ScalerError::FeatureMismatch {
                expected: positions.len(),
                got: data.ncols(),
            });
        }
        if let Some(&pos) = positions.iter().find(|&&pos| pos >= self.lambdas.len()) {
            return Err(ScalerError::FeatureMismatch {
                expected: self.lambdas.len(),
                got: pos + 1,
            });
        }
        let mut out = Array2::zeros(data.raw_dim());
        for (idx, &pos) in positions.iter().enumerate() {
            let shifted = shifted_column(data, idx, &self.feature_names[pos])?;
            for (row, value) in shifted.into_iter().enumerate() {
                out[[row, idx]] = boxcox(value, self.lambdas[pos]);
            }
        }
        Ok(out)
    }

    /// Map transformed values back to the original scale.
    ///
    /// This is an approximation near the edge of the domain: `λ·y + 1` is
    /// floored at [`inverse_floor`] before the logarithm, so values below the
    /// image of `x = 0` (λ > 0) come back as `0`, and values at or beyond the
    /// asymptote `y = -1/λ` (λ < 0) come back large but not NaN.
    pub fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_width(data.ncols())?;
        let mut out = Array2::zeros(data.raw_dim());
        for (idx, &lambda) in self.lambdas.iter().enumerate() {
            for row in 0..data.nrows() {
                out[[row, idx]] = inv_boxcox(data[[row, idx]], lambda, self.shift);
            }
        }
        Ok(out)
    }

    fn check_width(&self, got: usize) -> Result<()> {
        if got != self.lambdas.len() {
            return Err(ScalerError::FeatureMismatch {
                expected: self.lambdas.len(),
                got,
            });
        }
        Ok(())
    }
}

fn shifted_column(data: ArrayView2<'_, f64>, idx: usize, name: &str) -> Result<Vec<f64>> {
    data.column(idx)
        .iter()
        .map(|&value| {
            let shifted = value + BOXCOX_SHIFT;
            if shifted > 0.0 && shifted.is_finite() {
                Ok(shifted)
            } else {
                Err(ScalerError::Domain {
                    column: name.to_string(),
                    value,
                })
            }
        })
        .collect()
}

/// Box-Cox transform of a single positive value.
pub fn boxcox(x: f64, lambda: f64) -> f64 {
    if lambda.abs() < LAMBDA_EPSILON {
        x.ln()
    } else {
        (lambda * x.ln()).exp_m1() / lambda
    }
}

/// Lower bound applied to `λ·y + 1` by [`inv_boxcox`].
///
/// For λ > 0 this is `δ^λ`, the image of `x = 0`. For λ < 0 the shifted
/// input has no upper bound, so only a positive epsilon is kept.
pub fn inverse_floor(lambda: f64, shift: f64) -> f64 {
    if lambda > 0.0 {
        shift.powf(lambda)
    } else {
        f64::EPSILON
    }
}

/// Inverse of the shifted Box-Cox transform for a single value.
pub fn inv_boxcox(y: f64, lambda: f64, shift: f64) -> f64 {
    if lambda.abs() < LAMBDA_EPSILON {
        y.exp() - shift
    } else {
        let floor = inverse_floor(lambda, shift);
        let scaled = lambda * y;
        let log_base = if scaled + 1.0 > floor {
            scaled.ln_1p()
        } else {
            floor.ln()
        };
        (log_base / lambda).exp() - shift
    }
}

/// Find the λ maximising the Box-Cox log-likelihood of strictly positive data.
///
/// A grid over `[-2, 2]` in steps of 0.01 seeds the search. When the best
/// grid point sits on the edge of the grid the bracket is walked outwards
/// with doubling steps while the likelihood keeps rising, so heavily skewed
/// columns are not pinned to ±2. A golden-section search then refines the
/// maximum inside the bracket. Degenerate data keeps [`DEFAULT_LAMBDA`].
pub fn boxcox_lambda(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return DEFAULT_LAMBDA;
    }
    let log_sum: f64 = values.iter().map(|x| x.ln()).sum();
    let llf = |lambda: f64| boxcox_llf(values, log_sum, lambda);

    let mut best_lambda = DEFAULT_LAMBDA;
    let mut best_llf = f64::NEG_INFINITY;
    for step in -200..=200 {
        let lambda = f64::from(step) * LAMBDA_GRID_STEP;
        let value = llf(lambda);
        if value > best_llf {
            best_llf = value;
            best_lambda = lambda;
        }
    }
    if !best_llf.is_finite() {
        return DEFAULT_LAMBDA;
    }

    let mut step = LAMBDA_GRID_STEP;
    let (mut lower, mut upper) = (best_lambda - step, best_lambda + step);
    while best_lambda.abs() < LAMBDA_EXPANSION_LIMIT {
        let (upper_llf, lower_llf) = (llf(upper), llf(lower));
        if upper_llf > best_llf {
            lower = best_lambda;
            best_lambda = upper;
            best_llf = upper_llf;
        } else if lower_llf > best_llf {
            upper = best_lambda;
            best_lambda = lower;
            best_llf = lower_llf;
        } else {
            break;
        }
        step *= 2.0;
        if best_lambda > lower {
            upper = best_lambda + step;
        } else {
            lower = best_lambda - step;
        }
    }

    let refined = golden_section_max(llf, lower, upper);
    if llf(refined) >= best_llf {
        refined
    } else {
        best_lambda
    }
}

/// Maximise a unimodal function on `[lower, upper]`.
fn golden_section_max(f: impl Fn(f64) -> f64, mut lower: f64, mut upper: f64) -> f64 {
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let mut left = upper - ratio * (upper - lower);
    let mut right = lower + ratio * (upper - lower);
    let (mut f_left, mut f_right) = (f(left), f(right));
    for _ in 0..GOLDEN_MAX_ITERATIONS {
        if upper - lower <= GOLDEN_TOLERANCE * (1.0 + left.abs() + right.abs()) {
            break;
        }
        if f_left < f_right {
            lower = left;
            left = right;
            f_left = f_right;
            right = lower + ratio * (upper - lower);
            f_right = f(right);
        } else {
            upper = right;
            right = left;
            f_right = f_left;
            left = upper - ratio * (upper - lower);
            f_left = f(left);
        }
    }
    (lower + upper) / 2.0
}

/// Profile log-likelihood (constant terms dropped).
fn boxcox_llf(values: &[f64], log_sum: f64, lambda: f64) -> f64 {
    let n = values.len() as f64;
    let transformed: Vec<f64> = values.iter().map(|&x| boxcox(x, lambda)).collect();
    if transformed.iter().any(|y| !y.is_finite()) {
        return f64::NEG_INFINITY;
    }
    let mean = transformed.iter().sum::<f64>() / n;
    let variance = transformed.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
    // Zero or rounding-level variance carries no shape information.
    if variance <= f64::EPSILON * mean.abs().max(1.0) {
        return f64::NEG_INFINITY;
    }
    -0.5 * n * variance.ln() + (lambda - 1.0) * log_sum
}

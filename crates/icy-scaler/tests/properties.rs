//! Property-based tests for the pipeline.
//!
//! These check invariants that should hold for any non-negative continuous
//! data and any column layout.

use approx::relative_eq;
use ndarray::Array2;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;

use icy_scaler::config::BOXCOX_SHIFT;
use icy_scaler::power::{boxcox, inv_boxcox};
use icy_scaler::{BoxCoxScaler, ColumnClassifier, ColumnOverrides, IcyScaler};

fn number_column(name: &str, values: &[f64]) -> Column {
    Series::new(name.into(), values.to_vec()).into_column()
}

/// Non-negative values with enough spread to stay away from the clamp.
fn values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..max_len)
}

/// Two equally long non-negative columns.
fn paired_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..30).prop_flat_map(|len| {
        (
            prop::collection::vec(0.0..500.0_f64, len),
            prop::collection::vec(0.0..500.0_f64, len),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Inverse Box-Cox recovers the input outside the clamped region.
    #[test]
    fn boxcox_roundtrip(x in 0.0..1000.0_f64, lambda in -2.0..2.0_f64) {
        let y = boxcox(x + BOXCOX_SHIFT, lambda);
        let back = inv_boxcox(y, lambda, BOXCOX_SHIFT);
        prop_assert!(relative_eq!(back, x, epsilon = 1e-6, max_relative = 1e-6));
    }

    /// transform then inverse transform recovers the fitted column.
    #[test]
    fn scaler_roundtrip(values in values_strategy(2, 40)) {
        let data = Array2::from_shape_vec((values.len(), 1), values.clone()).unwrap();
        let fitted = BoxCoxScaler::new().fit(data.view()).unwrap();
        let transformed = fitted.transform(data.view()).unwrap();
        let back = fitted.inverse_transform(transformed.view()).unwrap();
        for (original, recovered) in values.iter().zip(back.iter()) {
            prop_assert!(relative_eq!(original, recovered, max_relative = 1e-6));
        }
    }

    /// Fitting twice on the same frame gives the same state.
    #[test]
    fn fit_is_idempotent((a, b) in paired_strategy()) {
        let df = DataFrame::new(vec![number_column("a", &a), number_column("b", &b)]).unwrap();
        let scaler = IcyScaler::new();
        let first = scaler.fit(&df).unwrap();
        let second = scaler.fit(&df).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Column order does not change any column's λ.
    #[test]
    fn lambdas_independent_of_column_order((a, b) in paired_strategy()) {
        let forward = DataFrame::new(vec![number_column("a", &a), number_column("b", &b)]).unwrap();
        let reversed = DataFrame::new(vec![number_column("b", &b), number_column("a", &a)]).unwrap();
        let forward = IcyScaler::new().fit(&forward).unwrap();
        let reversed = IcyScaler::new().fit(&reversed).unwrap();
        for name in ["a", "b"] {
            prop_assert_eq!(forward.lambda_for(name), reversed.lambda_for(name));
        }
    }

    /// Scaled continuous output stays inside the target range on fit data.
    #[test]
    fn scaled_output_in_unit_range((a, b) in paired_strategy()) {
        let df = DataFrame::new(vec![number_column("a", &a), number_column("b", &b)]).unwrap();
        let out = IcyScaler::new().fit_transform(&df).unwrap().into_dense();
        prop_assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    /// Resolved column sets never overlap, whatever is overridden.
    #[test]
    fn resolved_sets_are_disjoint(mask in prop::collection::vec(any::<bool>(), 4)) {
        let df = DataFrame::new(vec![
            number_column("w", &[1.0, 2.0]),
            Series::new("x".into(), vec!["p".to_string(), "q".to_string()]).into_column(),
            number_column("y", &[3.0, 4.0]),
            Series::new("z".into(), vec!["r".to_string(), "s".to_string()]).into_column(),
        ])
        .unwrap();
        let names = ["w", "x", "y", "z"];
        let chosen: Vec<&str> = names
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(name, _)| *name)
            .collect();

        let classifier = ColumnClassifier::default();
        for overrides in [
            ColumnOverrides::none(),
            ColumnOverrides::none().with_categorical(chosen.clone()),
            ColumnOverrides::none().with_continuous(chosen.clone()),
        ] {
            let selection = classifier.resolve(&df, &overrides).unwrap();
            prop_assert!(
                selection
                    .categorical
                    .iter()
                    .all(|name| !selection.continuous.contains(name))
            );
        }
    }
}

//! Integration tests for the composite pipeline.

use approx::assert_relative_eq;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use icy_scaler::{ColumnOverrides, IcyScaler, ScalerError};

fn text_column(name: &str, values: &[&str]) -> Column {
    Series::new(
        name.into(),
        values.iter().copied().map(String::from).collect::<Vec<_>>(),
    )
    .into_column()
}

fn number_column(name: &str, values: &[f64]) -> Column {
    Series::new(name.into(), values.to_vec()).into_column()
}

fn housing() -> DataFrame {
    DataFrame::new(vec![
        text_column("city", &["NYC", "LA", "NYC"]),
        number_column("price", &[10.0, 20.0, 15.0]),
    ])
    .unwrap()
}

#[test]
fn test_mixed_frame_produces_categorical_then_continuous() {
    let df = housing();
    let out = IcyScaler::new().fit_transform(&df).unwrap();

    assert_eq!(out.shape(), (3, 3));
    assert!(out.is_sparse());
    let dense = out.into_dense();

    // city block: LA, NYC
    assert_eq!(dense.row(0).to_vec()[..2], [0.0, 1.0]);
    assert_eq!(dense.row(1).to_vec()[..2], [1.0, 0.0]);
    assert_eq!(dense.row(0).to_vec()[..2], dense.row(2).to_vec()[..2]);

    let price = dense.column(2);
    assert!(price.iter().all(|v| (0.0..=1.0).contains(v)));
    assert_relative_eq!(price[0], 0.0);
    assert_relative_eq!(price[1], 1.0);
    assert!(price[2] > 0.0 && price[2] < 1.0);
}

#[test]
fn test_feature_names_match_output_columns() {
    let fitted = IcyScaler::new().fit(&housing()).unwrap();
    insta::assert_snapshot!(fitted.feature_names().join(","), @"city=LA,city=NYC,price");
    assert_eq!(fitted.n_features_out(), 3);
}

#[test]
fn test_unseen_category_fails_transform() {
    let train = DataFrame::new(vec![text_column("grade", &["A", "B"])]).unwrap();
    let test = DataFrame::new(vec![text_column("grade", &["C"])]).unwrap();

    let fitted = IcyScaler::new().fit(&train).unwrap();
    let err = fitted.transform(&test).unwrap_err();
    match err {
        ScalerError::UnseenCategory { column, value } => {
            assert_eq!(column, "grade");
            assert_eq!(value, "C");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_single_zero_is_accepted() {
    let df = DataFrame::new(vec![number_column("x", &[0.0])]).unwrap();
    let out = IcyScaler::new().fit_transform(&df).unwrap();
    assert!(!out.is_sparse());
    assert_eq!(out.shape(), (1, 1));
    assert_eq!(out.into_dense()[[0, 0]], 0.0);
}

#[test]
fn test_negative_value_is_domain_error() {
    let df = DataFrame::new(vec![number_column("temp", &[1.0, -3.0])]).unwrap();
    let err = IcyScaler::new().fit(&df).unwrap_err();
    assert!(matches!(err, ScalerError::Domain { ref column, .. } if column == "temp"));
}

#[test]
fn test_categorical_only_frame() {
    let df = DataFrame::new(vec![
        text_column("color", &["red", "blue", "red"]),
        text_column("size", &["S", "S", "M"]),
    ])
    .unwrap();
    let fitted = IcyScaler::new().fit(&df).unwrap();
    assert!(fitted.box_cox().is_none());
    assert!(fitted.lambdas().is_empty());

    let out = fitted.transform(&df).unwrap();
    assert_eq!(out.shape(), (3, 4));
}

#[test]
fn test_continuous_only_frame() {
    let df = DataFrame::new(vec![
        number_column("a", &[1.0, 2.0, 3.0]),
        number_column("b", &[5.0, 0.0, 2.5]),
    ])
    .unwrap();
    let fitted = IcyScaler::new().fit(&df).unwrap();
    assert!(fitted.categorical_encoder().is_none());
    assert_eq!(fitted.lambdas().len(), 2);

    let out = fitted.transform(&df).unwrap();
    assert!(!out.is_sparse());
    assert_eq!(out.shape(), (3, 2));
}

#[test]
fn test_transform_reuses_fitted_columns() {
    // A numeric code column fitted as categorical stays categorical.
    let df = DataFrame::new(vec![
        number_column("zip", &[10001.0, 90001.0, 10001.0]),
        number_column("price", &[10.0, 20.0, 15.0]),
    ])
    .unwrap();
    let overrides = ColumnOverrides::none().with_categorical(["zip"]);
    let fitted = IcyScaler::new().fit_with_columns(&df, &overrides).unwrap();

    assert_eq!(fitted.columns().categorical, vec!["zip"]);
    assert_eq!(fitted.columns().continuous, vec!["price"]);
    assert_eq!(fitted.transform(&df).unwrap().shape(), (3, 3));
}

#[test]
fn test_transform_subset_of_fitted_columns() {
    let df = DataFrame::new(vec![
        number_column("a", &[1.0, 2.0, 4.0]),
        number_column("b", &[3.0, 9.0, 27.0]),
    ])
    .unwrap();
    let fitted = IcyScaler::new().fit(&df).unwrap();
    let full = fitted.transform(&df).unwrap().into_dense();

    let only_b = ColumnOverrides::none().with_continuous(["b"]);
    let subset = fitted
        .transform_with_columns(&df, &only_b)
        .unwrap()
        .into_dense();
    assert_eq!(subset.ncols(), 1);
    for row in 0..3 {
        assert_relative_eq!(subset[[row, 0]], full[[row, 1]]);
    }
}

#[test]
fn test_transform_override_must_be_fitted_in_role() {
    let fitted = IcyScaler::new().fit(&housing()).unwrap();
    let swapped = ColumnOverrides::none().with_continuous(["city"]);
    let err = fitted.transform_with_columns(&housing(), &swapped).unwrap_err();
    assert!(matches!(err, ScalerError::Configuration { .. }));
}

#[test]
fn test_fit_override_unknown_column() {
    let overrides = ColumnOverrides::none().with_categorical(["region"]);
    let err = IcyScaler::new()
        .fit_with_columns(&housing(), &overrides)
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid configuration: categorical column 'region' not found in DataFrame"
    );
}

#[test]
fn test_nothing_selected_is_empty_data() {
    let overrides = ColumnOverrides::none()
        .with_categorical(Vec::<String>::new())
        .with_continuous(Vec::<String>::new());
    let err = IcyScaler::new()
        .fit_with_columns(&housing(), &overrides)
        .unwrap_err();
    assert!(matches!(err, ScalerError::EmptyData { .. }));
}

#[test]
fn test_missing_value_is_reported() {
    let df = DataFrame::new(vec![
        Series::new("price".into(), vec![Some(1.0), None, Some(3.0)]).into_column(),
    ])
    .unwrap();
    let err = IcyScaler::new().fit(&df).unwrap_err();
    assert!(matches!(err, ScalerError::MissingValue { row: 1, .. }));
}

#[test]
fn test_inverse_transform_continuous_recovers_prices() {
    let df = housing();
    let fitted = IcyScaler::new().fit(&df).unwrap();
    let only_price = ColumnOverrides::none().with_categorical(Vec::<String>::new());
    let scaled = fitted
        .transform_with_columns(&df, &only_price)
        .unwrap()
        .into_dense();

    let back = fitted.inverse_transform_continuous(scaled.view()).unwrap();
    for (original, recovered) in [10.0, 20.0, 15.0].iter().zip(back.column(0)) {
        assert_relative_eq!(original, recovered, max_relative = 1e-8);
    }
}

#[test]
fn test_lambda_lookup_by_name() {
    let fitted = IcyScaler::new().fit(&housing()).unwrap();
    let lambda = fitted.lambda_for("price").unwrap();
    assert_eq!(fitted.lambdas(), vec![("price", lambda)]);
    assert!(fitted.lambda_for("city").is_none());
}

#[test]
fn test_fitted_state_serializes() {
    let df = housing();
    let fitted = IcyScaler::new().fit(&df).unwrap();

    let json = serde_json::to_string(&fitted).unwrap();
    let restored: icy_scaler::FittedIcyScaler = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, fitted);
    assert_eq!(
        restored.transform(&df).unwrap(),
        fitted.transform(&df).unwrap()
    );
}

//! DataFrame value extraction for the two column kinds.

use ndarray::Array2;
use polars::prelude::{DataFrame, DataType};

use crate::error::{Result, ScalerError};

/// String values of the categorical columns, column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalBlock {
    /// Column names, in selection order.
    pub names: Vec<String>,
    /// One vector of values per column.
    pub values: Vec<Vec<String>>,
    /// Row count of the source frame.
    pub n_rows: usize,
}

/// Numeric values of the continuous columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousBlock {
    /// Column names, in selection order.
    pub names: Vec<String>,
    /// `(rows, columns)` matrix.
    pub data: Array2<f64>,
}

/// Read the named columns as strings.
///
/// Non-string columns are cast to `String` so that an overridden numeric
/// column can still be label-encoded.
pub fn categorical_block(df: &DataFrame, names: &[String]) -> Result<CategoricalBlock> {
    let mut values = Vec::with_capacity(names.len());
    for name in names {
        let column = df.column(name)?;
        let as_str = column.cast(&DataType::String)?;
        let chunked = as_str.str()?;
        let mut column_values = Vec::with_capacity(df.height());
        for (row, value) in chunked.into_iter().enumerate() {
            let Some(value) = value else {
                return Err(ScalerError::MissingValue {
                    column: name.clone(),
                    row,
                });
            };
            column_values.push(value.to_string());
        }
        values.push(column_values);
    }
    Ok(CategoricalBlock {
        names: names.to_vec(),
        values,
        n_rows: df.height(),
    })
}

/// Read the named columns as `f64` into a `(rows, columns)` matrix.
pub fn continuous_block(df: &DataFrame, names: &[String]) -> Result<ContinuousBlock> {
    let mut data = Array2::zeros((df.height(), names.len()));
    for (idx, name) in names.iter().enumerate() {
        let column = df.column(name)?;
        let as_f64 = column.cast(&DataType::Float64).map_err(|err| {
            ScalerError::configuration(format!(
                "column '{name}' cannot be read as continuous: {err}"
            ))
        })?;
        let chunked = as_f64.f64()?;
        // The cast turns unparseable cells into nulls; tell those apart from
        // nulls already present in the input.
        let was_null = column.is_null();
        for (row, (value, null_before)) in chunked.into_iter().zip(&was_null).enumerate() {
            match value {
                Some(value) => data[[row, idx]] = value,
                None if null_before.unwrap_or(false) => {
                    return Err(ScalerError::MissingValue {
                        column: name.clone(),
                        row,
                    });
                }
                None => {
                    return Err(ScalerError::configuration(format!(
                        "column '{name}' cannot be read as continuous: row {row} is not numeric"
                    )));
                }
            }
        }
    }
    Ok(ContinuousBlock {
        names: names.to_vec(),
        data,
    })
}

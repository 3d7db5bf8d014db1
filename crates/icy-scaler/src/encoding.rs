//! Categorical encoding: per-column label codes, then one joint one-hot.
//!
//! Label codes are positions in the sorted list of distinct values. The
//! one-hot encoder is fitted once over the code matrix of all categorical
//! columns and produces one block per column, in column order, each block
//! ordered by code. Because codes follow sorted value order, output column
//! `k` of a block always stands for the `k`-th smallest value.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScalerError};
use crate::frame::CategoricalBlock;
use crate::matrix::CsrMatrix;

/// Fitted label encoder for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the sorted distinct values of a column.
    pub fn fit(column: &str, values: &[String]) -> Result<Self> {
        if values.is_empty() {
            return Err(ScalerError::empty(format!(
                "cannot fit label encoder for '{column}' on zero rows"
            )));
        }
        let mut classes = values.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Ok(Self {
            column: column.to_string(),
            classes,
        })
    }

    /// Column this encoder was fitted on.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Distinct values in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of distinct values.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code of a single value.
    pub fn encode(&self, value: &str) -> Result<u32> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .map(|idx| idx as u32)
            .map_err(|_| ScalerError::UnseenCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Codes of all values; fails on the first unseen one.
    pub fn transform(&self, values: &[String]) -> Result<Vec<u32>> {
        values.iter().map(|value| self.encode(value)).collect()
    }

    /// Values for the given codes.
    pub fn inverse_transform(&self, codes: &[u32]) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|&code| {
                self.classes.get(code as usize).cloned().ok_or_else(|| {
                    ScalerError::UnseenCategory {
                        column: self.column.clone(),
                        value: format!("code {code}"),
                    }
                })
            })
            .collect()
    }
}

/// One encoder over many integer-coded columns, block-structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<u32>>,
}

impl OneHotEncoder {
    /// Learn the sorted distinct codes of every column.
    pub fn fit(columns: &[String], codes: &[Vec<u32>]) -> Result<Self> {
        if columns.len() != codes.len() {
            return Err(ScalerError::FeatureMismatch {
                expected: columns.len(),
                got: codes.len(),
            });
        }
        let categories = codes
            .iter()
            .map(|column_codes| {
                let mut distinct = column_codes.clone();
                distinct.sort_unstable();
                distinct.dedup();
                distinct
            })
            .collect();
        Ok(Self {
            columns: columns.to_vec(),
            categories,
        })
    }

    /// Distinct codes per column.
    pub fn categories(&self) -> &[Vec<u32>] {
        &self.categories
    }

    /// Output width of each column's block.
    pub fn n_values(&self) -> Vec<usize> {
        self.categories.iter().map(Vec::len).collect()
    }

    /// Total output width.
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Encode every fitted column.
    pub fn transform(&self, codes: &[Vec<u32>], n_rows: usize) -> Result<CsrMatrix> {
        let positions: Vec<usize> = (0..self.categories.len()).collect();
        self.transform_columns(codes, &positions, n_rows)
    }

    /// Encode a subset of the fitted columns.
    ///
    /// `codes[i]` holds the codes of fitted column `positions[i]`; the output
    /// contains only those blocks, in the given order.
    pub fn transform_columns(
        &self,
        codes: &[Vec<u32>],
        positions: &[usize],
        n_rows: usize,
    ) -> Result<CsrMatrix> {
        if codes.len() != positions.len() {
            return Err(ScalerError::FeatureMismatch {
                expected: positions.len(),
                got: codes.len(),
            });
        }
        let fitted = self.categories.len();
        if let Some(&pos) = positions.iter().find(|&&pos| pos >= fitted) {
            return Err(ScalerError::FeatureMismatch {
                expected: fitted,
                got: pos + 1,
            });
        }
        if let Some(len) = codes.iter().map(Vec::len).find(|&len| len != n_rows) {
            return Err(ScalerError::FeatureMismatch {
                expected: n_rows,
                got: len,
            });
        }
        let width = positions
            .iter()
            .map(|&pos| self.categories[pos].len())
            .sum();
        let mut out = CsrMatrix::with_columns(width);
        for row in 0..n_rows {
            let mut entries = Vec::with_capacity(positions.len());
            let mut offset = 0;
            for (column_codes, &pos) in codes.iter().zip(positions) {
                let categories = &self.categories[pos];
                let code = column_codes[row];
                let idx = categories.binary_search(&code).map_err(|_| {
                    ScalerError::UnseenCategory {
                        column: self.columns[pos].clone(),
                        value: format!("code {code}"),
                    }
                })?;
                entries.push((offset + idx, 1.0));
                offset += categories.len();
            }
            out.push_row(entries);
        }
        Ok(out)
    }
}

/// Label encoders per column followed by one joint one-hot encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    label_encoders: Vec<LabelEncoder>,
    one_hot: OneHotEncoder,
}

impl CategoricalEncoder {
    /// Fit label encoders per column, then the joint one-hot encoder.
    pub fn fit(block: &CategoricalBlock) -> Result<Self> {
        let mut label_encoders = Vec::with_capacity(block.names.len());
        let mut codes = Vec::with_capacity(block.names.len());
        for (name, values) in block.names.iter().zip(&block.values) {
            let encoder = LabelEncoder::fit(name, values)?;
            codes.push(encoder.transform(values)?);
            label_encoders.push(encoder);
        }
        let one_hot = OneHotEncoder::fit(&block.names, &codes)?;
        Ok(Self {
            label_encoders,
            one_hot,
        })
    }

    /// Encode a block whose columns are all among the fitted ones.
    pub fn transform(&self, block: &CategoricalBlock) -> Result<CsrMatrix> {
        let mut positions = Vec::with_capacity(block.names.len());
        let mut codes = Vec::with_capacity(block.names.len());
        for (name, values) in block.names.iter().zip(&block.values) {
            let position = self.position(name).ok_or_else(|| {
                ScalerError::configuration(format!("column '{name}' was not fitted as categorical"))
            })?;
            codes.push(self.label_encoders[position].transform(values)?);
            positions.push(position);
        }
        self.one_hot
            .transform_columns(&codes, &positions, block.n_rows)
    }

    /// Fitted column names, in block order.
    pub fn columns(&self) -> Vec<&str> {
        self.label_encoders
            .iter()
            .map(LabelEncoder::column)
            .collect()
    }

    /// Label encoder of one column.
    pub fn label_encoder(&self, column: &str) -> Option<&LabelEncoder> {
        self.position(column).map(|pos| &self.label_encoders[pos])
    }

    /// The joint one-hot encoder.
    pub fn one_hot(&self) -> &OneHotEncoder {
        &self.one_hot
    }

    /// Output width over all fitted columns.
    pub fn n_features_out(&self) -> usize {
        self.one_hot.n_features_out()
    }

    /// `column=value` for every output column, in output order.
    pub fn feature_names(&self) -> Vec<String> {
        self.feature_names_for(&self.columns())
    }

    pub(crate) fn feature_names_for(&self, columns: &[&str]) -> Vec<String> {
        columns
            .iter()
            .filter_map(|column| self.label_encoder(column))
            .flat_map(|encoder| {
                encoder
                    .classes()
                    .iter()
                    .map(move |class| format!("{}={class}", encoder.column()))
            })
            .collect()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.label_encoders
            .iter()
            .position(|encoder| encoder.column() == column)
    }
}

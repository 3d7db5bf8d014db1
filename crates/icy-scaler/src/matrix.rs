//! Output matrix representations and horizontal concatenation.
//!
//! One-hot output is naturally sparse and power-transformed output is dense.
//! [`hstack`] tries the sparse strategy first and falls back to a dense
//! concatenation when the sparse one does not apply.

use ndarray::{Array2, ArrayView2, Axis, concatenate};

use crate::error::{Result, ScalerError};

/// Compressed sparse row matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// Empty matrix with `n_cols` columns; rows are appended with [`push_row`].
    ///
    /// [`push_row`]: CsrMatrix::push_row
    pub fn with_columns(n_cols: usize) -> Self {
        Self {
            n_rows: 0,
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Append a row from `(column, value)` pairs sorted by column.
    ///
    /// # Panics
    ///
    /// Panics if a column index is out of bounds or not strictly increasing.
    pub fn push_row(&mut self, entries: impl IntoIterator<Item = (usize, f64)>) {
        let mut last: Option<usize> = None;
        for (col, value) in entries {
            assert!(col < self.n_cols, "column {col} out of bounds");
            assert!(last.is_none_or(|prev| prev < col), "columns must increase");
            last = Some(col);
            if value != 0.0 {
                self.indices.push(col);
                self.data.push(value);
            }
        }
        self.indptr.push(self.indices.len());
        self.n_rows += 1;
    }

    /// Build from a dense view, keeping non-zero entries.
    pub fn from_dense(dense: ArrayView2<'_, f64>) -> Self {
        let mut csr = Self::with_columns(dense.ncols());
        for row in dense.rows() {
            csr.push_row(
                row.iter()
                    .copied()
                    .enumerate()
                    .filter(|(_, value)| *value != 0.0),
            );
        }
        csr
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// `(column, value)` pairs stored in `row`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.indptr[row]..self.indptr[row + 1];
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.data[range].iter().copied())
    }

    /// Value at `(row, col)`, zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.row(row)
            .find(|(idx, _)| *idx == col)
            .map_or(0.0, |(_, value)| value)
    }

    /// Expand into a dense array.
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows, self.n_cols));
        for row in 0..self.n_rows {
            for (col, value) in self.row(row) {
                dense[[row, col]] = value;
            }
        }
        dense
    }
}

/// A transformed block or the final pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMatrix {
    /// Sparse storage, used for one-hot blocks.
    Sparse(CsrMatrix),
    /// Dense storage, used for continuous blocks.
    Dense(Array2<f64>),
}

impl FeatureMatrix {
    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Sparse(csr) => (csr.n_rows(), csr.n_cols()),
            Self::Dense(dense) => dense.dim(),
        }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.shape().1
    }

    /// Returns true for the sparse representation.
    pub fn is_sparse(&self) -> bool {
        matches!(self, Self::Sparse(_))
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> Array2<f64> {
        match self {
            Self::Sparse(csr) => csr.to_dense(),
            Self::Dense(dense) => dense.clone(),
        }
    }

    /// Consume into a dense array without copying dense storage.
    pub fn into_dense(self) -> Array2<f64> {
        match self {
            Self::Sparse(csr) => csr.to_dense(),
            Self::Dense(dense) => dense,
        }
    }
}

/// Why a concatenation strategy did not produce a result.
#[derive(Debug)]
enum StackFailure {
    /// The strategy does not apply to these block types.
    NotApplicable,
    /// Row counts disagree.
    Shape(String),
}

/// Concatenate blocks column-wise, in the given order.
///
/// The sparse strategy applies when at least one block is sparse; dense
/// blocks are converted and the result is sparse. Otherwise the blocks are
/// concatenated densely. `ShapeMismatch` is returned only when both
/// strategies fail.
pub fn hstack(blocks: &[FeatureMatrix]) -> Result<FeatureMatrix> {
    if blocks.is_empty() {
        return Err(ScalerError::empty("no output blocks to concatenate"));
    }
    match sparse_hstack(blocks) {
        Ok(csr) => Ok(FeatureMatrix::Sparse(csr)),
        Err(sparse_failure) => match dense_hstack(blocks) {
            Ok(dense) => Ok(FeatureMatrix::Dense(dense)),
            Err(dense_failure) => Err(ScalerError::ShapeMismatch {
                message: describe_failures(&sparse_failure, &dense_failure),
            }),
        },
    }
}

fn describe_failures(sparse: &StackFailure, dense: &StackFailure) -> String {
    match (sparse, dense) {
        (StackFailure::Shape(message), _) | (_, StackFailure::Shape(message)) => message.clone(),
        _ => "no concatenation strategy applies".to_string(),
    }
}

fn check_rows(blocks: &[FeatureMatrix]) -> std::result::Result<usize, StackFailure> {
    let rows = blocks[0].n_rows();
    if let Some(block) = blocks.iter().find(|block| block.n_rows() != rows) {
        return Err(StackFailure::Shape(format!(
            "row counts differ: {rows} vs {}",
            block.n_rows()
        )));
    }
    Ok(rows)
}

fn sparse_hstack(blocks: &[FeatureMatrix]) -> std::result::Result<CsrMatrix, StackFailure> {
    if !blocks.iter().any(FeatureMatrix::is_sparse) {
        return Err(StackFailure::NotApplicable);
    }
    let rows = check_rows(blocks)?;
    let converted: Vec<CsrMatrix> = blocks
        .iter()
        .map(|block| match block {
            FeatureMatrix::Sparse(csr) => csr.clone(),
            FeatureMatrix::Dense(dense) => CsrMatrix::from_dense(dense.view()),
        })
        .collect();
    let total_cols = converted.iter().map(CsrMatrix::n_cols).sum();

    let mut out = CsrMatrix::with_columns(total_cols);
    for row in 0..rows {
        let mut entries = Vec::new();
        let mut offset = 0;
        for block in &converted {
            entries.extend(block.row(row).map(|(col, value)| (col + offset, value)));
            offset += block.n_cols();
        }
        out.push_row(entries);
    }
    Ok(out)
}

fn dense_hstack(blocks: &[FeatureMatrix]) -> std::result::Result<Array2<f64>, StackFailure> {
    check_rows(blocks)?;
    let dense: Vec<Array2<f64>> = blocks.iter().map(FeatureMatrix::to_dense).collect();
    let views: Vec<ArrayView2<'_, f64>> = dense.iter().map(Array2::view).collect();
    concatenate(Axis(1), &views).map_err(|err| StackFailure::Shape(err.to_string()))
}

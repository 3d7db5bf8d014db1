//! Preprocessing for mixed categorical and continuous tabular data.
//!
//! [`IcyScaler`] splits a polars `DataFrame` into categorical columns, which
//! are label-encoded and one-hot encoded, and continuous columns, which are
//! shifted, Box-Cox transformed and min-max scaled. The result is a single
//! [`FeatureMatrix`] with the categorical block first.
//!
//! ```
//! use icy_scaler::{ColumnOverrides, IcyScaler};
//! use polars::prelude::df;
//!
//! let train = df!("grade" => ["A", "B", "A"], "score" => [0.0, 3.5, 9.0]).unwrap();
//! let fitted = IcyScaler::new().fit(&train).unwrap();
//!
//! let only_scores = ColumnOverrides::none().with_categorical(Vec::<String>::new());
//! let out = fitted.transform_with_columns(&train, &only_scores).unwrap();
//! assert_eq!(out.shape(), (3, 1));
//! ```

pub mod columns;
pub mod config;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod matrix;
pub mod pipeline;
pub mod power;
pub mod scaling;

pub use columns::{ColumnClassifier, ColumnOverrides, ColumnSelection};
pub use config::{BOXCOX_SHIFT, ScalerConfig};
pub use encoding::{CategoricalEncoder, LabelEncoder, OneHotEncoder};
pub use error::{Result, ScalerError};
pub use matrix::{CsrMatrix, FeatureMatrix, hstack};
pub use pipeline::{FittedIcyScaler, IcyScaler};
pub use power::{BoxCoxScaler, FittedBoxCoxScaler};
pub use scaling::{FittedMinMaxScaler, MinMaxScaler};

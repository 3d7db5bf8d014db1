//! Scaler configuration.

use tracing::Level;
use tracing::level_filters::LevelFilter;

use crate::error::{Result, ScalerError};

/// Constant added to every continuous value before the Box-Cox transform.
pub const BOXCOX_SHIFT: f64 = 0.01;

/// Default target range of the min-max stage.
pub const DEFAULT_FEATURE_RANGE: (f64, f64) = (0.0, 1.0);

/// Configuration shared by the pipeline and its components.
///
/// The library never installs a `tracing` subscriber. `verbose` only gates
/// which events the pipeline emits; where they go is up to the application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalerConfig {
    /// Most verbose level the pipeline emits (default `INFO`).
    pub verbose: LevelFilter,
    /// Target range of the min-max stage.
    pub feature_range: (f64, f64),
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            verbose: LevelFilter::INFO,
            feature_range: DEFAULT_FEATURE_RANGE,
        }
    }
}

impl ScalerConfig {
    /// Set the verbosity directly.
    #[must_use]
    pub fn with_verbose(mut self, verbose: LevelFilter) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the verbosity from a level name such as `"INFO"` or `"debug"`.
    ///
    /// `WARNING` and `CRITICAL` are accepted as aliases of `WARN` and `ERROR`.
    pub fn with_verbose_name(self, name: &str) -> Result<Self> {
        Ok(self.with_verbose(parse_level_name(name)?))
    }

    /// Set the min-max target range.
    pub fn with_feature_range(mut self, min: f64, max: f64) -> Result<Self> {
        validate_range(min, max)?;
        self.feature_range = (min, max);
        Ok(self)
    }

    /// Returns true if events at `level` should be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.verbose
    }
}

/// Parse a level name into a [`LevelFilter`].
pub fn parse_level_name(name: &str) -> Result<LevelFilter> {
    let trimmed = name.trim();
    let normalized = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else if trimmed.eq_ignore_ascii_case("critical") {
        "error"
    } else {
        trimmed
    };
    normalized
        .parse::<LevelFilter>()
        .map_err(|_| ScalerError::configuration(format!("unknown verbosity level '{name}'")))
}

pub(crate) fn validate_range(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return Err(ScalerError::configuration(format!(
            "feature range must satisfy min < max, got ({min}, {max})"
        )));
    }
    Ok(())
}

//! Rating configuration.
//!
//! Loaded from a JSON file; every field has a default that reproduces the
//! reference behavior. Resolution order is an explicit path, then the
//! `SFA_CONFIG` environment variable, then built-in defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::partition::{CapThresholds, MidTierRule};
use crate::pipeline::FailurePolicy;
use crate::stats::StatisticsOptions;
use crate::{CoreError, Exchange, Grade, ValidationError};

pub const CONFIG_ENV_VAR: &str = "SFA_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatingConfig {
    /// Exchanges that use the primary-market thresholds.
    pub primary_exchanges: Vec<Exchange>,
    pub primary_thresholds: CapThresholds,
    pub default_thresholds: CapThresholds,
    pub mid_tier_rule: MidTierRule,
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub dispersion_divisor: f64,
    /// Grade returned when a value beats no rung of the ladder.
    pub fallback_grade: Grade,
    pub rating_scale: f64,
    pub rating_precision: u32,
    pub failure_policy: FailurePolicy,
}

impl Default for RatingConfig {
    fn default() -> Self {
        let statistics = StatisticsOptions::default();
        Self {
            primary_exchanges: vec![Exchange::known("BSE"), Exchange::known("NSE")],
            primary_thresholds: CapThresholds::PRIMARY_MARKET,
            default_thresholds: CapThresholds::DEFAULT_MARKET,
            mid_tier_rule: MidTierRule::Legacy,
            low_percentile: statistics.low_percentile,
            high_percentile: statistics.high_percentile,
            dispersion_divisor: statistics.dispersion_divisor,
            fallback_grade: Grade::C,
            rating_scale: 3.5,
            rating_precision: 2,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl RatingConfig {
    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let raw = fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), "loaded rating config");
        Ok(config)
    }

    /// Explicit path, else `SFA_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, CoreError> {
        match explicit.map(Path::to_path_buf).or_else(config_path_from_env) {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn statistics_options(&self) -> StatisticsOptions {
        StatisticsOptions {
            low_percentile: self.low_percentile,
            high_percentile: self.high_percentile,
            dispersion_divisor: self.dispersion_divisor,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.primary_exchanges.is_empty() {
            return Err(invalid("primary_exchanges", "must name at least one exchange"));
        }
        validate_thresholds("primary_thresholds", self.primary_thresholds)?;
        validate_thresholds("default_thresholds", self.default_thresholds)?;

        for (field, value) in [
            ("low_percentile", self.low_percentile),
            ("high_percentile", self.high_percentile),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be within [0, 1]"));
            }
        }
        if self.low_percentile > self.high_percentile {
            return Err(invalid(
                "low_percentile",
                "must not exceed high_percentile",
            ));
        }
        if !(self.dispersion_divisor.is_finite() && self.dispersion_divisor > 0.0) {
            return Err(invalid("dispersion_divisor", "must be finite and positive"));
        }
        if !(self.rating_scale.is_finite() && self.rating_scale > 0.0) {
            return Err(invalid("rating_scale", "must be finite and positive"));
        }
        if self.rating_precision > 10 {
            return Err(invalid("rating_precision", "must be at most 10"));
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    let path = PathBuf::from(env::var_os(CONFIG_ENV_VAR)?);
    (!path.as_os_str().is_empty()).then_some(path)
}

fn validate_thresholds(field: &'static str, thresholds: CapThresholds) -> Result<(), ValidationError> {
    if !(thresholds.lower.is_finite() && thresholds.upper.is_finite()) {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if thresholds.lower >= thresholds.upper {
        return Err(invalid(field, "lower must be below upper"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        field,
        reason: reason.to_owned(),
    }
}

//! Engine configuration from `PEAKFORM_*` environment variables

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::metrics::OneRmFormula;

pub const DEFAULT_TREND_THRESHOLD: f64 = 0.02;
pub const DEFAULT_ANALYSIS_WINDOW_DAYS: u32 = 28;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Relative change that counts as a trend
    pub trend_threshold: f64,
    pub analysis_window_days: u32,
    /// Overrides the experience-based deload cadence
    pub deload_cadence_weeks: Option<u32>,
    pub embed_deload: bool,
    pub one_rm_formula: OneRmFormula,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_threshold: DEFAULT_TREND_THRESHOLD,
            analysis_window_days: DEFAULT_ANALYSIS_WINDOW_DAYS,
            deload_cadence_weeks: None,
            embed_deload: false,
            one_rm_formula: OneRmFormula::Brzycki,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let trend_threshold = parse(&lookup, "PEAKFORM_TREND_THRESHOLD")?.unwrap_or(defaults.trend_threshold);
        if !(0.0..1.0).contains(&trend_threshold) {
            return Err(ConfigError::ValueOutOfRange("PEAKFORM_TREND_THRESHOLD must be in [0, 1)"));
        }

        let analysis_window_days =
            parse(&lookup, "PEAKFORM_ANALYSIS_WINDOW_DAYS")?.unwrap_or(defaults.analysis_window_days);
        if !(7..=365).contains(&analysis_window_days) {
            return Err(ConfigError::ValueOutOfRange("PEAKFORM_ANALYSIS_WINDOW_DAYS must be in 7..=365"));
        }

        let deload_cadence_weeks: Option<u32> = parse(&lookup, "PEAKFORM_DELOAD_CADENCE_WEEKS")?;
        if deload_cadence_weeks.is_some_and(|weeks| !(2..=12).contains(&weeks)) {
            return Err(ConfigError::ValueOutOfRange("PEAKFORM_DELOAD_CADENCE_WEEKS must be in 2..=12"));
        }

        let embed_deload = parse(&lookup, "PEAKFORM_EMBED_DELOAD")?.unwrap_or(defaults.embed_deload);
        let one_rm_formula = lookup("PEAKFORM_ONE_RM_FORMULA")
            .map(|name| OneRmFormula::from_name(&name))
            .unwrap_or(defaults.one_rm_formula);

        let config = Self {
            trend_threshold,
            analysis_window_days,
            deload_cadence_weeks,
            embed_deload,
            one_rm_formula,
        };
        debug!("Engine config: {:?}", config);
        Ok(config)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse { key, value }),
        _ => Ok(None),
    }
}

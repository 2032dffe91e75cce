// src/config.rs
use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::time_parse::parse_instant;

// --- Configuration & Constants ---

pub const ENV_PREFIX: &str = "ROLLCALL_";

pub const DEFAULT_GRACE_MINUTES: u32 = 5;
pub const DEFAULT_LATE_THRESHOLD_MINUTES: u32 = 240;
pub const DEFAULT_ABANDONED_GAP_MINUTES: u32 = 240;

fn default_grace() -> u32 {
    DEFAULT_GRACE_MINUTES
}
fn default_late_threshold() -> u32 {
    DEFAULT_LATE_THRESHOLD_MINUTES
}
fn default_abandoned_gap() -> u32 {
    DEFAULT_ABANDONED_GAP_MINUTES
}

/// Thresholds used by the classifier. All values are in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Lateness still counted as on time.
    #[serde(default = "default_grace")]
    pub grace_minutes: u32,
    /// Lateness beyond which the shift counts as missed.
    #[serde(default = "default_late_threshold")]
    pub late_threshold_minutes: u32,
    /// Elapsed-minus-logged shortfall that marks a running shift abandoned.
    #[serde(default = "default_abandoned_gap")]
    pub abandoned_gap_minutes: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdPreset::Standard.thresholds()
    }
}

/// Named threshold sets observed in deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPreset {
    /// Four hours for both the no-show and abandonment cut-offs.
    #[default]
    Standard,
    /// Two hours for both cut-offs.
    Strict,
}

impl ThresholdPreset {
    pub fn thresholds(&self) -> ThresholdConfig {
        match self {
            ThresholdPreset::Standard => ThresholdConfig {
                grace_minutes: DEFAULT_GRACE_MINUTES,
                late_threshold_minutes: 240,
                abandoned_gap_minutes: 240,
            },
            ThresholdPreset::Strict => ThresholdConfig {
                grace_minutes: DEFAULT_GRACE_MINUTES,
                late_threshold_minutes: 120,
                abandoned_gap_minutes: 120,
            },
        }
    }
}

impl ThresholdConfig {
    /// Loads `.env` if present, then reads `ROLLCALL_*` overrides.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Reads `ROLLCALL_*` keys from an explicit variable set; unset keys
    /// keep their defaults.
    pub fn from_vars<I>(vars: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: ThresholdConfig = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        debug!("Thresholds from environment: {:?}", config);
        Ok(config)
    }

    /// Applies per-field overrides, typically from the command line.
    pub fn with_overrides(
        mut self,
        grace: Option<u32>,
        late_threshold: Option<u32>,
        abandoned_gap: Option<u32>,
    ) -> Self {
        if let Some(g) = grace {
            self.grace_minutes = g;
        }
        if let Some(l) = late_threshold {
            self.late_threshold_minutes = l;
        }
        if let Some(a) = abandoned_gap {
            self.abandoned_gap_minutes = a;
        }
        self
    }
}

/// Evaluation instant plus thresholds.
///
/// `now` is a wall-clock reading in the site's local time, the same clock in
/// which shift and clock-in times are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationContext {
    pub now: NaiveDateTime,
    pub thresholds: ThresholdConfig,
}

impl ClassificationContext {
    pub fn new(now: NaiveDateTime, thresholds: ThresholdConfig) -> Self {
        info!(
            "Classification context: now={}, grace={}m, late_threshold={}m, abandoned_gap={}m",
            now,
            thresholds.grace_minutes,
            thresholds.late_threshold_minutes,
            thresholds.abandoned_gap_minutes
        );
        Self { now, thresholds }
    }

    /// Context with the standard thresholds.
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now,
            thresholds: ThresholdConfig::default(),
        }
    }

    /// Context evaluated at the local wall clock.
    pub fn now_local(thresholds: ThresholdConfig) -> Self {
        Self::new(chrono::Local::now().naive_local(), thresholds)
    }
}

/// Parses an evaluation instant given on the command line.
pub fn parse_now(value: &str) -> AppResult<NaiveDateTime> {
    parse_instant(value).ok_or_else(|| AppError::InvalidNow(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_is_standard_preset() {
        let config = ThresholdConfig::default();
        assert_eq!(config.grace_minutes, 5);
        assert_eq!(config.late_threshold_minutes, 240);
        assert_eq!(config.abandoned_gap_minutes, 240);
    }

    #[test]
    fn test_strict_preset() {
        let config = ThresholdPreset::Strict.thresholds();
        assert_eq!(config.late_threshold_minutes, 120);
        assert_eq!(config.abandoned_gap_minutes, 120);
        assert_eq!(config.grace_minutes, DEFAULT_GRACE_MINUTES);
    }

    #[test]
    fn test_from_vars_defaults_when_unset() {
        let config = ThresholdConfig::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(config, ThresholdConfig::default());
    }

    #[test]
    fn test_from_vars_reads_prefixed_keys() {
        let config = ThresholdConfig::from_vars(vars(&[
            ("ROLLCALL_GRACE_MINUTES", "10"),
            ("ROLLCALL_LATE_THRESHOLD_MINUTES", "90"),
        ]))
        .unwrap();
        assert_eq!(config.grace_minutes, 10);
        assert_eq!(config.late_threshold_minutes, 90);
        assert_eq!(config.abandoned_gap_minutes, DEFAULT_ABANDONED_GAP_MINUTES);
    }

    #[test]
    fn test_from_vars_rejects_non_numeric() {
        let result = ThresholdConfig::from_vars(vars(&[("ROLLCALL_GRACE_MINUTES", "five")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides_apply_only_given_fields() {
        let config = ThresholdConfig::default().with_overrides(Some(0), None, Some(30));
        assert_eq!(config.grace_minutes, 0);
        assert_eq!(config.late_threshold_minutes, 240);
        assert_eq!(config.abandoned_gap_minutes, 30);
    }

    #[test]
    fn test_parse_now() {
        assert!(parse_now("2025-11-17T12:00:00").is_ok());
        assert!(matches!(parse_now("noon"), Err(AppError::InvalidNow(_))));
    }
}

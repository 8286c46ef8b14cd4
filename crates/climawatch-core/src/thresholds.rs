use crate::error::{ClimaError, Result};
use crate::reading::Reading;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const REASON_HUMIDITY_LOW: &str = "CRÍTICO - niveles MUY BAJOS de humedad";
pub const REASON_HUMIDITY_HIGH: &str = "CRÍTICO - niveles MUY ALTOS de humedad";
pub const REASON_TEMPERATURE_LOW: &str = "CRÍTICO - niveles MUY BAJOS de temperatura";
pub const REASON_TEMPERATURE_HIGH: &str = "CRÍTICO - niveles MUY ALTOS de temperatura";

// ---------------------------------------------------------------------------
// ThresholdConfig
// ---------------------------------------------------------------------------

/// Humidity (%) and temperature (°C) bands.
///
/// Only the `very_low` and `high` bounds gate criticality. `hum_low` and
/// `temp_low` are accepted and reported but not read by any check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_hum_very_low")]
    pub hum_very_low: i64,
    #[serde(default = "default_hum_low")]
    pub hum_low: i64,
    #[serde(default = "default_hum_optimal")]
    pub hum_optimal: i64,
    #[serde(default = "default_hum_high")]
    pub hum_high: i64,
    #[serde(default = "default_temp_very_low")]
    pub temp_very_low: i64,
    #[serde(default = "default_temp_low")]
    pub temp_low: i64,
    #[serde(default = "default_temp_optimal")]
    pub temp_optimal: i64,
    #[serde(default = "default_temp_high")]
    pub temp_high: i64,
}

fn default_hum_very_low() -> i64 {
    20
}

fn default_hum_low() -> i64 {
    40
}

fn default_hum_optimal() -> i64 {
    60
}

fn default_hum_high() -> i64 {
    80
}

fn default_temp_very_low() -> i64 {
    10
}

fn default_temp_low() -> i64 {
    15
}

fn default_temp_optimal() -> i64 {
    25
}

fn default_temp_high() -> i64 {
    30
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hum_very_low: default_hum_very_low(),
            hum_low: default_hum_low(),
            hum_optimal: default_hum_optimal(),
            hum_high: default_hum_high(),
            temp_very_low: default_temp_very_low(),
            temp_low: default_temp_low(),
            temp_optimal: default_temp_optimal(),
            temp_high: default_temp_high(),
        }
    }
}

impl ThresholdConfig {
    /// Load thresholds from a YAML file. Keys absent from the file keep
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: ThresholdConfig = serde_yaml::from_str(&data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        check_band(
            "humidity",
            self.hum_very_low,
            self.hum_optimal,
            self.hum_high,
        )?;
        check_band(
            "temperature",
            self.temp_very_low,
            self.temp_optimal,
            self.temp_high,
        )
    }

    pub fn humidity_out_of_range(&self, humidity: i64) -> bool {
        humidity < self.hum_very_low || humidity > self.hum_high
    }

    pub fn temperature_out_of_range(&self, temperature: i64) -> bool {
        temperature < self.temp_very_low || temperature > self.temp_high
    }
}

fn check_band(name: &str, very_low: i64, optimal: i64, high: i64) -> Result<()> {
    if very_low > high {
        return Err(ClimaError::InvalidThresholds(format!(
            "{name}: very_low ({very_low}) supera a high ({high})"
        )));
    }
    if optimal < very_low || optimal > high {
        return Err(ClimaError::InvalidThresholds(format!(
            "{name}: optimal ({optimal}) fuera de [{very_low}, {high}]"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalAssessment {
    pub is_critical: bool,
    pub reasons: Vec<String>,
}

impl CriticalAssessment {
    fn clear() -> Self {
        Self {
            is_critical: false,
            reasons: Vec::new(),
        }
    }
}

/// Check a reading against the critical bounds.
///
/// A missing value means the reading cannot be assessed and is never
/// critical. Bounds are strict: a value equal to a bound is in range.
pub fn assess(
    humidity: Option<i64>,
    temperature: Option<i64>,
    cfg: &ThresholdConfig,
) -> CriticalAssessment {
    let (Some(h), Some(t)) = (humidity, temperature) else {
        return CriticalAssessment::clear();
    };

    let checks = [
        (h < cfg.hum_very_low, REASON_HUMIDITY_LOW),
        (h > cfg.hum_high, REASON_HUMIDITY_HIGH),
        (t < cfg.temp_very_low, REASON_TEMPERATURE_LOW),
        (t > cfg.temp_high, REASON_TEMPERATURE_HIGH),
    ];
    let reasons: Vec<String> = checks
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, reason)| reason.to_string())
        .collect();

    CriticalAssessment {
        is_critical: !reasons.is_empty(),
        reasons,
    }
}

/// Body of the outbound alert for a critical reading.
pub fn alert_text(reasons: &[String], reading: &Reading) -> String {
    format!(
        "{}\nH:{}%  T:{}C\n{}",
        reasons.join(" | "),
        display_opt(reading.humidity),
        display_opt(reading.temperature),
        reading.created_at.as_deref().unwrap_or("None"),
    )
}

fn display_opt(value: Option<i64>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

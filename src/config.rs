//! Configuration for the detection engine
//!
//! Loads configuration from a TOML file. Every field has an in-code default
//! matching the tuned production constants, so the engine runs with no file
//! present and partial files only override what they name.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub hysteresis: HysteresisConfig,
    pub stability: StabilityConfig,
    pub calibration: CalibrationConfig,
    pub metrics: MetricsConfig,
}

/// Feature extraction and classification thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Tilt angle above which an opening is classified opened. Default: 30.0 degrees
    pub open_angle_degrees: f32,
    /// Tilt angle below which the closed branch applies. Default: 15.0 degrees
    pub closed_angle_degrees: f32,
    /// Minimum |z| required together with a small angle to classify closed. Default: 0.9
    pub closed_z_minimum: f32,
    /// Soft per-sample processing budget. Exceeding it logs a warning. Default: 25 ms
    pub budget_ms: u64,
    /// Per-sensor bounded buffer size for recent samples. Default: 50
    pub sample_window: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            open_angle_degrees: 30.0,
            closed_angle_degrees: 15.0,
            closed_z_minimum: 0.9,
            budget_ms: 25,
            sample_window: 50,
        }
    }
}

/// State debounce thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HysteresisConfig {
    /// Minimum angle change before a state transition is accepted. Default: 2.0 degrees
    pub threshold_degrees: f32,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            threshold_degrees: 2.0,
        }
    }
}

/// Position stability analysis thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Largest acceptable per-axis variance. Default: 1.0
    pub max_variance: f32,
    /// Observation window for live-mode analysis. Default: 30.0 seconds
    pub window_seconds: f32,
    /// Minimum samples required for a variance estimate. Default: 3
    pub min_samples: usize,
    /// Samples used when more are available (most recent win). Default: 10
    pub preferred_samples: usize,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            max_variance: 1.0,
            window_seconds: 30.0,
            min_samples: 3,
            preferred_samples: 10,
        }
    }
}

/// Calibration protocol parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Per-axis tolerance around the closed reference. Default: 0.5 device units
    pub tolerance: f32,
    /// Device range limit; components with |value| above it are rejected. Default: 127.0
    pub axis_limit: f32,
    /// Retired calibration records kept per sensor, oldest evicted. Default: 10
    pub history_limit: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            axis_limit: 127.0,
            history_limit: 10,
        }
    }
}

/// Accuracy tracking parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Rolling window of (state, confidence) observations per sensor. Default: 100
    pub window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { window: 100 }
    }
}

impl EngineConfig {
    /// Load configuration from TOML file
    ///
    /// # Arguments
    /// - `path`: Path to TOML configuration file
    ///
    /// # Returns
    /// Parsed configuration or error
    ///
    /// # Example
    /// ```no_run
    /// use dvara_sense::config::EngineConfig;
    ///
    /// let config = EngineConfig::from_file("dvara.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: EngineConfig =
            toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to TOML file
    ///
    /// # Arguments
    /// - `path`: Path to save TOML configuration file
    ///
    /// # Returns
    /// Success or error
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

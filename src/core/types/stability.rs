//! Position stability assessment type.

use serde::{Deserialize, Serialize};

/// Assessment of how trustworthy a sensor's recent position readings are.
///
/// Produced by variance analysis over the recent sample window (live mode)
/// or by the motion-event gate (calibration mode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// Whether the position is considered trustworthy.
    pub stable: bool,
    /// Variance of the x component across the analyzed samples.
    pub variance_x: f32,
    /// Variance of the y component across the analyzed samples.
    pub variance_y: f32,
    /// Variance of the z component across the analyzed samples.
    pub variance_z: f32,
    /// Overall stability score in [0, 1]; 1.0 means motionless.
    pub overall_stability: f32,
    /// Number of samples the assessment is based on.
    pub sample_count: usize,
    /// Time span covered by the analyzed samples, in seconds.
    pub observation_period_s: f32,
    /// Present when the assessment could not be completed normally.
    pub reason: Option<String>,
}

impl StabilityReport {
    /// Report for a sensor without enough samples to analyze.
    pub fn insufficient(sample_count: usize) -> Self {
        Self {
            stable: false,
            variance_x: 0.0,
            variance_y: 0.0,
            variance_z: 0.0,
            overall_stability: 0.0,
            sample_count,
            observation_period_s: 0.0,
            reason: Some("insufficient data".to_string()),
        }
    }

    /// Largest per-axis variance in the report.
    #[inline]
    pub fn max_variance(&self) -> f32 {
        self.variance_x.max(self.variance_y).max(self.variance_z)
    }
}

//! Feature extraction from raw acceleration samples.
//!
//! Converts a tri-axial sample into the quantities the classifier works
//! with: vector magnitude, tilt angle from the vertical reference axis, and
//! a signal-clarity score that discounts ambiguous low-amplitude readings.

use crate::core::types::PositionSample;

/// Floor applied to the acceleration magnitude to avoid division by zero.
const MAGNITUDE_FLOOR: f32 = 0.001;

/// Clarity for small-but-present motion near the vertical rest position.
const NEAR_REST_CLARITY: f32 = 0.85;
/// Clarity when no axis carries a meaningful signal.
const QUIET_CLARITY: f32 = 0.8;
/// Peak amplitude above which the signal is treated as fully clear.
const STRONG_SIGNAL_PEAK: f32 = 0.5;
/// Peak amplitude below which the signal is treated as quiet.
const QUIET_SIGNAL_PEAK: f32 = 0.1;

/// Features extracted from a single sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleFeatures {
    /// Acceleration vector magnitude in device units, floored at 0.001.
    pub magnitude: f32,
    /// Tilt angle from the vertical reference axis, in degrees.
    pub angle_degrees: f32,
    /// Signal-clarity multiplier in [0.8, 1.0].
    pub clarity: f32,
    /// Magnitude of the horizontal (x, y) component.
    pub horizontal: f32,
}

/// Extract classification features from a raw sample.
///
/// The tilt angle is measured between the acceleration vector and the axis
/// that is vertical when the opening is closed, so a closed opening at rest
/// reads near 0 degrees.
pub fn extract(sample: &PositionSample) -> SampleFeatures {
    let magnitude = (sample.x * sample.x + sample.y * sample.y + sample.z * sample.z)
        .sqrt()
        .max(MAGNITUDE_FLOOR);

    // Rounding can push |z|/magnitude a hair above 1, outside acos's domain.
    let vertical_ratio = (sample.z.abs() / magnitude).min(1.0);
    let angle_degrees = vertical_ratio.acos().to_degrees();

    let horizontal = (sample.x * sample.x + sample.y * sample.y).sqrt();

    SampleFeatures {
        magnitude,
        angle_degrees,
        clarity: signal_clarity(sample),
        horizontal,
    }
}

/// Heuristic clarity score for a sample.
///
/// Tuned against reference measurements; the thresholds are policy, not
/// physics.
fn signal_clarity(sample: &PositionSample) -> f32 {
    let ax = sample.x.abs();
    let ay = sample.y.abs();
    let az = sample.z.abs();
    let peak = sample.peak_component();

    if ax < QUIET_SIGNAL_PEAK && ay < QUIET_SIGNAL_PEAK && az > 0.95 {
        // Small-but-present motion near vertical: weak signal, not certainty.
        NEAR_REST_CLARITY
    } else if peak > STRONG_SIGNAL_PEAK {
        1.0
    } else if peak < QUIET_SIGNAL_PEAK {
        QUIET_CLARITY
    } else {
        // Linear ramp between the quiet and strong bands.
        0.9 + (peak - QUIET_SIGNAL_PEAK) * 0.25
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_near_vertical_sample() {
        let sample = PositionSample::new(0.05, 0.03, 0.98, 0);
        let features = extract(&sample);
        assert_relative_eq!(features.magnitude, 0.9817, epsilon = 1e-3);
        assert_relative_eq!(features.angle_degrees, 3.405, epsilon = 0.05);
        assert_eq!(features.clarity, NEAR_REST_CLARITY);
    }

    #[test]
    fn test_tilted_sample() {
        let sample = PositionSample::new(0.8, 0.1, 0.3, 0);
        let features = extract(&sample);
        assert_relative_eq!(features.magnitude, 0.8602, epsilon = 1e-3);
        assert_relative_eq!(features.angle_degrees, 69.59, epsilon = 0.05);
        assert_eq!(features.clarity, 1.0);
    }

    #[test]
    fn test_quiet_sample_clarity() {
        let sample = PositionSample::new(0.02, 0.01, 0.05, 0);
        let features = extract(&sample);
        assert_eq!(features.clarity, QUIET_CLARITY);
    }

    #[test]
    fn test_intermediate_clarity_ramp() {
        // Peak 0.3 sits on the ramp: 0.9 + (0.3 - 0.1) * 0.25 = 0.95
        let sample = PositionSample::new(0.3, 0.0, 0.2, 0);
        let features = extract(&sample);
        assert_relative_eq!(features.clarity, 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_vector_floors_magnitude() {
        let sample = PositionSample::new(0.0, 0.0, 0.0, 0);
        let features = extract(&sample);
        assert_eq!(features.magnitude, MAGNITUDE_FLOOR);
        assert_relative_eq!(features.angle_degrees, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_angle_never_nan_on_pure_vertical() {
        // sqrt(z*z) can round below |z|; the ratio clamp keeps acos in domain
        let sample = PositionSample::new(0.0, 0.0, 0.3, 0);
        let features = extract(&sample);
        assert!(features.angle_degrees.is_finite());
        assert_relative_eq!(features.angle_degrees, 0.0, epsilon = 0.01);
    }
}

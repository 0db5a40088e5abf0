//! Provisional state and opening-type classification.
//!
//! Maps extracted features to a closed/opened decision with a confidence
//! score, plus a coarse door/window guess. Output is provisional: the
//! hysteresis stabilizer has the final word on the published state.

use crate::config::DetectionConfig;
use crate::core::types::{OpeningKind, OpeningState, PositionSample};
use crate::detection::features::SampleFeatures;

/// Hard ceiling on any reported confidence; the model never claims
/// certainty.
pub const MAX_CONFIDENCE: f32 = 0.95;

/// Lateral x-axis amplitude that marks the opening as moving in the
/// intermediate angle band.
const LATERAL_X_THRESHOLD: f32 = 0.4;
/// Lateral y-axis amplitude that marks the opening as moving in the
/// intermediate angle band.
const LATERAL_Y_THRESHOLD: f32 = 0.3;

/// Provisional classification of one sample, before stabilization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawClassification {
    /// Provisional state of the opening.
    pub state: OpeningState,
    /// Confidence in the state, as a fraction in [0, 0.95].
    pub confidence: f32,
    /// Best-effort door/window guess.
    pub kind: OpeningKind,
}

/// Stateless per-sample classifier.
#[derive(Debug, Clone)]
pub struct StateClassifier {
    config: DetectionConfig,
}

impl StateClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Classify one sample from its extracted features.
    pub fn classify(&self, sample: &PositionSample, features: &SampleFeatures) -> RawClassification {
        let az = sample.z.abs();
        let angle = features.angle_degrees;

        let (state, base) = if angle > self.config.open_angle_degrees {
            // Large tilt: opened, more tilt means more confidence.
            (OpeningState::Opened, 0.7 + angle / 100.0)
        } else if angle < self.config.closed_angle_degrees && az > self.config.closed_z_minimum {
            // Near vertical with strong z: closed.
            (
                OpeningState::Closed,
                0.8 + (az - self.config.closed_z_minimum) * 2.0,
            )
        } else if sample.x.abs() > LATERAL_X_THRESHOLD || sample.y.abs() > LATERAL_Y_THRESHOLD {
            // Intermediate band with lateral activity: treat as opened.
            (OpeningState::Opened, 0.7)
        } else {
            (OpeningState::Closed, 0.6)
        };

        let confidence = (base.min(MAX_CONFIDENCE) * features.clarity).min(MAX_CONFIDENCE);

        RawClassification {
            state,
            confidence,
            kind: classify_kind(sample, features),
        }
    }
}

impl Default for StateClassifier {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

/// Coarse mass/mounting heuristic for the opening type.
///
/// Doors swing with large horizontal accelerations; windows sit near
/// vertical with little x-axis motion. Best-effort only.
fn classify_kind(sample: &PositionSample, features: &SampleFeatures) -> OpeningKind {
    let az = sample.z.abs();
    if features.horizontal > 0.6 && az < 0.8 {
        OpeningKind::Door
    } else if sample.x.abs() < 0.3 && az > 0.95 {
        OpeningKind::Window
    } else if features.horizontal > 0.4 {
        OpeningKind::Door
    } else {
        OpeningKind::Window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::features;
    use approx::assert_relative_eq;

    fn classify(x: f32, y: f32, z: f32) -> RawClassification {
        let sample = PositionSample::new(x, y, z, 0);
        let extracted = features::extract(&sample);
        StateClassifier::default().classify(&sample, &extracted)
    }

    #[test]
    fn test_near_vertical_is_closed() {
        let result = classify(0.05, 0.03, 0.98);
        assert_eq!(result.state, OpeningState::Closed);
        // base 0.96 caps at 0.95, clarity 0.85
        assert_relative_eq!(result.confidence, 0.8075, epsilon = 1e-4);
        assert_eq!(result.kind, OpeningKind::Window);
    }

    #[test]
    fn test_large_tilt_is_opened() {
        let result = classify(0.8, 0.1, 0.3);
        assert_eq!(result.state, OpeningState::Opened);
        assert_relative_eq!(result.confidence, 0.95, epsilon = 1e-6);
        assert_eq!(result.kind, OpeningKind::Door);
    }

    #[test]
    fn test_intermediate_band_with_lateral_activity() {
        // angle ~27.3 degrees, |x| above the lateral threshold
        let result = classify(0.45, 0.0, 0.87);
        assert_eq!(result.state, OpeningState::Opened);
        assert_relative_eq!(result.confidence, 0.7, epsilon = 1e-6);
    }

    #[test]
    fn test_intermediate_band_at_rest() {
        // angle ~20.4 degrees, no lateral activity
        let result = classify(0.2, 0.1, 0.6);
        assert_eq!(result.state, OpeningState::Closed);
        assert_relative_eq!(result.confidence, 0.6, epsilon = 1e-6);
        assert_eq!(result.kind, OpeningKind::Window);
    }

    #[test]
    fn test_confidence_never_exceeds_cap() {
        let result = classify(0.0, 0.0, 1.0);
        assert_eq!(result.state, OpeningState::Closed);
        assert!(result.confidence <= MAX_CONFIDENCE);
        assert_relative_eq!(result.confidence, 0.8075, epsilon = 1e-4);
    }
}

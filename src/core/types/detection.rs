//! Published detection result type.

use serde::{Deserialize, Serialize};

use super::state::{OpeningKind, OpeningState};

/// Outcome of processing one telemetry sample through the full pipeline
/// (feature extraction, classification, hysteresis stabilization).
///
/// Produced fresh per sample and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Debounced state of the opening.
    pub door_state: OpeningState,
    /// Classifier confidence as a percentage, capped at 95.
    pub confidence: f32,
    /// Best-effort door/window guess.
    pub opening_type: OpeningKind,
    /// Tilt angle from the vertical reference axis in degrees.
    pub angle_degrees: f32,
    /// Acceleration vector magnitude in device units.
    pub magnitude: f32,
    /// Wall time spent processing the sample, in microseconds.
    pub processing_time_us: u64,
}

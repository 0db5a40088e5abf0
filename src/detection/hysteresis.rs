//! Hysteresis state debounce.
//!
//! Small angle jitter around a threshold would make the raw classifier
//! flicker between states. The stabilizer suppresses any state flip that is
//! not backed by an angle movement past the hysteresis band, and only in the
//! direction that agrees with the flip.

use crate::config::HysteresisConfig;
use crate::core::types::OpeningState;

/// The last accepted reading for a sensor.
///
/// Angle and state are always written together; this pair is the entire
/// memory of the debounce state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizedReading {
    /// Tilt angle of the accepted reading, in degrees.
    pub angle_degrees: f32,
    /// Published state of the accepted reading.
    pub state: OpeningState,
}

/// Per-sensor state debouncer.
#[derive(Debug, Clone)]
pub struct HysteresisStabilizer {
    config: HysteresisConfig,
}

impl HysteresisStabilizer {
    /// Create a stabilizer with the given hysteresis band.
    pub fn new(config: HysteresisConfig) -> Self {
        Self { config }
    }

    /// Debounce one raw classification against the previous accepted
    /// reading.
    ///
    /// The first observation for a sensor (no previous reading) seeds the
    /// state machine and passes the raw state through unchanged. The
    /// returned reading becomes the new previous reading; callers must
    /// store it before processing the next sample.
    pub fn stabilize(
        &self,
        previous: Option<&StabilizedReading>,
        angle_degrees: f32,
        raw_state: OpeningState,
    ) -> StabilizedReading {
        let prev = match previous {
            Some(prev) => prev,
            None => {
                return StabilizedReading {
                    angle_degrees,
                    state: raw_state,
                }
            }
        };

        let threshold = self.config.threshold_degrees;
        let delta = (angle_degrees - prev.angle_degrees).abs();

        let state = if delta < threshold {
            // Movement inside the band: ignore the raw output entirely.
            prev.state
        } else {
            match (prev.state, raw_state) {
                (OpeningState::Closed, OpeningState::Opened) => {
                    if angle_degrees > prev.angle_degrees + threshold {
                        OpeningState::Opened
                    } else {
                        prev.state
                    }
                }
                (OpeningState::Opened, OpeningState::Closed) => {
                    if angle_degrees < prev.angle_degrees - threshold {
                        OpeningState::Closed
                    } else {
                        prev.state
                    }
                }
                _ => raw_state,
            }
        };

        StabilizedReading {
            angle_degrees,
            state,
        }
    }
}

impl Default for HysteresisStabilizer {
    fn default() -> Self {
        Self::new(HysteresisConfig::default())
    }
}

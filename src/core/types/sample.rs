//! Raw telemetry sample types.

use serde::{Deserialize, Serialize};

/// A single tri-axial acceleration sample in raw device units.
///
/// Components are in the device range [-127, 127], not SI units. The z axis
/// is vertical when the opening is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// X-axis component in device units
    pub x: f32,
    /// Y-axis component in device units
    pub y: f32,
    /// Z-axis component in device units
    pub z: f32,
    /// Sample timestamp in microseconds
    pub timestamp_us: u64,
}

impl PositionSample {
    /// Create a new sample.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32, timestamp_us: u64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_us,
        }
    }

    /// Whether all three components are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Largest absolute component across the three axes.
    #[inline]
    pub fn peak_component(&self) -> f32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

impl Default for PositionSample {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            timestamp_us: 0,
        }
    }
}

//! Persisted calibration record types.

use serde::{Deserialize, Serialize};

use super::sample::PositionSample;

/// The stored (x, y, z) position representing an opening's closed state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePosition {
    /// X-axis component in device units
    pub x: f32,
    /// Y-axis component in device units
    pub y: f32,
    /// Z-axis component in device units
    pub z: f32,
}

impl ReferencePosition {
    /// Create a new reference position.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Largest per-axis absolute difference to a live position.
    #[inline]
    pub fn max_axis_delta(&self, live: &PositionSample) -> f32 {
        let dx = (live.x - self.x).abs();
        let dy = (live.y - self.y).abs();
        let dz = (live.z - self.z).abs();
        dx.max(dy).max(dz)
    }
}

impl From<PositionSample> for ReferencePosition {
    fn from(sample: PositionSample) -> Self {
        Self {
            x: sample.x,
            y: sample.y,
            z: sample.z,
        }
    }
}

/// One active calibration for a sensor.
///
/// Created only through the stability-gated calibration protocol and
/// replaced atomically; prior records move into the bounded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    /// Reference position captured while the opening was closed.
    pub closed_reference: ReferencePosition,
    /// Per-axis tolerance around the reference, in device units.
    pub tolerance: f32,
    /// Confidence in the reference, in [0, 1]. Equals the stability score
    /// measured at calibration time.
    pub confidence: f32,
    /// Wall-clock calibration time in microseconds since the Unix epoch.
    pub calibrated_at_us: u64,
    /// Who or what requested the calibration.
    pub calibrated_by: String,
}

/// A retired calibration record with the reason it was retired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The retired record.
    pub record: CalibrationRecord,
    /// Why it was retired ("replaced", or a caller-supplied reset reason).
    pub reason: String,
    /// When it was retired, in microseconds since the Unix epoch.
    pub retired_at_us: u64,
}

/// Everything persisted for one sensor: the active calibration (if any),
/// the bounded history of retired records, and a lifetime counter.
///
/// This is the atomic unit of storage replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorCalibration {
    /// Active calibration record, if the sensor is calibrated.
    pub active: Option<CalibrationRecord>,
    /// Retired records, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Total calibrations ever performed for this sensor.
    pub calibration_count: u32,
}

impl SensorCalibration {
    /// Append a retired record, evicting the oldest entries beyond `limit`.
    pub fn push_history(&mut self, entry: HistoryEntry, limit: usize) {
        self.history.push(entry);
        while self.history.len() > limit {
            self.history.remove(0);
        }
    }
}

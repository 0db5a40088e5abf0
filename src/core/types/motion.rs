//! Discrete motion events reported by the sensor hardware.
//!
//! Door/window sensors emit a motion-started event when the accelerometer
//! wakes and a motion-stopped event once readings settle. The calibration
//! gate uses the pair to find a verified motionless interval.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a discrete motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionEventKind {
    /// Accelerometer woke up; the opening is moving.
    #[serde(rename = "motion-started")]
    Started,
    /// Readings settled; the opening came to rest.
    #[serde(rename = "motion-stopped")]
    Stopped,
}

impl fmt::Display for MotionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionEventKind::Started => write!(f, "motion-started"),
            MotionEventKind::Stopped => write!(f, "motion-stopped"),
        }
    }
}

/// A timestamped motion event for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Event kind.
    pub kind: MotionEventKind,
    /// Event timestamp in microseconds.
    pub timestamp_us: u64,
}

impl MotionEvent {
    /// Create a new motion event.
    #[inline]
    pub fn new(kind: MotionEventKind, timestamp_us: u64) -> Self {
        Self { kind, timestamp_us }
    }
}

/// Latest motion-event timestamps for one sensor.
///
/// Only the most recent event of each kind matters for the calibration
/// gate, so the timeline keeps two timestamps rather than an event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionTimeline {
    /// Timestamp of the most recent motion-started event.
    pub last_started_us: Option<u64>,
    /// Timestamp of the most recent motion-stopped event.
    pub last_stopped_us: Option<u64>,
}

impl MotionTimeline {
    /// Record an observed motion event.
    pub fn record(&mut self, event: MotionEvent) {
        match event.kind {
            MotionEventKind::Started => self.last_started_us = Some(event.timestamp_us),
            MotionEventKind::Stopped => self.last_stopped_us = Some(event.timestamp_us),
        }
    }

    /// Timestamp of the verified motionless interval start, if one exists.
    ///
    /// A motionless interval is the most recent motion-stopped event with no
    /// subsequent motion-started event.
    pub fn motionless_since_us(&self) -> Option<u64> {
        match (self.last_stopped_us, self.last_started_us) {
            (Some(stopped), Some(started)) if started > stopped => None,
            (Some(stopped), _) => Some(stopped),
            (None, _) => None,
        }
    }

    /// Whether a motion episode is currently in progress (started, not yet
    /// stopped).
    pub fn motion_active(&self) -> bool {
        match (self.last_started_us, self.last_stopped_us) {
            (Some(started), Some(stopped)) => started > stopped,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Whether any motion event has ever been observed.
    #[inline]
    pub fn has_events(&self) -> bool {
        self.last_started_us.is_some() || self.last_stopped_us.is_some()
    }
}

//! Per-sensor ephemeral runtime state.
//!
//! Keyed by sensor id and owned by the engine alone; nothing here is
//! persisted. A process restart starts every sensor cold, which is the
//! accepted cost of keeping the hot path free of storage reads.

use std::collections::HashMap;

use crate::core::types::{MotionTimeline, OpeningState, PositionSample};
use crate::core::window::SampleWindow;
use crate::detection::StabilizedReading;
use crate::metrics::AccuracyTracker;

/// Ephemeral state for one sensor, created lazily on first contact.
#[derive(Debug, Clone)]
pub struct SensorRuntimeState {
    /// Last accepted reading; angle and state always change together.
    pub(crate) previous: Option<StabilizedReading>,
    /// Recent telemetry samples, oldest first.
    pub(crate) recent_samples: SampleWindow<PositionSample>,
    /// Samples captured while a motion episode was active.
    pub(crate) signature_samples: SampleWindow<PositionSample>,
    /// Latest motion-event timestamps.
    pub(crate) motion: MotionTimeline,
    /// Rolling accuracy observations.
    pub(crate) accuracy: AccuracyTracker,
}

impl SensorRuntimeState {
    fn new(sample_window: usize, metrics_window: usize) -> Self {
        Self {
            previous: None,
            recent_samples: SampleWindow::new(sample_window),
            signature_samples: SampleWindow::new(sample_window),
            motion: MotionTimeline::default(),
            accuracy: AccuracyTracker::new(metrics_window),
        }
    }

    /// Record a telemetry sample into the runtime windows.
    pub(crate) fn record_sample(&mut self, sample: PositionSample) {
        self.recent_samples.push(sample);
        if self.motion.motion_active() {
            self.signature_samples.push(sample);
        }
    }

    /// Diagnostic snapshot of this sensor's runtime state.
    pub fn snapshot(&self) -> RuntimeStats {
        RuntimeStats {
            samples_buffered: self.recent_samples.len(),
            signature_samples: self.signature_samples.len(),
            seeded: self.previous.is_some(),
            previous_state: self.previous.as_ref().map(|p| p.state),
            previous_angle_degrees: self.previous.as_ref().map(|p| p.angle_degrees),
        }
    }
}

/// Diagnostic snapshot of one sensor's runtime state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeStats {
    /// Telemetry samples currently buffered.
    pub samples_buffered: usize,
    /// Samples captured during motion episodes.
    pub signature_samples: usize,
    /// Whether the hysteresis state machine has been seeded.
    pub seeded: bool,
    /// Last published state, if seeded.
    pub previous_state: Option<OpeningState>,
    /// Last accepted angle, if seeded.
    pub previous_angle_degrees: Option<f32>,
}

/// Keyed store of per-sensor runtime state.
///
/// The single owner of all ephemeral mutable state in the engine; state is
/// created lazily on first contact and destroyed only by an explicit reset.
#[derive(Debug)]
pub struct SensorStateStore {
    states: HashMap<String, SensorRuntimeState>,
    sample_window: usize,
    metrics_window: usize,
}

impl SensorStateStore {
    /// Create an empty store with the given window sizes.
    pub fn new(sample_window: usize, metrics_window: usize) -> Self {
        Self {
            states: HashMap::new(),
            sample_window,
            metrics_window,
        }
    }

    /// Mutable state for a sensor, created lazily.
    pub fn entry(&mut self, sensor: &str) -> &mut SensorRuntimeState {
        let (sample_window, metrics_window) = (self.sample_window, self.metrics_window);
        self.states
            .entry(sensor.to_string())
            .or_insert_with(|| SensorRuntimeState::new(sample_window, metrics_window))
    }

    /// State for a sensor, if it has been seen.
    pub fn get(&self, sensor: &str) -> Option<&SensorRuntimeState> {
        self.states.get(sensor)
    }

    /// Destroy a sensor's state. Returns whether state existed.
    pub fn remove(&mut self, sensor: &str) -> bool {
        self.states.remove(sensor).is_some()
    }

    /// Sensor ids with live runtime state, sorted.
    pub fn sensors(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.states.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MotionEvent, MotionEventKind};

    #[test]
    fn test_entry_creates_lazily() {
        let mut store = SensorStateStore::new(50, 100);
        assert!(store.get("door-1").is_none());
        store.entry("door-1");
        assert!(store.get("door-1").is_some());
        assert_eq!(store.sensors(), vec!["door-1".to_string()]);
    }

    #[test]
    fn test_signature_samples_only_during_motion() {
        let mut store = SensorStateStore::new(50, 100);
        let state = store.entry("door-1");

        state.record_sample(PositionSample::new(0.1, 0.1, 0.9, 0));
        assert_eq!(state.signature_samples.len(), 0);

        state.motion.record(MotionEvent::new(MotionEventKind::Started, 1));
        state.record_sample(PositionSample::new(0.5, 0.2, 0.7, 2));
        assert_eq!(state.signature_samples.len(), 1);

        state.motion.record(MotionEvent::new(MotionEventKind::Stopped, 3));
        state.record_sample(PositionSample::new(0.1, 0.1, 0.9, 4));
        assert_eq!(state.signature_samples.len(), 1);
        assert_eq!(state.recent_samples.len(), 3);
    }

    #[test]
    fn test_remove_destroys_state() {
        let mut store = SensorStateStore::new(50, 100);
        store.entry("door-1");
        assert!(store.remove("door-1"));
        assert!(!store.remove("door-1"));
        assert!(store.get("door-1").is_none());
    }

    #[test]
    fn test_snapshot_unseeded() {
        let mut store = SensorStateStore::new(50, 100);
        let stats = store.entry("door-1").snapshot();
        assert!(!stats.seeded);
        assert_eq!(stats.previous_state, None);
        assert_eq!(stats.samples_buffered, 0);
    }
}

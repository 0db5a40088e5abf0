//! Rolling detection accuracy metrics.
//!
//! Tracks (state, confidence) observations per sensor over a bounded window
//! and derives an accuracy estimate from average confidence and how often
//! the published state flips. Purely observational; nothing here feeds back
//! into classification.

use crate::core::types::OpeningState;
use crate::core::window::SampleWindow;
use crate::detection::MAX_CONFIDENCE;

/// One recorded detection observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateObservation {
    /// Published (stabilized) state.
    pub state: OpeningState,
    /// Reported confidence as a percentage.
    pub confidence: f32,
    /// Sample timestamp in microseconds.
    pub timestamp_us: u64,
}

/// Aggregate accuracy metrics for one sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccuracyMetrics {
    /// Derived accuracy estimate in [0, 0.95].
    pub accuracy: f32,
    /// Average reported confidence over the window, as a percentage.
    pub confidence: f32,
    /// Live position stability in [0, 1].
    pub stability: f32,
    /// Observations in the window.
    pub samples: usize,
    /// State flips between consecutive observations in the window.
    pub state_changes: u32,
}

/// Bounded rolling window of detection observations.
#[derive(Debug, Clone)]
pub struct AccuracyTracker {
    window: SampleWindow<StateObservation>,
}

impl AccuracyTracker {
    /// Create a tracker holding at most `window_size` observations.
    pub fn new(window_size: usize) -> Self {
        Self {
            window: SampleWindow::new(window_size),
        }
    }

    /// Record one published detection.
    pub fn record(&mut self, state: OpeningState, confidence: f32, timestamp_us: u64) {
        self.window.push(StateObservation {
            state,
            confidence,
            timestamp_us,
        });
    }

    /// Observations currently in the window.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    /// Average reported confidence (percent) over the window.
    pub fn average_confidence(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.window.iter().map(|obs| obs.confidence).sum();
        sum / self.window.len() as f32
    }

    /// Number of state flips between consecutive observations.
    pub fn state_changes(&self) -> u32 {
        let mut changes = 0;
        let mut previous: Option<OpeningState> = None;
        for obs in self.window.iter() {
            if let Some(prev) = previous {
                if prev != obs.state {
                    changes += 1;
                }
            }
            previous = Some(obs.state);
        }
        changes
    }

    /// State flips per observation in the window.
    pub fn change_rate(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.state_changes() as f32 / self.window.len() as f32
    }

    /// Derived accuracy estimate.
    ///
    /// High average confidence with a steady state reads as accurate; a
    /// flapping state discounts the estimate. Capped at the same 0.95
    /// ceiling as detection confidence.
    pub fn accuracy_estimate(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        let average = self.average_confidence() / 100.0;
        (average * (1.0 - self.change_rate()) * 1.1).min(MAX_CONFIDENCE)
    }

    /// Drop all recorded observations.
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

//! Position stability analysis.
//!
//! Decides whether a sensor's position is trustworthy enough to calibrate
//! from. Live mode measures per-axis variance over the recent sample window;
//! calibration mode first looks for a verified motionless interval in the
//! motion-event timeline and only falls back to variance when no event
//! evidence exists.

use crate::config::StabilityConfig;
use crate::core::types::{MotionTimeline, PositionSample, StabilityReport};
use crate::core::window::SampleWindow;
use crate::error::{Error, Result};

/// Stability recorded when only unverified raw samples back a calibration.
const FALLBACK_STABILITY: f32 = 0.5;

/// Variance-based and event-based stability analysis.
#[derive(Debug, Clone)]
pub struct StabilityAnalyzer {
    config: StabilityConfig,
}

impl StabilityAnalyzer {
    /// Create an analyzer with the given thresholds.
    pub fn new(config: StabilityConfig) -> Self {
        Self { config }
    }

    /// Live-mode analysis: per-axis variance over the recent window.
    ///
    /// Uses samples within the observation window ending at the newest
    /// buffered timestamp, preferring the most recent `preferred_samples` of
    /// them. Fewer than `min_samples` usable samples means no assessment.
    pub fn analyze_live(&self, samples: &SampleWindow<PositionSample>) -> StabilityReport {
        let newest_us = match samples.latest() {
            Some(sample) => sample.timestamp_us,
            None => return StabilityReport::insufficient(0),
        };

        let window_us = (self.config.window_seconds * 1_000_000.0) as u64;
        let cutoff_us = newest_us.saturating_sub(window_us);
        let windowed: Vec<PositionSample> = samples
            .iter()
            .filter(|s| s.timestamp_us >= cutoff_us)
            .copied()
            .collect();

        let start = windowed.len().saturating_sub(self.config.preferred_samples);
        let used = &windowed[start..];
        if used.len() < self.config.min_samples {
            return StabilityReport::insufficient(used.len());
        }

        let xs: Vec<f32> = used.iter().map(|s| s.x).collect();
        let ys: Vec<f32> = used.iter().map(|s| s.y).collect();
        let zs: Vec<f32> = used.iter().map(|s| s.z).collect();
        let variance_x = axis_variance(&xs);
        let variance_y = axis_variance(&ys);
        let variance_z = axis_variance(&zs);
        let max_variance = variance_x.max(variance_y).max(variance_z);

        let overall_stability = (1.0 - max_variance / self.config.max_variance).clamp(0.0, 1.0);
        let span_us = used[used.len() - 1]
            .timestamp_us
            .saturating_sub(used[0].timestamp_us);

        StabilityReport {
            stable: max_variance <= self.config.max_variance,
            variance_x,
            variance_y,
            variance_z,
            overall_stability,
            sample_count: used.len(),
            observation_period_s: span_us as f32 / 1_000_000.0,
            reason: None,
        }
    }

    /// Calibration-mode trust gate.
    ///
    /// Returns the position to calibrate from and its stability score, or an
    /// error when nothing trustworthy exists. An explicit position overrides
    /// which position is stored but not the trust decision.
    pub fn calibration_gate(
        &self,
        sensor: &str,
        samples: &SampleWindow<PositionSample>,
        motion: &MotionTimeline,
        explicit: Option<PositionSample>,
    ) -> Result<(PositionSample, f32)> {
        if motion.motionless_since_us().is_some() {
            // Verified motionless interval: fully trusted.
            let position = match explicit.or_else(|| samples.latest().copied()) {
                Some(position) => position,
                None => {
                    return Err(Error::NoRecentData {
                        sensor: sensor.to_string(),
                    })
                }
            };
            return Ok((position, 1.0));
        }

        if motion.motion_active() {
            return Err(Error::UnstableData {
                sensor: sensor.to_string(),
                detail: "motion in progress".to_string(),
            });
        }

        // No event evidence; fall back to recent telemetry.
        let position = match explicit.or_else(|| samples.latest().copied()) {
            Some(position) => position,
            None => {
                return Err(Error::NoStableData {
                    sensor: sensor.to_string(),
                })
            }
        };

        let live = self.analyze_live(samples);
        if live.sample_count >= self.config.min_samples && live.reason.is_none() {
            if !live.stable {
                return Err(Error::UnstableData {
                    sensor: sensor.to_string(),
                    detail: format!(
                        "max axis variance {:.3} exceeds {:.3}",
                        live.max_variance(),
                        self.config.max_variance
                    ),
                });
            }
            Ok((position, live.overall_stability))
        } else {
            Ok((position, FALLBACK_STABILITY))
        }
    }
}

impl Default for StabilityAnalyzer {
    fn default() -> Self {
        Self::new(StabilityConfig::default())
    }
}

/// Population variance of a value series.
fn axis_variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let sum_sq: f32 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    sum_sq / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{MotionEvent, MotionEventKind};
    use approx::assert_relative_eq;

    const SECOND_US: u64 = 1_000_000;

    fn window_of(samples: &[(f32, f32, f32, u64)]) -> SampleWindow<PositionSample> {
        let mut window = SampleWindow::new(50);
        for &(x, y, z, t) in samples {
            window.push(PositionSample::new(x, y, z, t));
        }
        window
    }

    #[test]
    fn test_two_samples_is_insufficient() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[(0.1, 0.1, 0.9, 0), (0.1, 0.1, 0.9, SECOND_US)]);
        let report = analyzer.analyze_live(&window);
        assert!(!report.stable);
        assert_eq!(report.sample_count, 2);
        assert_eq!(report.reason.as_deref(), Some("insufficient data"));
    }

    #[test]
    fn test_motionless_samples_are_fully_stable() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[
            (0.1, 0.2, 0.95, 0),
            (0.1, 0.2, 0.95, SECOND_US),
            (0.1, 0.2, 0.95, 2 * SECOND_US),
            (0.1, 0.2, 0.95, 3 * SECOND_US),
        ]);
        let report = analyzer.analyze_live(&window);
        assert!(report.stable);
        assert_relative_eq!(report.overall_stability, 1.0, epsilon = 1e-6);
        assert_relative_eq!(report.max_variance(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(report.observation_period_s, 3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_variance_math() {
        let analyzer = StabilityAnalyzer::default();
        // x = 0.0, 0.3, 0.6: population variance 0.06
        let window = window_of(&[
            (0.0, 0.2, 0.9, 0),
            (0.3, 0.2, 0.9, SECOND_US),
            (0.6, 0.2, 0.9, 2 * SECOND_US),
        ]);
        let report = analyzer.analyze_live(&window);
        assert!(report.stable);
        assert_relative_eq!(report.variance_x, 0.06, epsilon = 1e-4);
        assert_relative_eq!(report.variance_y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(report.overall_stability, 0.94, epsilon = 1e-4);
    }

    #[test]
    fn test_wild_swings_are_unstable() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[
            (-2.0, 0.0, 0.9, 0),
            (2.0, 0.0, 0.9, SECOND_US),
            (-2.0, 0.0, 0.9, 2 * SECOND_US),
            (2.0, 0.0, 0.9, 3 * SECOND_US),
        ]);
        let report = analyzer.analyze_live(&window);
        assert!(!report.stable);
        assert_relative_eq!(report.variance_x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(report.overall_stability, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_old_samples_fall_outside_window() {
        let analyzer = StabilityAnalyzer::default();
        // Three samples at t=0..2s, then two 100s later: only the recent
        // two are inside the 30s window
        let window = window_of(&[
            (0.1, 0.1, 0.9, 0),
            (0.1, 0.1, 0.9, SECOND_US),
            (0.1, 0.1, 0.9, 2 * SECOND_US),
            (0.1, 0.1, 0.9, 100 * SECOND_US),
            (0.1, 0.1, 0.9, 101 * SECOND_US),
        ]);
        let report = analyzer.analyze_live(&window);
        assert_eq!(report.sample_count, 2);
        assert_eq!(report.reason.as_deref(), Some("insufficient data"));
    }

    #[test]
    fn test_preferred_samples_use_most_recent() {
        let analyzer = StabilityAnalyzer::default();
        let mut samples = Vec::new();
        // Five noisy samples followed by ten motionless ones, all in-window
        for i in 0..5u64 {
            let x = if i % 2 == 0 { -3.0 } else { 3.0 };
            samples.push((x, 0.0, 0.9, i * SECOND_US));
        }
        for i in 5..15u64 {
            samples.push((0.1, 0.1, 0.95, i * SECOND_US));
        }
        let report = analyzer.analyze_live(&window_of(&samples));
        assert_eq!(report.sample_count, 10);
        assert!(report.stable);
        assert_relative_eq!(report.overall_stability, 1.0, epsilon = 1e-6);
    }

    // ========================================================================
    // Calibration-mode gate
    // ========================================================================

    #[test]
    fn test_gate_trusts_motionless_interval() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[(0.1, 0.1, 0.95, SECOND_US)]);
        let mut motion = MotionTimeline::default();
        motion.record(MotionEvent::new(MotionEventKind::Started, 0));
        motion.record(MotionEvent::new(MotionEventKind::Stopped, SECOND_US));

        let (position, stability) = analyzer
            .calibration_gate("door-1", &window, &motion, None)
            .unwrap();
        assert_eq!(position.z, 0.95);
        assert_eq!(stability, 1.0);
    }

    #[test]
    fn test_gate_rejects_motion_in_progress() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[(0.1, 0.1, 0.95, SECOND_US)]);
        let mut motion = MotionTimeline::default();
        motion.record(MotionEvent::new(MotionEventKind::Started, 2 * SECOND_US));

        let result = analyzer.calibration_gate("door-1", &window, &motion, None);
        assert!(matches!(result, Err(Error::UnstableData { .. })));
    }

    #[test]
    fn test_gate_without_events_uses_variance() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[
            (0.1, 0.1, 0.95, 0),
            (0.1, 0.1, 0.95, SECOND_US),
            (0.1, 0.1, 0.95, 2 * SECOND_US),
        ]);
        let motion = MotionTimeline::default();

        let (_, stability) = analyzer
            .calibration_gate("door-1", &window, &motion, None)
            .unwrap();
        assert_relative_eq!(stability, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gate_without_events_rejects_high_variance() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[
            (-2.0, 0.0, 0.9, 0),
            (2.0, 0.0, 0.9, SECOND_US),
            (-2.0, 0.0, 0.9, 2 * SECOND_US),
        ]);
        let motion = MotionTimeline::default();

        let result = analyzer.calibration_gate("door-1", &window, &motion, None);
        assert!(matches!(result, Err(Error::UnstableData { .. })));
    }

    #[test]
    fn test_gate_single_sample_fallback() {
        let analyzer = StabilityAnalyzer::default();
        let window = window_of(&[(0.1, 0.1, 0.95, 0)]);
        let motion = MotionTimeline::default();

        let (position, stability) = analyzer
            .calibration_gate("door-1", &window, &motion, None)
            .unwrap();
        assert_eq!(position.timestamp_us, 0);
        assert_eq!(stability, FALLBACK_STABILITY);
    }

    #[test]
    fn test_gate_with_nothing_reports_no_stable_data() {
        let analyzer = StabilityAnalyzer::default();
        let window: SampleWindow<PositionSample> = SampleWindow::new(50);
        let motion = MotionTimeline::default();

        let result = analyzer.calibration_gate("door-1", &window, &motion, None);
        assert!(matches!(result, Err(Error::NoStableData { .. })));
    }

    #[test]
    fn test_gate_motionless_without_samples_needs_position() {
        let analyzer = StabilityAnalyzer::default();
        let window: SampleWindow<PositionSample> = SampleWindow::new(50);
        let mut motion = MotionTimeline::default();
        motion.record(MotionEvent::new(MotionEventKind::Stopped, SECOND_US));

        let result = analyzer.calibration_gate("door-1", &window, &motion, None);
        assert!(matches!(result, Err(Error::NoRecentData { .. })));

        let explicit = PositionSample::new(0.0, 0.0, 1.0, 2 * SECOND_US);
        let (position, stability) = analyzer
            .calibration_gate("door-1", &window, &motion, Some(explicit))
            .unwrap();
        assert_eq!(position, explicit);
        assert_eq!(stability, 1.0);
    }
}

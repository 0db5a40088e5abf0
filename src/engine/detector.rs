//! Detection engine facade.
//!
//! Owns every pipeline stage and all per-sensor state, and is the only
//! type callers need. Telemetry enters through [`DetectionEngine::ingest`],
//! which drops malformed samples at the boundary; everything downstream
//! assumes valid data.

use std::time::Instant;

use log::{debug, warn};

use crate::calibration::{
    CalibrationInfo, CalibrationOutcome, CalibrationStorage, CalibrationStore, MemoryStorage,
    StabilityAnalyzer,
};
use crate::config::EngineConfig;
use crate::core::types::{
    CalibrationRecord, ComparisonOutcome, DetectionResult, MotionEvent, MotionTimeline,
    PositionSample, StabilityReport,
};
use crate::core::window::SampleWindow;
use crate::detection::{features, HysteresisStabilizer, StateClassifier};
use crate::engine::runtime::{RuntimeStats, SensorStateStore};
use crate::error::{Error, Result};
use crate::metrics::AccuracyMetrics;

/// Sensor-fusion engine for door/window state detection.
///
/// Tracks any number of sensors, keyed by caller-chosen id. Runtime state
/// is created lazily per sensor; calibration goes through the configured
/// storage backend.
pub struct DetectionEngine {
    config: EngineConfig,
    classifier: StateClassifier,
    stabilizer: HysteresisStabilizer,
    analyzer: StabilityAnalyzer,
    calibration: CalibrationStore,
    states: SensorStateStore,
}

impl DetectionEngine {
    /// Create an engine with in-memory calibration storage.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_storage(config, Box::new(MemoryStorage::new()))
    }

    /// Create an engine over the given calibration storage backend.
    pub fn with_storage(config: EngineConfig, storage: Box<dyn CalibrationStorage>) -> Self {
        let classifier = StateClassifier::new(config.detection.clone());
        let stabilizer = HysteresisStabilizer::new(config.hysteresis.clone());
        let analyzer = StabilityAnalyzer::new(config.stability.clone());
        let calibration = CalibrationStore::new(config.calibration.clone(), storage);
        let states = SensorStateStore::new(config.detection.sample_window, config.metrics.window);
        Self {
            config,
            classifier,
            stabilizer,
            analyzer,
            calibration,
            states,
        }
    }

    /// Boundary entry point for raw telemetry.
    ///
    /// Malformed samples (non-finite components, or components outside the
    /// device range) are dropped with a warning and yield `None`; valid
    /// samples run the full detection pipeline.
    pub fn ingest(&mut self, sensor_id: &str, sample: PositionSample) -> Option<DetectionResult> {
        if !sample.is_finite() {
            warn!(
                "Dropping malformed sample from '{}': non-finite component",
                sensor_id
            );
            return None;
        }
        if sample.peak_component() > self.config.calibration.axis_limit {
            warn!(
                "Dropping malformed sample from '{}': component outside device range",
                sensor_id
            );
            return None;
        }
        Some(self.detect(sensor_id, sample))
    }

    /// Run one valid sample through the full pipeline.
    ///
    /// Feature extraction, classification, hysteresis stabilization, then
    /// accuracy bookkeeping. Always publishes a result; the processing-time
    /// budget is soft and only logged when exceeded.
    pub fn detect(&mut self, sensor_id: &str, sample: PositionSample) -> DetectionResult {
        let started = Instant::now();

        let state = self.states.entry(sensor_id);
        state.record_sample(sample);

        let extracted = features::extract(&sample);
        let raw = self.classifier.classify(&sample, &extracted);
        let accepted =
            self.stabilizer
                .stabilize(state.previous.as_ref(), extracted.angle_degrees, raw.state);
        state.previous = Some(accepted);

        let confidence = raw.confidence * 100.0;
        state
            .accuracy
            .record(accepted.state, confidence, sample.timestamp_us);

        let elapsed = started.elapsed();
        if elapsed.as_millis() as u64 > self.config.detection.budget_ms {
            warn!(
                "Detection for '{}' took {}ms, over the {}ms budget",
                sensor_id,
                elapsed.as_millis(),
                self.config.detection.budget_ms
            );
        }
        debug!(
            "Detection for '{}': {} at {:.1}% (angle {:.2}deg, magnitude {:.3})",
            sensor_id, accepted.state, confidence, extracted.angle_degrees, extracted.magnitude
        );

        DetectionResult {
            door_state: accepted.state,
            confidence,
            opening_type: raw.kind,
            angle_degrees: extracted.angle_degrees,
            magnitude: extracted.magnitude,
            processing_time_us: elapsed.as_micros() as u64,
        }
    }

    /// Record a discrete motion event for a sensor.
    ///
    /// Events gate calibration and mark the motion episodes whose samples
    /// feed the signature buffer.
    pub fn record_motion_event(&mut self, sensor_id: &str, event: MotionEvent) {
        let state = self.states.entry(sensor_id);
        state.motion.record(event);
        debug!(
            "Motion event for '{}': {} at {}us",
            sensor_id, event.kind, event.timestamp_us
        );
    }

    /// Calibrate a sensor's closed reference position.
    ///
    /// With `position: None` the reference comes from recent telemetry; an
    /// explicit position overrides which position is stored but still has to
    /// pass the same stability gate. `requested_by` is recorded for audit.
    pub fn calibrate(
        &mut self,
        sensor_id: &str,
        position: Option<PositionSample>,
        requested_by: &str,
    ) -> Result<CalibrationOutcome> {
        if let Some(explicit) = position.as_ref() {
            self.calibration.validate_position(explicit)?;
        }

        // Runtime state is created by telemetry and motion events only; an
        // unknown sensor gates against empty evidence instead.
        let empty_samples = SampleWindow::new(0);
        let empty_motion = MotionTimeline::default();
        let (recent, motion) = match self.states.get(sensor_id) {
            Some(state) => (&state.recent_samples, &state.motion),
            None => (&empty_samples, &empty_motion),
        };
        let (resolved, stability) = self
            .analyzer
            .calibration_gate(sensor_id, recent, motion, position)?;
        self.calibration
            .calibrate(sensor_id, resolved, stability, requested_by)
    }

    /// Assess position stability for a sensor.
    ///
    /// Live mode reports per-axis variance over the recent window. With
    /// `for_calibration` the calibration gate's verdict overrides the
    /// stable flag and overall score, and a failed gate carries its reason.
    pub fn check_stability(&self, sensor_id: &str, for_calibration: bool) -> StabilityReport {
        let state = match self.states.get(sensor_id) {
            Some(state) => state,
            None => {
                let mut report = StabilityReport::insufficient(0);
                if for_calibration {
                    let err = Error::NoStableData {
                        sensor: sensor_id.to_string(),
                    };
                    report.reason = Some(err.to_string());
                }
                return report;
            }
        };

        let mut report = self.analyzer.analyze_live(&state.recent_samples);
        if for_calibration {
            match self
                .analyzer
                .calibration_gate(sensor_id, &state.recent_samples, &state.motion, None)
            {
                Ok((_, stability)) => {
                    report.stable = true;
                    report.overall_stability = stability;
                    report.reason = None;
                }
                Err(err) => {
                    report.stable = false;
                    report.overall_stability = 0.0;
                    report.reason = Some(err.to_string());
                }
            }
        }
        report
    }

    /// Compare a live position against the stored closed reference.
    pub fn compare(&self, sensor_id: &str, position: &PositionSample) -> Result<ComparisonOutcome> {
        self.calibration.compare(sensor_id, position)
    }

    /// Clear a sensor's ephemeral runtime state.
    ///
    /// The next sample starts cold: unseeded hysteresis, empty windows,
    /// fresh metrics. Stored calibration is untouched. Returns whether any
    /// state existed.
    pub fn reset_state(&mut self, sensor_id: &str) -> bool {
        let removed = self.states.remove(sensor_id);
        if removed {
            debug!("Cleared runtime state for '{}'", sensor_id);
        }
        removed
    }

    /// Retire a sensor's active calibration, tagging it with a reason.
    pub fn reset_calibration(
        &mut self,
        sensor_id: &str,
        reason: &str,
    ) -> Result<Option<CalibrationRecord>> {
        self.calibration.reset(sensor_id, reason)
    }

    /// Summary of a sensor's calibration state.
    pub fn calibration_info(&self, sensor_id: &str) -> Result<CalibrationInfo> {
        self.calibration.info(sensor_id)
    }

    /// Rolling accuracy metrics for a sensor.
    ///
    /// An unknown sensor reports zeros rather than an error.
    pub fn accuracy_metrics(&self, sensor_id: &str) -> AccuracyMetrics {
        let state = match self.states.get(sensor_id) {
            Some(state) => state,
            None => return AccuracyMetrics::default(),
        };
        let live = self.analyzer.analyze_live(&state.recent_samples);
        AccuracyMetrics {
            accuracy: state.accuracy.accuracy_estimate(),
            confidence: state.accuracy.average_confidence(),
            stability: live.overall_stability,
            samples: state.accuracy.sample_count(),
            state_changes: state.accuracy.state_changes(),
        }
    }

    /// Diagnostic snapshot of a sensor's runtime state, if it has one.
    pub fn runtime_stats(&self, sensor_id: &str) -> Option<RuntimeStats> {
        self.states.get(sensor_id).map(|state| state.snapshot())
    }

    /// Sensor ids with live runtime state, sorted.
    pub fn sensors(&self) -> Vec<String> {
        self.states.sensors()
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

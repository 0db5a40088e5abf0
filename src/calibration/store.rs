//! Calibration protocol: calibrate, compare, reset, info.
//!
//! Owns the durable per-sensor calibration documents through the storage
//! trait. Each calibrate or reset rewrites the sensor's whole document, so
//! the active record and its history always replace together.

use std::time::{SystemTime, UNIX_EPOCH};

use log::info;

use crate::calibration::storage::CalibrationStorage;
use crate::config::CalibrationConfig;
use crate::core::types::{
    CalibrationRecord, ComparisonOutcome, HistoryEntry, PositionSample, SensorCalibration,
};
use crate::error::{Error, Result};

/// Result of a successful calibration.
#[derive(Debug, Clone)]
pub struct CalibrationOutcome {
    /// The new active record.
    pub record: CalibrationRecord,
    /// Whether a previous active record was pushed into history.
    pub replaced_previous: bool,
}

/// Summary of a sensor's calibration state for display and audit.
#[derive(Debug, Clone)]
pub struct CalibrationInfo {
    /// Active record, if the sensor is calibrated.
    pub active: Option<CalibrationRecord>,
    /// Total calibrations ever performed.
    pub calibration_count: u32,
    /// Confidence of the active record, or of the most recently retired one.
    pub last_confidence: Option<f32>,
    /// Number of retired records currently in history.
    pub history_len: usize,
}

/// Durable calibration store for all sensors.
pub struct CalibrationStore {
    config: CalibrationConfig,
    storage: Box<dyn CalibrationStorage>,
}

impl CalibrationStore {
    /// Create a store over the given backend.
    pub fn new(config: CalibrationConfig, storage: Box<dyn CalibrationStorage>) -> Self {
        Self { config, storage }
    }

    /// Check that every component of a position lies within the device
    /// range.
    pub fn validate_position(&self, position: &PositionSample) -> Result<()> {
        for (axis, value) in [('x', position.x), ('y', position.y), ('z', position.z)] {
            if !value.is_finite() || value.abs() > self.config.axis_limit {
                return Err(Error::InvalidPosition { axis, value });
            }
        }
        Ok(())
    }

    /// Write a new active calibration record for a sensor.
    ///
    /// The position must already have passed the stability gate; `stability`
    /// becomes the record's confidence. Any prior active record moves into
    /// the bounded history.
    pub fn calibrate(
        &mut self,
        sensor: &str,
        position: PositionSample,
        stability: f32,
        calibrated_by: &str,
    ) -> Result<CalibrationOutcome> {
        self.validate_position(&position)?;

        let now = now_us();
        let mut document = self.storage.load(sensor)?.unwrap_or_default();
        let replaced = document.active.take();
        if let Some(previous) = replaced.as_ref() {
            document.push_history(
                HistoryEntry {
                    record: previous.clone(),
                    reason: "replaced".to_string(),
                    retired_at_us: now,
                },
                self.config.history_limit,
            );
        }

        let record = CalibrationRecord {
            closed_reference: position.into(),
            tolerance: self.config.tolerance,
            confidence: stability.clamp(0.0, 1.0),
            calibrated_at_us: now,
            calibrated_by: calibrated_by.to_string(),
        };
        document.active = Some(record.clone());
        document.calibration_count += 1;
        self.storage.store(sensor, &document)?;

        info!(
            "Calibrated sensor '{}' (confidence {:.2}, total calibrations {})",
            sensor, record.confidence, document.calibration_count
        );
        Ok(CalibrationOutcome {
            record,
            replaced_previous: replaced.is_some(),
        })
    }

    /// Compare a live position against the stored closed reference.
    pub fn compare(&self, sensor: &str, position: &PositionSample) -> Result<ComparisonOutcome> {
        let document = match self.storage.load(sensor)? {
            Some(document) => document,
            None => return Ok(ComparisonOutcome::Unknown),
        };
        let record = match document.active {
            Some(record) => record,
            None => return Ok(ComparisonOutcome::Unknown),
        };

        if record.closed_reference.max_axis_delta(position) <= record.tolerance {
            Ok(ComparisonOutcome::Closed)
        } else {
            Ok(ComparisonOutcome::Opened)
        }
    }

    /// Retire the active record, tagging it with the caller's reason.
    ///
    /// Returns the removed record, or `None` if the sensor had no active
    /// calibration.
    pub fn reset(&mut self, sensor: &str, reason: &str) -> Result<Option<CalibrationRecord>> {
        let mut document = match self.storage.load(sensor)? {
            Some(document) => document,
            None => return Ok(None),
        };
        let removed = match document.active.take() {
            Some(record) => record,
            None => return Ok(None),
        };

        document.push_history(
            HistoryEntry {
                record: removed.clone(),
                reason: reason.to_string(),
                retired_at_us: now_us(),
            },
            self.config.history_limit,
        );
        self.storage.store(sensor, &document)?;

        info!("Reset calibration for sensor '{}' ({})", sensor, reason);
        Ok(Some(removed))
    }

    /// Summary of a sensor's calibration state.
    pub fn info(&self, sensor: &str) -> Result<CalibrationInfo> {
        let document = self.storage.load(sensor)?.unwrap_or_default();
        let last_confidence = document
            .active
            .as_ref()
            .map(|record| record.confidence)
            .or_else(|| document.history.last().map(|entry| entry.record.confidence));
        Ok(CalibrationInfo {
            calibration_count: document.calibration_count,
            last_confidence,
            history_len: document.history.len(),
            active: document.active,
        })
    }

    /// Full stored document for a sensor, if any.
    pub fn document(&self, sensor: &str) -> Result<Option<SensorCalibration>> {
        self.storage.load(sensor)
    }

    /// Sensor ids with a stored calibration document.
    pub fn sensors(&self) -> Result<Vec<String>> {
        self.storage.sensors()
    }
}

/// Wall-clock time in microseconds since the Unix epoch.
fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::storage::MemoryStorage;

    fn store() -> CalibrationStore {
        CalibrationStore::new(CalibrationConfig::default(), Box::new(MemoryStorage::new()))
    }

    fn position(x: f32, y: f32, z: f32) -> PositionSample {
        PositionSample::new(x, y, z, 1_000_000)
    }

    #[test]
    fn test_calibrate_then_compare_same_position_is_closed() {
        let mut store = store();
        let closed = position(0.1, 0.2, 0.95);
        let outcome = store.calibrate("door-1", closed, 1.0, "operator").unwrap();
        assert!(!outcome.replaced_previous);
        assert_eq!(outcome.record.tolerance, 0.5);

        let result = store.compare("door-1", &closed).unwrap();
        assert_eq!(result, ComparisonOutcome::Closed);
    }

    #[test]
    fn test_compare_within_tolerance_is_closed() {
        let mut store = store();
        store
            .calibrate("door-1", position(0.0, 0.0, 1.0), 1.0, "operator")
            .unwrap();
        let nearby = position(0.3, -0.4, 0.8);
        assert_eq!(
            store.compare("door-1", &nearby).unwrap(),
            ComparisonOutcome::Closed
        );
    }

    #[test]
    fn test_compare_beyond_tolerance_is_opened() {
        let mut store = store();
        store
            .calibrate("door-1", position(0.0, 0.0, 1.0), 1.0, "operator")
            .unwrap();
        let moved = position(0.6, 0.0, 1.0);
        assert_eq!(
            store.compare("door-1", &moved).unwrap(),
            ComparisonOutcome::Opened
        );
    }

    #[test]
    fn test_compare_without_calibration_is_unknown() {
        let store = store();
        assert_eq!(
            store.compare("door-1", &position(0.0, 0.0, 1.0)).unwrap(),
            ComparisonOutcome::Unknown
        );
    }

    #[test]
    fn test_out_of_range_position_rejected_store_unchanged() {
        let mut store = store();
        let result = store.calibrate("door-1", position(130.0, 0.0, 1.0), 1.0, "operator");
        assert!(matches!(
            result,
            Err(Error::InvalidPosition { axis: 'x', .. })
        ));
        assert_eq!(
            store.compare("door-1", &position(0.0, 0.0, 1.0)).unwrap(),
            ComparisonOutcome::Unknown
        );
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let mut store = store();
        let result = store.calibrate("door-1", position(0.0, f32::NAN, 1.0), 1.0, "operator");
        assert!(matches!(
            result,
            Err(Error::InvalidPosition { axis: 'y', .. })
        ));
    }

    #[test]
    fn test_history_bounded_after_repeated_calibration() {
        let mut store = store();
        for i in 0..11 {
            let outcome = store
                .calibrate("door-1", position(i as f32 * 0.01, 0.0, 1.0), 1.0, "operator")
                .unwrap();
            assert_eq!(outcome.replaced_previous, i > 0);
        }

        let info = store.info("door-1").unwrap();
        assert_eq!(info.calibration_count, 11);
        assert_eq!(info.history_len, 10);

        // One more calibration evicts the oldest retired record
        store
            .calibrate("door-1", position(0.5, 0.0, 1.0), 1.0, "operator")
            .unwrap();
        let document = store.document("door-1").unwrap().unwrap();
        assert_eq!(document.history.len(), 10);
        assert_eq!(document.history[0].record.closed_reference.x, 0.01);
    }

    #[test]
    fn test_reset_retires_record_with_reason() {
        let mut store = store();
        store
            .calibrate("door-1", position(0.1, 0.2, 0.95), 0.8, "operator")
            .unwrap();

        let removed = store.reset("door-1", "sensor remounted").unwrap();
        assert!(removed.is_some());

        let document = store.document("door-1").unwrap().unwrap();
        assert!(document.active.is_none());
        assert_eq!(document.history.len(), 1);
        assert_eq!(document.history[0].reason, "sensor remounted");

        // Nothing left to reset
        assert!(store.reset("door-1", "again").unwrap().is_none());
        assert_eq!(
            store.compare("door-1", &position(0.1, 0.2, 0.95)).unwrap(),
            ComparisonOutcome::Unknown
        );
    }

    #[test]
    fn test_info_reports_last_confidence_after_reset() {
        let mut store = store();
        store
            .calibrate("door-1", position(0.1, 0.2, 0.95), 0.8, "operator")
            .unwrap();
        store.reset("door-1", "maintenance").unwrap();

        let info = store.info("door-1").unwrap();
        assert!(info.active.is_none());
        assert_eq!(info.last_confidence, Some(0.8));
        assert_eq!(info.history_len, 1);
    }
}

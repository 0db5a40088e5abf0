//! Core data model types.
//!
//! Everything the detection and calibration layers exchange: raw samples,
//! state enums, detection results, stability reports, motion events and
//! persisted calibration records.

pub mod calibration;
pub mod detection;
pub mod motion;
pub mod sample;
pub mod stability;
pub mod state;

pub use calibration::{CalibrationRecord, HistoryEntry, ReferencePosition, SensorCalibration};
pub use detection::DetectionResult;
pub use motion::{MotionEvent, MotionEventKind, MotionTimeline};
pub use sample::PositionSample;
pub use stability::StabilityReport;
pub use state::{ComparisonOutcome, OpeningKind, OpeningState};

//! Core foundation: data model types and bounded sample windows.

pub mod types;
pub mod window;

pub use types::{
    CalibrationRecord, ComparisonOutcome, DetectionResult, HistoryEntry, MotionEvent,
    MotionEventKind, MotionTimeline, OpeningKind, OpeningState, PositionSample, ReferencePosition,
    SensorCalibration, StabilityReport,
};
pub use window::SampleWindow;

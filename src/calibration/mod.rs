//! Calibration subsystem: stability gating, the calibration protocol and
//! its durable storage backends.

pub mod stability;
pub mod storage;
pub mod store;

pub use stability::StabilityAnalyzer;
pub use storage::{CalibrationStorage, FileStorage, MemoryStorage};
pub use store::{CalibrationInfo, CalibrationOutcome, CalibrationStore};

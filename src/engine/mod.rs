//! Detection engine: the public facade over all pipeline stages.

pub mod detector;
pub mod runtime;

pub use detector::DetectionEngine;
pub use runtime::{RuntimeStats, SensorRuntimeState, SensorStateStore};

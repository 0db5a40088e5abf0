//! Observability metrics for detection quality.

pub mod accuracy;

pub use accuracy::{AccuracyMetrics, AccuracyTracker, StateObservation};

//! DvaraSense - Sensor-fusion state detection for door and window openings
//!
//! Consumes tri-axial accelerometer telemetry from battery-powered
//! door/window sensors and publishes closed/opened decisions with bounded
//! confidence, alongside a calibration protocol for per-installation
//! closed reference positions.
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Executables
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Orchestration
//! │             (detector, runtime state)               │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │         calibration/            metrics/            │  ← Protocols
//! │   (stability, store, storage)   (accuracy)          │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   detection/                        │  ← Per-sample pipeline
//! │        (features, classifier, hysteresis)           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                 (types, window)                     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Configuration (`config`) and the error taxonomy (`error`) cut across
//! all layers.
//!
//! # Pipeline
//!
//! Every accepted sample runs four stages inside
//! [`DetectionEngine::ingest`]:
//!
//! 1. Feature extraction: acceleration magnitude, tilt angle from
//!    vertical, signal clarity
//! 2. Classification: provisional closed/opened decision with a
//!    confidence capped at 95%, plus a coarse door/window guess
//! 3. Hysteresis: angle-based debounce so borderline readings cannot
//!    flap the published state
//! 4. Metrics: rolling confidence and flip-rate bookkeeping per sensor
//!
//! # Calibration
//!
//! Calibration captures a sensor's closed reference position, gated on
//! positional stability: a verified motionless interval from the sensor's
//! motion events is fully trusted, low per-axis variance over the recent
//! sample window is trusted proportionally, and anything else is refused.
//! Stored references live behind the [`CalibrationStorage`] trait with
//! in-memory and YAML-file backends.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Detection pipeline (depends on core)
// ============================================================================
pub mod detection;

// ============================================================================
// Layer 3: Calibration and metrics (depends on core, detection)
// ============================================================================
pub mod calibration;
pub mod metrics;

// ============================================================================
// Layer 4: Engine facade (depends on all layers)
// ============================================================================
pub mod engine;

// ============================================================================
// Cross-cutting: configuration and errors
// ============================================================================
pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use core::types::{
    CalibrationRecord, ComparisonOutcome, DetectionResult, HistoryEntry, MotionEvent,
    MotionEventKind, MotionTimeline, OpeningKind, OpeningState, PositionSample, ReferencePosition,
    SensorCalibration, StabilityReport,
};
pub use core::window::SampleWindow;

// Detection pipeline
pub use detection::{
    HysteresisStabilizer, RawClassification, SampleFeatures, StabilizedReading, StateClassifier,
    MAX_CONFIDENCE,
};

// Calibration
pub use calibration::{
    CalibrationInfo, CalibrationOutcome, CalibrationStorage, CalibrationStore, FileStorage,
    MemoryStorage, StabilityAnalyzer,
};

// Metrics
pub use metrics::{AccuracyMetrics, AccuracyTracker, StateObservation};

// Engine
pub use engine::{DetectionEngine, RuntimeStats};

// Configuration and errors
pub use config::{
    CalibrationConfig, DetectionConfig, EngineConfig, HysteresisConfig, MetricsConfig,
    StabilityConfig,
};
pub use error::{Error, Result};

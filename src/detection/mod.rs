//! Detection pipeline: feature extraction, classification, stabilization.
//!
//! A raw sample flows through `features::extract` into
//! `StateClassifier::classify`, and the provisional result is debounced by
//! the `HysteresisStabilizer` before publication.

pub mod classifier;
pub mod features;
pub mod hysteresis;

pub use classifier::{RawClassification, StateClassifier, MAX_CONFIDENCE};
pub use features::{extract, SampleFeatures};
pub use hysteresis::{HysteresisStabilizer, StabilizedReading};

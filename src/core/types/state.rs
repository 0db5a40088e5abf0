//! Opening state and classification enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Detected state of an instrumented opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningState {
    /// Opening is at its closed reference position.
    #[default]
    Closed,
    /// Opening has rotated away from the closed position.
    Opened,
}

impl fmt::Display for OpeningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpeningState::Closed => write!(f, "closed"),
            OpeningState::Opened => write!(f, "opened"),
        }
    }
}

/// Best-effort guess of what kind of opening the sensor is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    /// Hinged vertically, swings with large horizontal accelerations.
    #[default]
    Door,
    /// Mounted near-vertical with small horizontal motion.
    Window,
}

impl fmt::Display for OpeningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpeningKind::Door => write!(f, "door"),
            OpeningKind::Window => write!(f, "window"),
        }
    }
}

/// Result of comparing a live position against the stored closed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOutcome {
    /// Every axis is within tolerance of the reference.
    Closed,
    /// At least one axis deviates beyond tolerance.
    Opened,
    /// No active calibration exists for the sensor.
    Unknown,
}

impl fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOutcome::Closed => write!(f, "closed"),
            ComparisonOutcome::Opened => write!(f, "opened"),
            ComparisonOutcome::Unknown => write!(f, "unknown"),
        }
    }
}

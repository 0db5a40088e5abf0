//! Error types for dvara-sense

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// dvara-sense error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No trustworthy position available for calibration
    #[error("No stable data available for sensor '{sensor}'")]
    NoStableData {
        /// Sensor identifier
        sensor: String,
    },

    /// No recent telemetry to fall back on
    #[error("No recent position data for sensor '{sensor}'")]
    NoRecentData {
        /// Sensor identifier
        sensor: String,
    },

    /// Position component outside the device range
    #[error("Invalid position: axis {axis} = {value} outside device range")]
    InvalidPosition {
        /// Offending axis (x, y or z)
        axis: char,
        /// Rejected component value
        value: f32,
    },

    /// Position too unstable to calibrate from
    #[error("Unstable data for sensor '{sensor}': {detail}")]
    UnstableData {
        /// Sensor identifier
        sensor: String,
        /// Operator-facing description of the failed check
        detail: String,
    },

    /// Calibration storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Calibration document (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),
}

//! Durable calibration storage backends.
//!
//! The calibration store reads and writes whole `SensorCalibration`
//! documents through the `CalibrationStorage` trait. The file backend keeps
//! one YAML document per sensor under a base directory and replaces it
//! atomically via a temp-file rename.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::core::types::SensorCalibration;
use crate::error::{Error, Result};

/// Backend for per-sensor calibration documents.
pub trait CalibrationStorage: Send {
    /// Load the document for a sensor, if one exists.
    fn load(&self, sensor: &str) -> Result<Option<SensorCalibration>>;

    /// Store (create or atomically replace) the document for a sensor.
    fn store(&mut self, sensor: &str, calibration: &SensorCalibration) -> Result<()>;

    /// Delete the document for a sensor. Returns whether one existed.
    fn remove(&mut self, sensor: &str) -> Result<bool>;

    /// Sensor ids with a stored document.
    fn sensors(&self) -> Result<Vec<String>>;
}

/// In-memory backend, the default for embedded callers and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: HashMap<String, SensorCalibration>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CalibrationStorage for MemoryStorage {
    fn load(&self, sensor: &str) -> Result<Option<SensorCalibration>> {
        Ok(self.documents.get(sensor).cloned())
    }

    fn store(&mut self, sensor: &str, calibration: &SensorCalibration) -> Result<()> {
        self.documents
            .insert(sensor.to_string(), calibration.clone());
        Ok(())
    }

    fn remove(&mut self, sensor: &str) -> Result<bool> {
        Ok(self.documents.remove(sensor).is_some())
    }

    fn sensors(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.documents.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// File-backed storage: one YAML document per sensor id.
#[derive(Debug)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        info!("Calibration storage at {}", base_path.display());
        Ok(Self { base_path })
    }

    fn document_path(&self, sensor: &str) -> Result<PathBuf> {
        validate_sensor_id(sensor)?;
        Ok(self.base_path.join(format!("{}.yaml", sensor)))
    }
}

impl CalibrationStorage for FileStorage {
    fn load(&self, sensor: &str) -> Result<Option<SensorCalibration>> {
        let path = self.document_path(sensor)?;
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        let calibration: SensorCalibration = serde_yaml::from_str(&contents)?;
        info!("Loaded calibration document for sensor '{}'", sensor);
        Ok(Some(calibration))
    }

    fn store(&mut self, sensor: &str, calibration: &SensorCalibration) -> Result<()> {
        let path = self.document_path(sensor)?;
        let contents = serde_yaml::to_string(calibration)?;

        // Write-then-rename keeps the replace atomic on the same filesystem.
        let tmp_path = self.base_path.join(format!("{}.yaml.tmp", sensor));
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &path)?;

        info!("Stored calibration document for sensor '{}'", sensor);
        Ok(())
    }

    fn remove(&mut self, sensor: &str) -> Result<bool> {
        let path = self.document_path(sensor)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!("Removed calibration document for sensor '{}'", sensor);
        Ok(true)
    }

    fn sensors(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Sensor ids become file names; reject anything that could escape the
/// storage directory.
fn validate_sensor_id(sensor: &str) -> Result<()> {
    if sensor.is_empty()
        || sensor.contains('/')
        || sensor.contains('\\')
        || sensor.contains("..")
    {
        return Err(Error::Storage(format!("invalid sensor id '{}'", sensor)));
    }
    Ok(())
}

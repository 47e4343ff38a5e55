//! The `calibration` module recovers a scale factor and a translation from two
//! landmark pairs.
//!
//! The same procedure serves every view. Only the [`AxisPolicy`] changes:
//! which axes the landmark distance is measured on, and which axes of the
//! midpoint offset are carried into the translation.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;

pub mod calibrator;
pub mod policy;

pub use calibrator::{compute, CalibrationResult, DEGENERATE_DISTANCE_TOLERANCE};
pub use policy::{AxisPolicy, ViewKind};

#[derive(thiserror::Error, Debug)]
pub enum CalibrationError {
    #[error(
        "Proxies are too close together (distance {distance:.6} < {tolerance}), move the points further apart"
    )]
    DegenerateInput { distance: f64, tolerance: f64 },
    #[error("Calibration session already applied, proxies were released")]
    SessionClosed,
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Failed to load YAML: {0}")]
    YamlError(String),
    #[error("IO Error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for CalibrationError {
    fn from(err: std::io::Error) -> Self {
        CalibrationError::IOError(err.to_string())
    }
}

impl From<yaml_rust::ScanError> for CalibrationError {
    fn from(err: yaml_rust::ScanError) -> Self {
        CalibrationError::YamlError(err.to_string())
    }
}

/// A calibration outcome tagged with the view it was computed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub view: ViewKind,
    pub scale_factor: f64,
    pub translation: Vector3<f64>,
}

impl CalibrationReport {
    pub fn new(view: ViewKind, result: &CalibrationResult) -> Self {
        CalibrationReport {
            view,
            scale_factor: result.scale_factor,
            translation: result.translation,
        }
    }

    pub fn to_json(&self) -> Result<String, CalibrationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CalibrationError::InvalidParams(format!("Failed to encode JSON: {e}")))
    }

    pub fn save_to_yaml(&self, path: &str) -> Result<(), CalibrationError> {
        let yaml_string =
            serde_yaml::to_string(self).map_err(|e| CalibrationError::YamlError(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(yaml_string.as_bytes())?;

        Ok(())
    }
}

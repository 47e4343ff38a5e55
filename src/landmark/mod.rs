//! Landmarks and landmark pairs.
//!
//! A calibration run always works with two landmark roles on the head: the inner
//! corner of the eye ([`Landmark::TearDuct`]) and the chin ([`Landmark::Chin`]).
//! A [`LandmarkPair`] binds both roles to world-space positions. One pair comes
//! from the fixed anchors on the reference model (the target), the other from
//! the proxies the user drags over the photo (the current pair).

use crate::calibration::{CalibrationError, ViewKind};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use yaml_rust::{Yaml, YamlLoader};

/// Scene object name of the fixed tear-duct anchor.
pub const ANCHOR_TEAR_DUCT: &str = "OM_Anchor_TearDuct";
/// Scene object name of the fixed chin anchor.
pub const ANCHOR_CHIN: &str = "OM_Anchor_Chin";
/// Scene object name of the movable tear-duct proxy.
pub const PROXY_TEAR_DUCT: &str = "OM_Dup_TearDuct";
/// Scene object name of the movable chin proxy.
pub const PROXY_CHIN: &str = "OM_Dup_Chin";
/// Custom-view proxies are named apart from the front and side ones.
pub const PROXY_TEAR_DUCT_CUSTOM: &str = "OM_Dup_TearDuct_S3";
pub const PROXY_CHIN_CUSTOM: &str = "OM_Dup_Chin_S3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    TearDuct,
    Chin,
}

impl Landmark {
    pub const ALL: [Landmark; 2] = [Landmark::TearDuct, Landmark::Chin];

    /// Name of the fixed anchor object carrying this landmark.
    pub fn anchor_name(self) -> &'static str {
        match self {
            Landmark::TearDuct => ANCHOR_TEAR_DUCT,
            Landmark::Chin => ANCHOR_CHIN,
        }
    }

    /// Name of the movable proxy object duplicated from the anchor in `view`.
    pub fn proxy_name(self, view: ViewKind) -> &'static str {
        match (self, view) {
            (Landmark::TearDuct, ViewKind::Custom) => PROXY_TEAR_DUCT_CUSTOM,
            (Landmark::Chin, ViewKind::Custom) => PROXY_CHIN_CUSTOM,
            (Landmark::TearDuct, _) => PROXY_TEAR_DUCT,
            (Landmark::Chin, _) => PROXY_CHIN,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Landmark::TearDuct => "tear_duct",
            Landmark::Chin => "chin",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// World-space positions of both landmark roles.
///
/// # Examples
///
/// ```rust
/// use nalgebra::Point3;
/// use orthometric::landmark::{Landmark, LandmarkPair};
///
/// let pair = LandmarkPair::new(Point3::new(0.0, 0.0, 1.5), Point3::new(0.0, 0.0, 1.0));
/// assert_eq!(pair.get(Landmark::Chin).z, 1.0);
/// assert_eq!(pair.midpoint(), Point3::new(0.0, 0.0, 1.25));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPair {
    pub tear_duct: Point3<f64>,
    pub chin: Point3<f64>,
}

impl LandmarkPair {
    pub fn new(tear_duct: Point3<f64>, chin: Point3<f64>) -> Self {
        LandmarkPair { tear_duct, chin }
    }

    pub fn get(&self, landmark: Landmark) -> &Point3<f64> {
        match landmark {
            Landmark::TearDuct => &self.tear_duct,
            Landmark::Chin => &self.chin,
        }
    }

    pub fn midpoint(&self) -> Point3<f64> {
        crate::geometry::midpoint(&self.tear_duct, &self.chin)
    }

    /// Loads a landmark pair from a YAML file.
    ///
    /// The file is expected to look like:
    ///
    /// ```yaml
    /// landmarks:
    ///   tear_duct: [0.0312, -0.0915, 1.6021]
    ///   chin: [0.0, -0.0874, 1.4779]
    /// ```
    ///
    /// Integer coordinates are accepted. Every coordinate must be finite.
    ///
    /// # Errors
    ///
    /// * [`CalibrationError::IOError`] if the file cannot be read.
    /// * [`CalibrationError::YamlError`] if the content is not valid YAML.
    /// * [`CalibrationError::InvalidParams`] if the `landmarks` mapping or one of
    ///   its entries is missing or malformed.
    pub fn load_from_yaml(path: &str) -> Result<Self, CalibrationError> {
        let contents = fs::read_to_string(path)?;
        let docs = YamlLoader::load_from_str(&contents)?;
        let doc = docs.first().ok_or_else(|| {
            CalibrationError::InvalidParams(format!("YAML file '{path}' is empty"))
        })?;

        let landmarks = &doc["landmarks"];
        if landmarks.is_badvalue() {
            return Err(CalibrationError::InvalidParams(
                "YAML missing 'landmarks' mapping".to_string(),
            ));
        }

        let pair = LandmarkPair {
            tear_duct: parse_point(&landmarks[Landmark::TearDuct.key()], Landmark::TearDuct)?,
            chin: parse_point(&landmarks[Landmark::Chin.key()], Landmark::Chin)?,
        };

        log::debug!("Loaded landmarks from {path}: {pair:?}");
        Ok(pair)
    }

    /// Saves the pair in the layout read by [`LandmarkPair::load_from_yaml`].
    pub fn save_to_yaml(&self, path: &str) -> Result<(), CalibrationError> {
        let point_value = |p: &Point3<f64>| {
            serde_yaml::to_value(vec![p.x, p.y, p.z])
                .map_err(|e| CalibrationError::YamlError(e.to_string()))
        };

        let yaml = serde_yaml::Value::Mapping(serde_yaml::Mapping::from_iter([(
            serde_yaml::Value::String("landmarks".to_string()),
            serde_yaml::Value::Mapping(serde_yaml::Mapping::from_iter([
                (
                    serde_yaml::Value::String(Landmark::TearDuct.key().to_string()),
                    point_value(&self.tear_duct)?,
                ),
                (
                    serde_yaml::Value::String(Landmark::Chin.key().to_string()),
                    point_value(&self.chin)?,
                ),
            ])),
        )]));

        let yaml_string =
            serde_yaml::to_string(&yaml).map_err(|e| CalibrationError::YamlError(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(yaml_string.as_bytes())?;

        Ok(())
    }
}

fn parse_point(node: &Yaml, landmark: Landmark) -> Result<Point3<f64>, CalibrationError> {
    let coords = node.as_vec().ok_or_else(|| {
        CalibrationError::InvalidParams(format!("YAML missing '{landmark}' or not an array"))
    })?;
    if coords.len() != 3 {
        return Err(CalibrationError::InvalidParams(format!(
            "'{landmark}' must have 3 coordinates, got {}",
            coords.len()
        )));
    }

    let mut values = [0.0; 3];
    for (value, coord) in values.iter_mut().zip(coords) {
        *value = match coord {
            Yaml::Real(_) => coord.as_f64(),
            Yaml::Integer(i) => Some(*i as f64),
            _ => None,
        }
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            CalibrationError::InvalidParams(format!(
                "Invalid '{landmark}' coordinate: not a finite number"
            ))
        })?;
    }

    Ok(Point3::new(values[0], values[1], values[2]))
}

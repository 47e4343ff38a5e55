//! Axis policies for the three calibration views.

use crate::geometry::{Axis, AxisSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects which axes take part in the scale measurement and which in the
/// position correction of one calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPolicy {
    /// Axes the landmark distance is measured on.
    pub distance: AxisSet,
    /// Axes the midpoint offset is carried over on.
    pub translation: AxisSet,
}

impl AxisPolicy {
    /// Front photo: X is locked to the symmetry plane and Y is the image depth.
    pub const FRONT: AxisPolicy = AxisPolicy {
        distance: AxisSet::XZ,
        translation: AxisSet::Z,
    };

    /// Side photo: proxies are locked on X, the image moves in depth and height.
    pub const SIDE: AxisPolicy = AxisPolicy {
        distance: AxisSet::XYZ,
        translation: AxisSet::YZ,
    };

    /// Arbitrary view angle, nothing locked.
    pub const CUSTOM: AxisPolicy = AxisPolicy {
        distance: AxisSet::XYZ,
        translation: AxisSet::XYZ,
    };

    pub fn new(distance: AxisSet, translation: AxisSet) -> Self {
        AxisPolicy {
            distance,
            translation,
        }
    }
}

/// The view a reference photograph was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Front,
    Side,
    Custom,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Front, ViewKind::Side, ViewKind::Custom];

    pub fn policy(self) -> AxisPolicy {
        match self {
            ViewKind::Front => AxisPolicy::FRONT,
            ViewKind::Side => AxisPolicy::SIDE,
            ViewKind::Custom => AxisPolicy::CUSTOM,
        }
    }

    /// Axes of the carrier's scale the factor is multiplied into.
    ///
    /// The front image plane has no thickness along Y, so only X and Z are scaled.
    pub fn scale_axes(self) -> AxisSet {
        match self {
            ViewKind::Front => AxisSet::XZ,
            ViewKind::Side | ViewKind::Custom => AxisSet::XYZ,
        }
    }

    /// Axes a proxy for `landmark` may not move along in this view.
    pub fn proxy_locks(self, landmark: crate::landmark::Landmark) -> AxisSet {
        use crate::landmark::Landmark;
        match (self, landmark) {
            (ViewKind::Front, Landmark::TearDuct) => AxisSet::Y,
            (ViewKind::Front, Landmark::Chin) => AxisSet::from_axes(&[Axis::X, Axis::Y]),
            (ViewKind::Side, _) => AxisSet::X,
            (ViewKind::Custom, _) => AxisSet::EMPTY,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewKind::Front => "front",
            ViewKind::Side => "side",
            ViewKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for ViewKind {
    type Err = super::CalibrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" => Ok(ViewKind::Front),
            "side" => Ok(ViewKind::Side),
            "custom" | "arbitrary" => Ok(ViewKind::Custom),
            _ => Err(super::CalibrationError::InvalidParams(format!(
                "Unsupported view: {s}. Supported views: front, side, custom"
            ))),
        }
    }
}

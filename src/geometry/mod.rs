//! Axis-restricted vector helpers shared by the calibrator and the session.
//!
//! An [`AxisSet`] names the coordinate axes that take part in a measurement or a
//! correction. Distances are measured in the subspace spanned by the set, and
//! vectors are masked so components outside the set become exactly zero.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single world-space coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index into a `Point3` / `Vector3`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        write!(f, "{name}")
    }
}

/// A subset of `{X, Y, Z}`.
///
/// # Examples
///
/// ```rust
/// use orthometric::geometry::{Axis, AxisSet};
///
/// let xz = AxisSet::XZ;
/// assert!(xz.contains(Axis::X));
/// assert!(!xz.contains(Axis::Y));
/// assert_eq!(AxisSet::from_axes(&[Axis::Z, Axis::X]), xz);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisSet(u8);

impl AxisSet {
    pub const EMPTY: AxisSet = AxisSet(0);
    pub const X: AxisSet = AxisSet(0b001);
    pub const Y: AxisSet = AxisSet(0b010);
    pub const Z: AxisSet = AxisSet(0b100);
    pub const XZ: AxisSet = AxisSet(0b101);
    pub const YZ: AxisSet = AxisSet(0b110);
    pub const XYZ: AxisSet = AxisSet(0b111);

    pub fn from_axes(axes: &[Axis]) -> Self {
        AxisSet(axes.iter().fold(0, |bits, axis| bits | axis.bit()))
    }

    pub fn contains(self, axis: Axis) -> bool {
        self.0 & axis.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn with(self, axis: Axis) -> Self {
        AxisSet(self.0 | axis.bit())
    }

    /// Axes in X, Y, Z order.
    pub fn iter(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |axis| self.contains(*axis))
    }

    /// Zeroes every component of `v` whose axis is not in the set.
    pub fn mask(self, v: &Vector3<f64>) -> Vector3<f64> {
        let mut masked = Vector3::zeros();
        for axis in self.iter() {
            masked[axis.index()] = v[axis.index()];
        }
        masked
    }

    /// Per-component factor vector: `factor` on axes in the set, `1.0` elsewhere.
    pub fn factor(self, factor: f64) -> Vector3<f64> {
        let mut factors = Vector3::repeat(1.0);
        for axis in self.iter() {
            factors[axis.index()] = factor;
        }
        factors
    }
}

impl fmt::Debug for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AxisSet({self})")
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for axis in self.iter() {
            write!(f, "{axis}")?;
        }
        Ok(())
    }
}

impl FromIterator<Axis> for AxisSet {
    fn from_iter<I: IntoIterator<Item = Axis>>(iter: I) -> Self {
        iter.into_iter().fold(AxisSet::EMPTY, AxisSet::with)
    }
}

// Serialised as the list of member axes, e.g. `[x, z]`.
impl Serialize for AxisSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for AxisSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let axes = Vec::<Axis>::deserialize(deserializer)?;
        Ok(AxisSet::from_axes(&axes))
    }
}

/// Euclidean distance between `p` and `q` measured only on `axes`.
pub fn projected_distance(p: &Point3<f64>, q: &Point3<f64>, axes: AxisSet) -> f64 {
    axes.iter()
        .map(|axis| {
            let d = p[axis.index()] - q[axis.index()];
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Full 3D midpoint of `p` and `q`.
pub fn midpoint(p: &Point3<f64>, q: &Point3<f64>) -> Point3<f64> {
    nalgebra::center(p, q)
}

//! Two-point similarity calibration.
//!
//! Given the fixed anchor pair (target) and the user-aligned proxy pair
//! (current), [`compute`] derives:
//!
//! * `scale_factor = |target| / |current|`, both distances measured on
//!   `policy.distance`;
//! * `translation = mask(mid_target - mid_current, policy.translation)`, where
//!   both midpoints are full 3D.
//!
//! The only rejected input is a current pair whose projected distance falls below
//! [`DEGENERATE_DISTANCE_TOLERANCE`].

use super::{AxisPolicy, CalibrationError};
use crate::geometry::{projected_distance, AxisSet};
use crate::landmark::LandmarkPair;
use log::{debug, warn};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Minimal distance between the current landmarks, in scene units (metres).
pub const DEGENERATE_DISTANCE_TOLERANCE: f64 = 1e-4;

/// Scale factors outside this range are logged as suspicious.
const SUSPICIOUS_SCALE_MIN: f64 = 0.001;
const SUSPICIOUS_SCALE_MAX: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub scale_factor: f64,
    /// Zero on every axis outside the policy's translation set.
    pub translation: Vector3<f64>,
}

impl CalibrationResult {
    /// `true` for non-positive factors and factors outside `[0.001, 1000]`.
    pub fn is_suspicious(&self) -> bool {
        !(SUSPICIOUS_SCALE_MIN..=SUSPICIOUS_SCALE_MAX).contains(&self.scale_factor)
    }

    /// Moves `pair` the way the calibrated carrier moves it.
    ///
    /// Both landmarks are scaled about the pair's midpoint on `scale_axes`, then
    /// shifted by the translation. Applying a result to the current pair it was
    /// computed from and recomputing yields the identity result.
    pub fn apply_to_pair(&self, pair: &LandmarkPair, scale_axes: AxisSet) -> LandmarkPair {
        let pivot = pair.midpoint();
        let factors = scale_axes.factor(self.scale_factor);
        let transform = |p: &Point3<f64>| -> Point3<f64> {
            pivot + (*p - pivot).component_mul(&factors) + self.translation
        };

        LandmarkPair::new(transform(&pair.tear_duct), transform(&pair.chin))
    }
}

/// Computes the scale and translation mapping `current` onto `target`.
///
/// # Errors
///
/// [`CalibrationError::DegenerateInput`] when the current landmarks are closer
/// than [`DEGENERATE_DISTANCE_TOLERANCE`] on `policy.distance`, whatever the target.
///
/// # Examples
///
/// ```rust
/// use nalgebra::{Point3, Vector3};
/// use orthometric::calibration::{compute, AxisPolicy};
/// use orthometric::landmark::LandmarkPair;
///
/// let target = LandmarkPair::new(Point3::new(0.0, 0.0, 1.5), Point3::new(0.0, 0.0, 1.0));
/// let current = LandmarkPair::new(Point3::new(0.0, 0.0, 3.0), Point3::new(0.0, 0.0, 2.0));
///
/// let result = compute(&target, &current, &AxisPolicy::FRONT).unwrap();
/// assert!((result.scale_factor - 0.5).abs() < 1e-12);
/// assert!((result.translation - Vector3::new(0.0, 0.0, -1.25)).norm() < 1e-12);
/// ```
pub fn compute(
    target: &LandmarkPair,
    current: &LandmarkPair,
    policy: &AxisPolicy,
) -> Result<CalibrationResult, CalibrationError> {
    let dist_target = projected_distance(&target.tear_duct, &target.chin, policy.distance);
    let dist_current = projected_distance(&current.tear_duct, &current.chin, policy.distance);

    if dist_current < DEGENERATE_DISTANCE_TOLERANCE {
        warn!(
            "Current landmarks are {dist_current:.6} apart on {}, below tolerance {DEGENERATE_DISTANCE_TOLERANCE}",
            policy.distance
        );
        return Err(CalibrationError::DegenerateInput {
            distance: dist_current,
            tolerance: DEGENERATE_DISTANCE_TOLERANCE,
        });
    }

    let scale_factor = dist_target / dist_current;

    let diff = target.midpoint() - current.midpoint();
    let translation = policy.translation.mask(&diff);

    debug!(
        "dist_target={dist_target:.6} dist_current={dist_current:.6} diff={:?}",
        diff.as_slice()
    );

    let result = CalibrationResult {
        scale_factor,
        translation,
    };
    if result.is_suspicious() {
        warn!("Suspicious scale factor {scale_factor}, check the proxy placement");
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::ViewKind;
    use crate::geometry::Axis;
    use approx::assert_relative_eq;

    fn pair(td: [f64; 3], chin: [f64; 3]) -> LandmarkPair {
        LandmarkPair::new(Point3::from(td), Point3::from(chin))
    }

    fn assert_vector_eq(actual: &Vector3<f64>, expected: &Vector3<f64>, epsilon: f64) {
        for i in 0..3 {
            assert_relative_eq!(actual[i], expected[i], epsilon = epsilon);
        }
    }

    #[test]
    fn test_front_scenario() {
        let target = pair([0.0, 0.0, 1.5], [0.0, 0.0, 1.0]);
        let current = pair([0.0, 0.0, 3.0], [0.0, 0.0, 2.0]);

        let result = compute(&target, &current, &AxisPolicy::FRONT).unwrap();

        assert_relative_eq!(result.scale_factor, 0.5, epsilon = 1e-12);
        assert_vector_eq(&result.translation, &Vector3::new(0.0, 0.0, -1.25), 1e-12);
    }

    #[test]
    fn test_degenerate_current_pair() {
        let target = pair([0.0, 0.0, 1.5], [0.0, 0.0, 1.0]);
        let current = pair([1.0, 1.0, 1.0], [1.0, 1.0, 1.00005]);

        let err = compute(&target, &current, &AxisPolicy::CUSTOM).unwrap_err();
        match err {
            CalibrationError::DegenerateInput {
                distance,
                tolerance,
            } => {
                assert_relative_eq!(distance, 0.00005, epsilon = 1e-9);
                assert_eq!(tolerance, 1e-4);
            }
            other => panic!("Expected DegenerateInput, got {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_guard_ignores_target() {
        let current = pair([0.2, 0.3, 1.0], [0.2, 0.3, 1.0]);
        for target in [
            pair([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
            pair([0.0, 0.0, 1.5], [0.0, 0.0, 1.0]),
            pair([-5.0, 2.0, 10.0], [3.0, 1.0, -4.0]),
        ] {
            for view in ViewKind::ALL {
                assert!(matches!(
                    compute(&target, &current, &view.policy()),
                    Err(CalibrationError::DegenerateInput { .. })
                ));
            }
        }
    }

    #[test]
    fn test_tolerance_boundary() {
        let target = pair([0.0, 0.0, 1.5], [0.0, 0.0, 1.0]);
        let at_tolerance = pair([0.0, 0.0, DEGENERATE_DISTANCE_TOLERANCE], [0.0, 0.0, 0.0]);
        let below_tolerance = pair([0.0, 0.0, 0.99e-4], [0.0, 0.0, 0.0]);

        for view in ViewKind::ALL {
            let result = compute(&target, &at_tolerance, &view.policy()).unwrap();
            assert_relative_eq!(result.scale_factor, 5000.0, max_relative = 1e-12);

            assert!(matches!(
                compute(&target, &below_tolerance, &view.policy()),
                Err(CalibrationError::DegenerateInput { .. })
            ));
        }
    }

    #[test]
    fn test_front_distance_ignores_depth() {
        // Far apart in Y only, so coincident in the X-Z plane.
        let target = pair([0.0, 0.0, 1.5], [0.0, 0.0, 1.0]);
        let current = pair([0.0, -1.0, 1.0], [0.0, 1.0, 1.0]);

        assert!(compute(&target, &current, &AxisPolicy::FRONT).is_err());
        assert!(compute(&target, &current, &AxisPolicy::CUSTOM).is_ok());
    }

    #[test]
    fn test_side_scenario() {
        let target = pair([0.0, 1.0, 1.5], [0.0, 1.0, 1.0]);
        let current = pair([0.0, 2.0, 3.0], [0.0, 2.0, 2.0]);

        let result = compute(&target, &current, &AxisPolicy::SIDE).unwrap();

        assert_relative_eq!(result.scale_factor, 0.5, epsilon = 1e-12);
        assert_vector_eq(&result.translation, &Vector3::new(0.0, -1.0, -1.25), 1e-12);
    }

    #[test]
    fn test_side_drops_x_drift() {
        let target = pair([0.0, 1.0, 1.5], [0.0, 1.0, 1.0]);
        let current = pair([0.3, 2.0, 3.0], [0.3, 2.0, 2.0]);

        let result = compute(&target, &current, &AxisPolicy::SIDE).unwrap();

        assert_eq!(result.translation.x, 0.0);
        assert_relative_eq!(result.translation.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(result.translation.z, -1.25, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_is_distance_ratio() {
        let target = pair([0.03, -0.09, 1.60], [0.0, -0.087, 1.478]);
        let current = pair([0.5, 0.2, 2.1], [-0.4, 0.7, 0.3]);

        for view in ViewKind::ALL {
            let policy = view.policy();
            let expected = projected_distance(&target.tear_duct, &target.chin, policy.distance)
                / projected_distance(&current.tear_duct, &current.chin, policy.distance);

            let result = compute(&target, &current, &policy).unwrap();
            assert_relative_eq!(result.scale_factor, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_z_only_translation_discards_x_and_y() {
        let target = pair([0.5, -1.0, 1.5], [0.5, -1.0, 1.0]);
        let current = pair([-0.7, 3.0, 3.0], [-0.7, 3.0, 2.0]);

        let result = compute(&target, &current, &AxisPolicy::FRONT).unwrap();

        assert_eq!(result.translation.x, 0.0);
        assert_eq!(result.translation.y, 0.0);
        assert_relative_eq!(result.translation.z, -1.25, epsilon = 1e-12);
    }

    #[test]
    fn test_translation_axes_independent_of_distance_axes() {
        let target = pair([0.1, 0.4, 1.6], [0.0, 0.35, 1.1]);
        let current = pair([0.9, -0.2, 2.4], [0.2, 0.6, 1.3]);
        let translation = AxisSet::YZ;

        let mut scales = Vec::new();
        for distance in [AxisSet::XYZ, AxisSet::XZ, AxisSet::Y] {
            let policy = AxisPolicy::new(distance, translation);
            let result = compute(&target, &current, &policy).unwrap();

            for axis in Axis::ALL {
                let nonzero = result.translation[axis.index()] != 0.0;
                assert_eq!(nonzero, translation.contains(axis), "axis {axis}");
            }
            scales.push(result.scale_factor);
        }

        assert!((scales[0] - scales[1]).abs() > 1e-6);
        assert!((scales[1] - scales[2]).abs() > 1e-6);
    }

    #[test]
    fn test_reapplication_converges_to_identity() {
        let target = pair([0.0312, -0.0915, 1.6021], [0.0, -0.0874, 1.4779]);
        let currents = [
            pair([0.0312, -0.0915, 2.4], [0.0, -0.0915, 1.9]),
            pair([0.0, 0.4, 3.0], [0.0, 0.1, 2.2]),
            pair([0.7, -0.3, 2.5], [0.1, 0.2, 1.1]),
        ];

        for (view, current) in ViewKind::ALL.into_iter().zip(currents) {
            let policy = view.policy();
            let result = compute(&target, &current, &policy).unwrap();
            let moved = result.apply_to_pair(&current, view.scale_axes());

            let again = compute(&target, &moved, &policy).unwrap();
            assert_relative_eq!(again.scale_factor, 1.0, epsilon = 1e-6);
            assert!(again.translation.norm() < 1e-6, "view {view}");
        }
    }

    #[test]
    fn test_extreme_scale_is_returned_not_rejected() {
        let target = pair([0.0, 0.0, 100.0], [0.0, 0.0, -100.0]);
        let current = pair([0.0, 0.0, 0.0002], [0.0, 0.0, 0.0]);

        let result = compute(&target, &current, &AxisPolicy::CUSTOM).unwrap();

        assert!(result.is_suspicious());
        assert_relative_eq!(result.scale_factor, 1.0e6, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_target_distance_gives_zero_scale() {
        let target = pair([0.0, 0.0, 1.0], [0.0, 0.0, 1.0]);
        let current = pair([0.0, 0.0, 2.0], [0.0, 0.0, 1.0]);

        let result = compute(&target, &current, &AxisPolicy::CUSTOM).unwrap();

        assert_eq!(result.scale_factor, 0.0);
        assert!(result.is_suspicious());
    }
}

//! OrthoMetric core
//!
//! Two-point calibration of reference head photographs against a fixed 3D
//! anchor model. The user drags two proxies (tear duct and chin) over the photo;
//! the calibrator recovers the scale factor and translation that bring them onto
//! the model's anchors. Three views are supported:
//! - Front: distance in the X-Z plane, translation on Z
//! - Side: distance in 3D, translation on Y and Z
//! - Custom: distance and translation in 3D
//!
//! Scene objects, cameras and image loading belong to the host application and
//! are passed in as plain world-space points.

pub mod calibration;
pub mod geometry;
pub mod landmark;
pub mod session;

// Re-export commonly used types
pub use calibration::{
    compute, AxisPolicy, CalibrationError, CalibrationReport, CalibrationResult, ViewKind,
    DEGENERATE_DISTANCE_TOLERANCE,
};
pub use geometry::{Axis, AxisSet};
pub use landmark::{Landmark, LandmarkPair};
pub use session::{CalibrationSession, Carrier};

//! A calibration session around one "Apply Calibration" action.
//!
//! The session snapshots the anchors once, hands out two movable proxies that
//! start on the anchors, and on [`CalibrationSession::apply`] runs the
//! calibrator against the proxies and writes the outcome into a [`Carrier`]
//! (the image plane being calibrated).

use crate::calibration::{compute, CalibrationError, CalibrationResult, ViewKind};
use crate::geometry::AxisSet;
use crate::landmark::{Landmark, LandmarkPair};
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// World-space location and per-axis scale of the object being calibrated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    pub location: Point3<f64>,
    pub scale: Vector3<f64>,
}

impl Carrier {
    pub fn new(location: Point3<f64>) -> Self {
        Carrier {
            location,
            scale: Vector3::repeat(1.0),
        }
    }

    /// Multiplies the scale on `scale_axes` and adds the translation to the location.
    pub fn apply(&mut self, result: &CalibrationResult, scale_axes: AxisSet) {
        self.scale = self
            .scale
            .component_mul(&scale_axes.factor(result.scale_factor));
        self.location += result.translation;
    }

    /// Re-bases X so the face's symmetry line, found at `symmetry_x`, lands on X = 0.
    ///
    /// Front calibration never translates along X, so a front image must be
    /// centered before it is calibrated.
    pub fn center_on(&mut self, symmetry_x: f64) {
        self.location.x -= symmetry_x;
        debug!("Carrier centered, symmetry line was at x={symmetry_x:.6}");
    }
}

impl Default for Carrier {
    fn default() -> Self {
        Carrier::new(Point3::origin())
    }
}

/// A movable point duplicated from an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proxy {
    pub landmark: Landmark,
    pub position: Point3<f64>,
    /// Axes the proxy cannot be moved along.
    pub locked: AxisSet,
}

impl Proxy {
    /// Moves by `delta`, ignoring the locked components.
    pub fn translate(&mut self, delta: &Vector3<f64>) {
        let free = self.free_axes();
        self.position += free.mask(delta);
    }

    /// Moves to `target` on the free axes; locked components keep their value.
    pub fn move_to(&mut self, target: &Point3<f64>) {
        for axis in self.free_axes().iter() {
            self.position[axis.index()] = target[axis.index()];
        }
    }

    fn free_axes(&self) -> AxisSet {
        crate::geometry::Axis::ALL
            .into_iter()
            .filter(|axis| !self.locked.contains(*axis))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationSession {
    view: ViewKind,
    target: LandmarkPair,
    proxies: Option<[Proxy; 2]>,
}

impl CalibrationSession {
    /// Starts a session for `view` with the anchor snapshot `target`.
    ///
    /// Both proxies start on their anchors, locked per [`ViewKind::proxy_locks`].
    pub fn start(view: ViewKind, target: LandmarkPair) -> Self {
        let proxy = |landmark: Landmark| Proxy {
            landmark,
            position: *target.get(landmark),
            locked: view.proxy_locks(landmark),
        };
        info!(
            "Starting {view} calibration, align {} and {} to the image ({} / {})",
            Landmark::TearDuct.proxy_name(view),
            Landmark::Chin.proxy_name(view),
            Landmark::TearDuct.anchor_name(),
            Landmark::Chin.anchor_name()
        );

        CalibrationSession {
            view,
            target,
            proxies: Some([proxy(Landmark::TearDuct), proxy(Landmark::Chin)]),
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn target(&self) -> &LandmarkPair {
        &self.target
    }

    /// `false` once a calibration was applied and the proxies were released.
    pub fn is_open(&self) -> bool {
        self.proxies.is_some()
    }

    pub fn proxy(&self, landmark: Landmark) -> Result<&Proxy, CalibrationError> {
        let proxies = self.proxies.as_ref().ok_or(CalibrationError::SessionClosed)?;
        Ok(&proxies[Self::slot(landmark)])
    }

    /// Drags the proxy for `landmark` by `delta`.
    pub fn drag(
        &mut self,
        landmark: Landmark,
        delta: &Vector3<f64>,
    ) -> Result<(), CalibrationError> {
        let view = self.view;
        let proxy = self.proxy_mut(landmark)?;
        proxy.translate(delta);
        debug!("{} dragged to {:?}", landmark.proxy_name(view), proxy.position);
        Ok(())
    }

    /// Places the proxy for `landmark` at `position`, respecting its locks.
    pub fn move_to(
        &mut self,
        landmark: Landmark,
        position: &Point3<f64>,
    ) -> Result<(), CalibrationError> {
        let view = self.view;
        let proxy = self.proxy_mut(landmark)?;
        proxy.move_to(position);
        debug!("{} moved to {:?}", landmark.proxy_name(view), proxy.position);
        Ok(())
    }

    /// Current proxy positions.
    pub fn current(&self) -> Result<LandmarkPair, CalibrationError> {
        Ok(LandmarkPair::new(
            self.proxy(Landmark::TearDuct)?.position,
            self.proxy(Landmark::Chin)?.position,
        ))
    }

    /// Calibrates `carrier` from the current proxy placement.
    ///
    /// On success the carrier is scaled and moved, the proxies are released and
    /// the session is closed. On [`CalibrationError::DegenerateInput`] neither the
    /// carrier nor the proxies change, so the user can re-adjust and retry.
    pub fn apply(&mut self, carrier: &mut Carrier) -> Result<CalibrationResult, CalibrationError> {
        let current = self.current()?;
        let result = compute(&self.target, &current, &self.view.policy()).inspect_err(|e| {
            warn!("{} calibration aborted: {e}", self.view);
        })?;

        carrier.apply(&result, self.view.scale_axes());
        self.proxies = None;

        info!(
            "{} calibration complete: scale {:.6}, translation {:?}",
            self.view,
            result.scale_factor,
            result.translation.as_slice()
        );
        Ok(result)
    }

    fn proxy_mut(&mut self, landmark: Landmark) -> Result<&mut Proxy, CalibrationError> {
        let proxies = self.proxies.as_mut().ok_or(CalibrationError::SessionClosed)?;
        Ok(&mut proxies[Self::slot(landmark)])
    }

    fn slot(landmark: Landmark) -> usize {
        match landmark {
            Landmark::TearDuct => 0,
            Landmark::Chin => 1,
        }
    }
}

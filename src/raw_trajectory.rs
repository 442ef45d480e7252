//! # Raw trajectories
//!
//! A [`RawTrajectory`] is one body's sampled path exactly as it was loaded: a strictly
//! increasing time array and two or three parallel position arrays.
//!
//! Invariants
//! -----------------
//! * `t.len() == x.len() == y.len()` (and `== z.len()` when `z` is present),
//! * at least one sample,
//! * `t` finite and strictly increasing.
//!
//! Instances are validated once at construction and are immutable afterwards; a reload
//! builds new ones rather than mutating old ones.

use itertools::Itertools;
use nalgebra::{Rotation3, Vector3};

use crate::{
    constants::{BodyId, Time},
    path_errors::PathError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RawTrajectory {
    t: Vec<Time>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Option<Vec<f64>>,
}

impl RawTrajectory {
    /// Build a trajectory from parallel sample arrays.
    ///
    /// Arguments
    /// -----------------
    /// * `t`: sample times, finite and strictly increasing.
    /// * `x`, `y`: positions, same length as `t`.
    /// * `z`: optional third axis, same length as `t` when present.
    ///
    /// Return
    /// ----------
    /// * The validated trajectory, or
    ///   [`PathError::EmptyTrajectory`], [`PathError::LengthMismatch`],
    ///   [`PathError::NonFiniteTime`], [`PathError::NonIncreasingTime`].
    pub fn new(
        t: Vec<Time>,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Option<Vec<f64>>,
    ) -> Result<Self, PathError> {
        let n = t.len();
        if n == 0 {
            return Err(PathError::EmptyTrajectory);
        }

        let axes = [
            ('x', Some(x.len())),
            ('y', Some(y.len())),
            ('z', z.as_ref().map(Vec::len)),
        ];
        for (axis, len) in axes {
            if let Some(found) = len {
                if found != n {
                    return Err(PathError::LengthMismatch {
                        axis,
                        expected: n,
                        found,
                    });
                }
            }
        }

        if let Some(index) = t.iter().position(|v| !v.is_finite()) {
            return Err(PathError::NonFiniteTime { index });
        }
        if let Some(index) = t.iter().tuple_windows().position(|(a, b)| b <= a) {
            return Err(PathError::NonIncreasingTime { index: index + 1 });
        }

        Ok(RawTrajectory { t, x, y, z })
    }

    /// Build a planar trajectory (no `z` axis).
    pub fn planar(t: Vec<Time>, x: Vec<f64>, y: Vec<f64>) -> Result<Self, PathError> {
        Self::new(t, x, y, None)
    }

    pub fn t(&self) -> &[Time] {
        &self.t
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> Option<&[f64]> {
        self.z.as_deref()
    }

    /// Number of samples (always at least one).
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// First and last sample times.
    pub fn span(&self) -> (Time, Time) {
        (self.t[0], self.t[self.t.len() - 1])
    }

    /// Apply a fixed rotation to every sample.
    ///
    /// Planar trajectories are lifted to 3D with `z = 0` before rotating, so the result
    /// always carries a `z` axis.
    pub fn rotated(&self, rot: &Rotation3<f64>) -> RawTrajectory {
        let n = self.len();
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut z = Vec::with_capacity(n);

        for i in 0..n {
            let zi = self.z.as_ref().map_or(0.0, |z| z[i]);
            let p = rot * Vector3::new(self.x[i], self.y[i], zi);
            x.push(p.x);
            y.push(p.y);
            z.push(p.z);
        }

        RawTrajectory {
            t: self.t.clone(),
            x,
            y,
            z: Some(z),
        }
    }
}

/// A trajectory tagged with the body it belongs to, as produced by the loaders.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyTrajectory {
    pub body: BodyId,
    pub path: RawTrajectory,
}

//! # Derived paths and reference frames
//!
//! A [`DerivedPath`] is a time-tagged path expressing one body's position relative to a
//! reference body, sampled in one of three [`Frame`]s:
//!
//! * [`Frame::Raw`] – the target's own samples, unchanged.
//! * [`Frame::AlignedTo`] – `target − ref`, at the target's own timestamps.
//! * [`Frame::Resampled`] – `target − ref`, on a uniform grid anchored to the reference.
//!
//! The pair `(target, frame)` ([`PathKey`]) identifies a derived path within one
//! generation of loaded data.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{BodyId, Time},
    path_errors::PathError,
    raw_trajectory::RawTrajectory,
    resample_grid::checked_step,
    spline::SplineSamples,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frame {
    Raw,
    AlignedTo(BodyId),
    Resampled {
        reference: BodyId,
        step: NotNan<f64>,
    },
}

impl Frame {
    /// Map the optional `(ref, dt)` pair of a query onto a frame.
    ///
    /// A step without a reference has nothing to be anchored to and is ignored.
    ///
    /// Return
    /// ----------
    /// * The frame, or [`PathError::InvalidTimeStep`] for a non-positive or non-finite step.
    pub fn from_query(reference: Option<BodyId>, dt: Option<f64>) -> Result<Frame, PathError> {
        match (reference, dt) {
            (None, _) => Ok(Frame::Raw),
            (Some(r), None) => Ok(Frame::AlignedTo(r)),
            (Some(r), Some(dt)) => Ok(Frame::Resampled {
                reference: r,
                step: checked_step(dt)?,
            }),
        }
    }

    pub fn reference(&self) -> Option<BodyId> {
        match self {
            Frame::Raw => None,
            Frame::AlignedTo(r) => Some(*r),
            Frame::Resampled { reference, .. } => Some(*reference),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey {
    pub target: BodyId,
    pub frame: Frame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedPath {
    pub t: Vec<Time>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Option<Vec<f64>>,
}

impl DerivedPath {
    /// Identity transform of a raw trajectory: the samples are copied exactly.
    pub fn from_raw(raw: &RawTrajectory) -> Self {
        DerivedPath {
            t: raw.t().to_vec(),
            x: raw.x().to_vec(),
            y: raw.y().to_vec(),
            z: raw.z().map(<[f64]>::to_vec),
        }
    }

    /// Target positions minus interpolated reference positions at the target's own times.
    pub(crate) fn aligned(target: &RawTrajectory, reference: &SplineSamples) -> Self {
        DerivedPath {
            t: target.t().to_vec(),
            x: subtract(target.x(), &reference.x),
            y: subtract(target.y(), &reference.y),
            z: target
                .z()
                .zip(reference.z.as_deref())
                .map(|(a, b)| subtract(a, b)),
        }
    }

    /// Difference of two spline evaluations on the same grid.
    pub(crate) fn resampled(
        grid: &[Time],
        target: &SplineSamples,
        reference: &SplineSamples,
    ) -> Self {
        DerivedPath {
            t: grid.to_vec(),
            x: subtract(&target.x, &reference.x),
            y: subtract(&target.y, &reference.y),
            z: target
                .z
                .as_deref()
                .zip(reference.z.as_deref())
                .map(|(a, b)| subtract(a, b)),
        }
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

fn subtract(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(a, b)| a - b).collect()
}

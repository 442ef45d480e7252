//! Uniform time grids for resampled reference-frame queries.
//!
//! A grid is anchored to the reference body's sample span and follows numpy's
//! `arange(start, stop, step)` convention: half-open, `ceil((stop - start) / step)` points,
//! each computed as `start + i·step` so that no rounding error accumulates.

use ordered_float::NotNan;

use crate::{
    constants::{BodyId, Time},
    path_errors::PathError,
};

/// Cache key of a grid: the reference body it is anchored to and its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    pub reference: BodyId,
    pub step: NotNan<f64>,
}

/// Validate a resampling step and wrap it so it can be hashed.
///
/// Return
/// ----------
/// * The step, or [`PathError::InvalidTimeStep`] when it is NaN, infinite, zero or negative.
pub fn checked_step(step: f64) -> Result<NotNan<f64>, PathError> {
    match NotNan::new(step) {
        Ok(s) if step.is_finite() && step > 0.0 => Ok(s),
        _ => Err(PathError::InvalidTimeStep(step)),
    }
}

/// Number of points of `arange(start, stop, step)`.
pub fn grid_len(start: Time, stop: Time, step: f64) -> usize {
    let n = ((stop - start) / step).ceil();
    if n.is_finite() && n > 0.0 {
        n as usize
    } else {
        0
    }
}

/// Build the half-open grid `[start, stop)` with spacing `step`.
///
/// Arguments
/// -----------------
/// * `start`, `stop`: span of the reference body.
/// * `step`: positive spacing (see [`checked_step`]).
/// * `max_len`: upper bound on the number of points.
///
/// Return
/// ----------
/// * The grid (possibly empty when `stop <= start`), or [`PathError::GridTooLarge`].
pub fn uniform_grid(
    start: Time,
    stop: Time,
    step: NotNan<f64>,
    max_len: usize,
) -> Result<Vec<Time>, PathError> {
    let step = step.into_inner();
    let len = grid_len(start, stop, step);
    if len > max_len {
        return Err(PathError::GridTooLarge { len, max: max_len });
    }
    Ok((0..len).map(|i| start + i as f64 * step).collect())
}

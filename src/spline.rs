//! # Cubic spline interpolants
//!
//! Continuous per-axis interpolants built from a [`RawTrajectory`].
//!
//! Each axis gets an interpolating (smoothing-free) cubic spline with **not-a-knot** end
//! conditions: the third derivative is continuous across the second and the second to
//! last knots. This is the same interpolant FITPACK builds for `splrep(t, x, s=0, k=3)`,
//! and it reproduces any cubic polynomial exactly.
//!
//! Representation
//! -----------------
//! Splines are stored as knot values plus second derivatives `M_i` at the knots. On the
//! interval `[t_i, t_{i+1}]` with `h = t_{i+1} - t_i`, `a = (t_{i+1} - t) / h` and
//! `b = (t - t_i) / h`:
//!
//! ```text
//! s(t) = a·y_i + b·y_{i+1} + ((a³ - a)·M_i + (b³ - b)·M_{i+1})·h² / 6
//! ```
//!
//! Outside the sampled span the end polynomials are extended (extrapolation), matching
//! FITPACK's default `ext=0`.
//!
//! Failure policy
//! -----------------
//! Fitting never panics. Too few samples, non-finite data, non-increasing knots or a
//! singular system are reported as a [`SplineError`], which the cache turns into an
//! *unavailable* entry.

use itertools::Itertools;
use thiserror::Error;

use crate::{
    constants::{Time, MIN_SPLINE_SAMPLES},
    raw_trajectory::RawTrajectory,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("Cubic spline needs at least {min} samples, got {0}", min = MIN_SPLINE_SAMPLES)]
    TooFewSamples(usize),

    #[error("Knots are not strictly increasing at index {0}")]
    NonIncreasingKnots(usize),

    #[error("Non-finite sample on axis '{0}'")]
    NonFiniteSample(char),

    #[error("Spline system is singular")]
    SingularSystem,
}

/// Second derivatives of one axis at every knot.
#[derive(Debug, Clone, PartialEq)]
struct AxisSpline {
    values: Vec<f64>,
    second_derivs: Vec<f64>,
}

/// Positions sampled from a [`SplineRepresentation`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplineSamples {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Option<Vec<f64>>,
}

/// Continuous interpolant of one body's trajectory, one cubic spline per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineRepresentation {
    knots: Vec<Time>,
    x: AxisSpline,
    y: AxisSpline,
    z: Option<AxisSpline>,
}

impl SplineRepresentation {
    /// Fit the x, y (and z when present) axes of a trajectory.
    ///
    /// Return
    /// ----------
    /// * The interpolant, or a [`SplineError`] describing why none could be built.
    pub fn fit(traj: &RawTrajectory) -> Result<Self, SplineError> {
        let knots = traj.t();
        check_knots(knots)?;

        let z = match traj.z() {
            Some(z) => Some(fit_axis(knots, z, 'z')?),
            None => None,
        };

        Ok(SplineRepresentation {
            knots: knots.to_vec(),
            x: fit_axis(knots, traj.x(), 'x')?,
            y: fit_axis(knots, traj.y(), 'y')?,
            z,
        })
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    /// Evaluate every axis at the given times.
    pub fn evaluate(&self, times: &[Time]) -> SplineSamples {
        let mut x = Vec::with_capacity(times.len());
        let mut y = Vec::with_capacity(times.len());
        let mut z = self.z.as_ref().map(|_| Vec::with_capacity(times.len()));

        for &t in times {
            let seg = self.segment(t);
            x.push(seg.eval(&self.x));
            y.push(seg.eval(&self.y));
            if let (Some(out), Some(axis)) = (z.as_mut(), self.z.as_ref()) {
                out.push(seg.eval(axis));
            }
        }

        SplineSamples { x, y, z }
    }

    /// Locate the interval used to evaluate `t`; the end intervals are extended
    /// beyond the sampled span.
    fn segment(&self, t: Time) -> Segment {
        let n = self.knots.len();
        let lo = self
            .knots
            .partition_point(|&k| k <= t)
            .saturating_sub(1)
            .min(n - 2);
        let h = self.knots[lo + 1] - self.knots[lo];

        Segment {
            lo,
            h,
            a: (self.knots[lo + 1] - t) / h,
            b: (t - self.knots[lo]) / h,
        }
    }
}

struct Segment {
    lo: usize,
    h: f64,
    a: f64,
    b: f64,
}

impl Segment {
    #[inline]
    fn eval(&self, axis: &AxisSpline) -> f64 {
        let (a, b, i) = (self.a, self.b, self.lo);
        a * axis.values[i]
            + b * axis.values[i + 1]
            + ((a * a * a - a) * axis.second_derivs[i]
                + (b * b * b - b) * axis.second_derivs[i + 1])
                * self.h
                * self.h
                / 6.0
    }
}

fn check_knots(knots: &[Time]) -> Result<(), SplineError> {
    if knots.len() < MIN_SPLINE_SAMPLES {
        return Err(SplineError::TooFewSamples(knots.len()));
    }
    if knots.iter().any(|t| !t.is_finite()) {
        return Err(SplineError::NonFiniteSample('t'));
    }
    if let Some(i) = knots.iter().tuple_windows().position(|(a, b)| b <= a) {
        return Err(SplineError::NonIncreasingKnots(i + 1));
    }
    Ok(())
}

/// Solve the not-a-knot system for the second derivatives of one axis.
///
/// The two end unknowns `M_0` and `M_{n-1}` are eliminated with the not-a-knot
/// conditions, leaving a tridiagonal system in `M_1..M_{n-2}` solved with the Thomas
/// algorithm.
fn fit_axis(knots: &[Time], values: &[f64], axis: char) -> Result<AxisSpline, SplineError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SplineError::NonFiniteSample(axis));
    }

    let n = knots.len();
    let h: Vec<f64> = knots.iter().tuple_windows().map(|(a, b)| b - a).collect();
    let slope: Vec<f64> = values
        .iter()
        .tuple_windows()
        .zip(&h)
        .map(|((a, b), hi)| (b - a) / hi)
        .collect();

    // Row j of the reduced system is the continuity equation at knot i = j + 1.
    let m = n - 2;
    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for j in 0..m {
        let i = j + 1;
        sub[j] = h[i - 1];
        diag[j] = 2.0 * (h[i - 1] + h[i]);
        sup[j] = h[i];
        rhs[j] = 6.0 * (slope[i] - slope[i - 1]);
    }

    // M_0 = ((h0 + h1)·M_1 - h0·M_2) / h1
    let (h0, h1) = (h[0], h[1]);
    diag[0] += h0 * (h0 + h1) / h1;
    sup[0] -= h0 * h0 / h1;
    sub[0] = 0.0;

    // M_{n-1} = ((a + b)·M_{n-2} - b·M_{n-3}) / a, with a = h_{n-3}, b = h_{n-2}
    let (a, b) = (h[n - 3], h[n - 2]);
    diag[m - 1] += b * (a + b) / a;
    sub[m - 1] -= b * b / a;
    sup[m - 1] = 0.0;

    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;

    let mut second_derivs = Vec::with_capacity(n);
    second_derivs.push(((h0 + h1) * inner[0] - h0 * inner[1]) / h1);
    second_derivs.extend_from_slice(&inner);
    second_derivs.push(((a + b) * inner[m - 1] - b * inner[m - 2]) / a);

    if second_derivs.iter().any(|v| !v.is_finite()) {
        return Err(SplineError::SingularSystem);
    }

    Ok(AxisSpline {
        values: values.to_vec(),
        second_derivs,
    })
}

/// Thomas algorithm. `sub[0]` and `sup[m-1]` are ignored.
fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> Result<Vec<f64>, SplineError> {
    let m = diag.len();
    let mut c = vec![0.0; m];
    let mut d = vec![0.0; m];

    for j in 0..m {
        let (prev_c, prev_d) = if j == 0 { (0.0, 0.0) } else { (c[j - 1], d[j - 1]) };
        let denom = diag[j] - sub[j] * prev_c;
        if denom == 0.0 || !denom.is_finite() {
            return Err(SplineError::SingularSystem);
        }
        c[j] = sup[j] / denom;
        d[j] = (rhs[j] - sub[j] * prev_d) / denom;
    }

    let mut out = d;
    for j in (0..m - 1).rev() {
        out[j] -= c[j] * out[j + 1];
    }
    Ok(out)
}

#[cfg(test)]
mod spline_test {
    use super::*;
    use approx::assert_relative_eq;

    fn traj(t: Vec<f64>, f: impl Fn(f64) -> f64) -> RawTrajectory {
        let x: Vec<f64> = t.iter().map(|&v| f(v)).collect();
        let y: Vec<f64> = t.iter().map(|&v| -2.0 * f(v)).collect();
        RawTrajectory::planar(t, x, y).unwrap()
    }

    #[test]
    fn test_passes_through_knots() {
        let t = vec![0.0, 1.0, 2.5, 3.0, 4.2, 6.0];
        let tr = RawTrajectory::planar(
            t.clone(),
            vec![2.0, 3.0, 5.0, 4.0, 1.0, 0.5],
            vec![0.0, -1.0, 1.0, 0.0, 2.0, 2.0],
        )
        .unwrap();
        let spline = SplineRepresentation::fit(&tr).unwrap();
        let s = spline.evaluate(&t);

        for i in 0..t.len() {
            assert_relative_eq!(s.x[i], tr.x()[i], epsilon = 1e-12);
            assert_relative_eq!(s.y[i], tr.y()[i], epsilon = 1e-12);
        }
        assert!(s.z.is_none());
    }

    #[test]
    fn test_reproduces_cubic_polynomial() {
        let f = |t: f64| t * t * t - 2.0 * t * t + 0.5 * t + 3.0;
        let tr = traj(vec![-1.0, 0.0, 0.7, 2.0, 2.5, 4.0, 5.5], f);
        let spline = SplineRepresentation::fit(&tr).unwrap();

        let probes = [-1.5, -0.5, 0.3, 1.1, 2.2, 3.3, 5.0, 6.0];
        let s = spline.evaluate(&probes);
        for (i, &t) in probes.iter().enumerate() {
            assert_relative_eq!(s.x[i], f(t), epsilon = 1e-9, max_relative = 1e-9);
            assert_relative_eq!(s.y[i], -2.0 * f(t), epsilon = 1e-9, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_four_samples_is_single_cubic() {
        let f = |t: f64| 2.0 * t * t * t - t + 1.0;
        let tr = traj(vec![0.0, 1.0, 3.0, 4.0], f);
        let spline = SplineRepresentation::fit(&tr).unwrap();
        let s = spline.evaluate(&[0.5, 2.0, 3.5]);
        assert_relative_eq!(s.x[0], f(0.5), epsilon = 1e-10);
        assert_relative_eq!(s.x[1], f(2.0), epsilon = 1e-10);
        assert_relative_eq!(s.x[2], f(3.5), epsilon = 1e-10);
    }

    #[test]
    fn test_linear_data_is_exact() {
        let tr = traj((0..10).map(|i| i as f64 * 10.0).collect(), |t| 3.0 * t + 1.0);
        let spline = SplineRepresentation::fit(&tr).unwrap();
        let s = spline.evaluate(&[5.0, 45.0, 95.0]);
        assert_relative_eq!(s.x[0], 16.0, epsilon = 1e-10);
        assert_relative_eq!(s.x[1], 136.0, epsilon = 1e-10);
        assert_relative_eq!(s.x[2], 286.0, epsilon = 1e-10);
    }

    #[test]
    fn test_third_axis_is_fitted() {
        let t = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let tr = RawTrajectory::new(
            t.clone(),
            vec![0.0; 5],
            vec![0.0; 5],
            Some(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        )
        .unwrap();
        let spline = SplineRepresentation::fit(&tr).unwrap();
        assert!(spline.has_z());
        let s = spline.evaluate(&[2.5]);
        assert_relative_eq!(s.z.unwrap()[0], 3.5, epsilon = 1e-12);
    }

    #[test]
    fn test_too_few_samples() {
        let tr = traj(vec![0.0, 1.0, 2.0], |t| t);
        assert_eq!(
            SplineRepresentation::fit(&tr),
            Err(SplineError::TooFewSamples(3))
        );
    }

    #[test]
    fn test_non_finite_position() {
        let tr = RawTrajectory::planar(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![0.0, f64::INFINITY, 0.0, 0.0],
            vec![0.0; 4],
        )
        .unwrap();
        assert_eq!(
            SplineRepresentation::fit(&tr),
            Err(SplineError::NonFiniteSample('x'))
        );
    }
}

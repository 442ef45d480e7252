//! # Scrub time index
//!
//! Converts between a normalized scrub fraction and absolute simulation time over the
//! dataset's time span.
//!
//! The span is the **union** of every loaded body's sample span: `t_min` is the earliest
//! first sample, `t_max` the latest last sample.

use serde::{Deserialize, Serialize};

use crate::{constants::Time, raw_trajectory::RawTrajectory};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeIndex {
    t_min: Time,
    t_max: Time,
}

impl TimeIndex {
    /// Build an index over an explicit span. The bounds are swapped if given in reverse.
    pub fn new(t_min: Time, t_max: Time) -> Self {
        if t_max < t_min {
            TimeIndex {
                t_min: t_max,
                t_max: t_min,
            }
        } else {
            TimeIndex { t_min, t_max }
        }
    }

    /// Union of the spans of the given trajectories, `None` when there are none.
    pub fn from_trajectories<'a, I>(trajectories: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a RawTrajectory>,
    {
        trajectories
            .into_iter()
            .map(RawTrajectory::span)
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
            .map(|(lo, hi)| TimeIndex::new(lo, hi))
    }

    pub fn t_min(&self) -> Time {
        self.t_min
    }

    pub fn t_max(&self) -> Time {
        self.t_max
    }

    /// Absolute time at `fraction` of the span. Fractions outside `[0, 1]` extrapolate.
    pub fn get_t(&self, fraction: f64) -> Time {
        self.t_min + fraction * (self.t_max - self.t_min)
    }

    pub fn get_t_span(&self) -> Time {
        self.t_max - self.t_min
    }

    /// Inverse of [`get_t`](Self::get_t); `0.0` for a zero-length span.
    pub fn get_fraction(&self, t: Time) -> f64 {
        let span = self.get_t_span();
        if span == 0.0 {
            0.0
        } else {
            (t - self.t_min) / span
        }
    }
}

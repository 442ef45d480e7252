//! # PathCache: reference-frame and resampling engine
//!
//! [`PathCache`] holds one **generation** of loaded trajectories and answers
//! reference-frame queries over them, memoizing every intermediate result.
//!
//! Caches
//! -----------------
//! | cache       | key                   | value                                          |
//! |-------------|-----------------------|------------------------------------------------|
//! | splines     | `body`                | fitted interpolant, or *unavailable*           |
//! | aligned     | `(ref, target)`       | ref spline evaluated at the target's times     |
//! | grids       | [`GridKey`]           | uniform grid over the ref span                 |
//! | on_grid     | `(body, GridKey)`     | body spline evaluated on that grid             |
//! | derived     | [`PathKey`]           | final [`DerivedPath`], or *unavailable*        |
//!
//! Every outcome is cached, including failed spline fits and unavailable results, so a
//! repeated query is a single map lookup: no fitting, no interpolation, no allocation of
//! new paths. [`PathCache::stats`] exposes counters to check this.
//!
//! Outcomes
//! -----------------
//! * `Err(PathError::UnknownBody)` – the target was never loaded (a caller bug).
//! * `Ok(None)` – *unavailable*: nothing to draw for this combination (reference unknown,
//!   too few samples to fit a spline, empty grid).
//! * `Ok(Some(path))` – the derived path, shared through an [`Arc`].
//!
//! Concurrency
//! -----------------
//! Population ([`PathCache::set`]) takes `&mut self` and resets every cache. Queries take
//! `&self`; caches live behind [`RwLock`]s, so a fully loaded generation can be shared
//! between threads. Two threads racing on the same missing key may both compute it; the
//! first insert wins and the results are identical.
//!
//! ## Example
//!
//! ```rust
//! use trajframe::path_cache::PathCache;
//! use trajframe::raw_trajectory::RawTrajectory;
//!
//! let t: Vec<f64> = (0..=10).map(|i| i as f64 * 100.0).collect();
//! let mut cache = PathCache::new();
//! cache.set(399, RawTrajectory::planar(t.clone(), t.clone(), vec![0.0; 11]).unwrap());
//! let moon_x = t.iter().map(|v| 2.0 * v).collect();
//! cache.set(301, RawTrajectory::planar(t.clone(), moon_x, vec![0.0; 11]).unwrap());
//!
//! let moon_around_earth = cache.get(301, Some(399), Some(100.0)).unwrap().unwrap();
//! assert_eq!(moon_around_earth.len(), 10);
//! ```

use std::{
    collections::BTreeSet,
    hash::Hash,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, PoisonError, RwLock,
    },
};

use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{BodyId, FastHashMap, Time, DEFAULT_MAX_GRID_LEN},
    derived_path::{DerivedPath, Frame, PathKey},
    path_errors::PathError,
    raw_trajectory::{BodyTrajectory, RawTrajectory},
    resample_grid::{uniform_grid, GridKey},
    spline::{SplineRepresentation, SplineSamples},
    time_index::TimeIndex,
};

type Memo<K, V> = RwLock<FastHashMap<K, V>>;

/// Tuning knobs of a [`PathCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathCacheParams {
    /// Maximum number of points of a resampling grid.
    pub max_grid_len: usize,
}

impl PathCacheParams {
    pub fn builder() -> PathCacheParamsBuilder {
        PathCacheParamsBuilder::new()
    }
}

impl Default for PathCacheParams {
    fn default() -> Self {
        PathCacheParams {
            max_grid_len: DEFAULT_MAX_GRID_LEN,
        }
    }
}

/// Builder for [`PathCacheParams`], with validation.
#[derive(Debug, Clone)]
pub struct PathCacheParamsBuilder {
    params: PathCacheParams,
}

impl Default for PathCacheParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathCacheParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: PathCacheParams::default(),
        }
    }

    pub fn max_grid_len(mut self, v: usize) -> Self {
        self.params.max_grid_len = v;
        self
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ----------
    /// * [`PathError::InvalidParameter`] if `max_grid_len` is zero.
    pub fn build(self) -> Result<PathCacheParams, PathError> {
        if self.params.max_grid_len == 0 {
            return Err(PathError::InvalidParameter(
                "max_grid_len must be >= 1".into(),
            ));
        }
        Ok(self.params)
    }
}

/// Snapshot of the work counters of a [`PathCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Spline fits attempted (successful or not).
    pub spline_fits: usize,
    /// Spline evaluations over a time array.
    pub interpolations: usize,
    /// Resampling grids built.
    pub grid_builds: usize,
    /// Derived paths computed (including unavailable outcomes).
    pub derived_paths: usize,
}

#[derive(Debug, Default)]
struct Counters {
    spline_fits: AtomicUsize,
    interpolations: AtomicUsize,
    grid_builds: AtomicUsize,
    derived_paths: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            spline_fits: self.spline_fits.load(Ordering::Relaxed),
            interpolations: self.interpolations.load(Ordering::Relaxed),
            grid_builds: self.grid_builds.load(Ordering::Relaxed),
            derived_paths: self.derived_paths.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
pub struct PathCache {
    params: PathCacheParams,
    raw: FastHashMap<BodyId, RawTrajectory>,
    splines: Memo<BodyId, Option<Arc<SplineRepresentation>>>,
    aligned: Memo<(BodyId, BodyId), Arc<SplineSamples>>,
    grids: Memo<GridKey, Arc<Vec<Time>>>,
    on_grid: Memo<(BodyId, GridKey), Arc<SplineSamples>>,
    derived: Memo<PathKey, Option<Arc<DerivedPath>>>,
    time_index: OnceCell<Option<TimeIndex>>,
    counters: Counters,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: PathCacheParams) -> Self {
        PathCache {
            params,
            ..Self::default()
        }
    }

    /// Build a cache from loaded trajectories; later entries overwrite earlier ones
    /// with the same body id.
    pub fn from_trajectories<I>(trajectories: I, params: PathCacheParams) -> Self
    where
        I: IntoIterator<Item = BodyTrajectory>,
    {
        let mut cache = Self::with_params(params);
        for BodyTrajectory { body, path } in trajectories {
            cache.set(body, path);
        }
        cache
    }

    pub fn params(&self) -> &PathCacheParams {
        &self.params
    }

    /// Register or overwrite a body's raw path.
    ///
    /// Every derived cache is dropped, so nothing computed from a previous path
    /// survives.
    pub fn set(&mut self, body: BodyId, path: RawTrajectory) {
        if self.raw.insert(body, path).is_some() {
            debug!("body {body} overwritten");
        }
        self.reset_caches();
    }

    fn reset_caches(&mut self) {
        clear(&mut self.splines);
        clear(&mut self.aligned);
        clear(&mut self.grids);
        clear(&mut self.on_grid);
        clear(&mut self.derived);
        self.time_index.take();
    }

    /// All loaded bodies, sorted.
    pub fn bodies(&self) -> BTreeSet<BodyId> {
        self.raw.keys().copied().collect()
    }

    pub fn contains(&self, body: BodyId) -> bool {
        self.raw.contains_key(&body)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Raw samples of a body, or [`PathError::UnknownBody`].
    pub fn get_raw(&self, body: BodyId) -> Result<&RawTrajectory, PathError> {
        self.raw.get(&body).ok_or(PathError::UnknownBody(body))
    }

    /// Union of every loaded body's time span, `None` when nothing is loaded.
    pub fn time_index(&self) -> Option<TimeIndex> {
        *self
            .time_index
            .get_or_init(|| TimeIndex::from_trajectories(self.raw.values()))
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Spline of a body, fitted on first use.
    ///
    /// A failed fit (too few samples, degenerate data) is remembered as `None` and never
    /// re-attempted. Unknown bodies also yield `None`.
    pub fn get_spline(&self, body: BodyId) -> Option<Arc<SplineRepresentation>> {
        let raw = self.raw.get(&body)?;
        memoize(&self.splines, body, || {
            Counters::bump(&self.counters.spline_fits);
            match SplineRepresentation::fit(raw) {
                Ok(spline) => Ok(Some(Arc::new(spline))),
                Err(err) => {
                    debug!("no spline for body {body}: {err}");
                    Ok(None)
                }
            }
        })
        .unwrap_or(None)
    }

    /// Position of `target` relative to `reference`, optionally resampled every `dt`.
    ///
    /// Arguments
    /// -----------------
    /// * `target`: body whose motion is expressed.
    /// * `reference`: origin body, or `None` for the raw path.
    /// * `dt`: resampling step; ignored when `reference` is `None`.
    ///
    /// Return
    /// ----------
    /// * See [`query`](Self::query).
    pub fn get(
        &self,
        target: BodyId,
        reference: Option<BodyId>,
        dt: Option<f64>,
    ) -> Result<Option<Arc<DerivedPath>>, PathError> {
        self.get_raw(target)?;
        self.query(target, Frame::from_query(reference, dt)?)
    }

    /// Derived path of `target` in `frame`, computed on first request and cached.
    ///
    /// Return
    /// ----------
    /// * `Ok(Some(path))` – the derived path.
    /// * `Ok(None)` – unavailable (unknown reference, spline could not be fitted, empty grid).
    /// * `Err(PathError::UnknownBody)` – `target` was never loaded.
    /// * `Err(PathError::GridTooLarge)` – the step is too fine for
    ///   [`PathCacheParams::max_grid_len`].
    pub fn query(
        &self,
        target: BodyId,
        frame: Frame,
    ) -> Result<Option<Arc<DerivedPath>>, PathError> {
        let target_raw = self.get_raw(target)?;

        memoize(&self.derived, PathKey { target, frame }, || {
            Counters::bump(&self.counters.derived_paths);
            debug!("computing body {target} in {frame:?}");

            let path = match frame {
                Frame::Raw => Some(DerivedPath::from_raw(target_raw)),
                Frame::AlignedTo(reference) => self
                    .reference_at_target_times(reference, target)?
                    .map(|r| DerivedPath::aligned(target_raw, &r)),
                Frame::Resampled { reference, step } => {
                    self.resampled(target, GridKey { reference, step })?
                }
            };
            Ok(path.map(Arc::new))
        })
    }

    /// Reference spline evaluated at the target's own timestamps.
    fn reference_at_target_times(
        &self,
        reference: BodyId,
        target: BodyId,
    ) -> Result<Option<Arc<SplineSamples>>, PathError> {
        if !self.contains(reference) {
            warn!("reference body {reference} is not loaded");
            return Ok(None);
        }
        let (Some(spline), Ok(target_raw)) =
            (self.get_spline(reference), self.get_raw(target))
        else {
            return Ok(None);
        };

        memoize(&self.aligned, (reference, target), || {
            Counters::bump(&self.counters.interpolations);
            Ok(Arc::new(spline.evaluate(target_raw.t())))
        })
        .map(Some)
    }

    /// Uniform grid over the reference span, `None` for an unknown reference.
    pub fn get_grid(&self, key: GridKey) -> Result<Option<Arc<Vec<Time>>>, PathError> {
        let Some(reference) = self.raw.get(&key.reference) else {
            warn!("reference body {} is not loaded", key.reference);
            return Ok(None);
        };

        memoize(&self.grids, key, || {
            Counters::bump(&self.counters.grid_builds);
            let (start, stop) = reference.span();
            uniform_grid(start, stop, key.step, self.params.max_grid_len).map(Arc::new)
        })
        .map(Some)
    }

    /// Spline of `body` evaluated on the grid identified by `key`.
    fn body_on_grid(
        &self,
        body: BodyId,
        key: GridKey,
        grid: &[Time],
    ) -> Option<Arc<SplineSamples>> {
        let spline = self.get_spline(body)?;
        memoize(&self.on_grid, (body, key), || {
            Counters::bump(&self.counters.interpolations);
            Ok(Arc::new(spline.evaluate(grid)))
        })
        .ok()
    }

    fn resampled(&self, target: BodyId, key: GridKey) -> Result<Option<DerivedPath>, PathError> {
        let Some(grid) = self.get_grid(key)? else {
            return Ok(None);
        };
        if grid.is_empty() {
            debug!("empty grid for {key:?}");
            return Ok(None);
        }

        let target_samples = self.body_on_grid(target, key, &grid);
        let reference_samples = self.body_on_grid(key.reference, key, &grid);

        Ok(match (target_samples, reference_samples) {
            (Some(t), Some(r)) => Some(DerivedPath::resampled(&grid, &t, &r)),
            _ => None,
        })
    }
}

/// Look `key` up in `memo`, computing and inserting it on a miss.
///
/// The computation runs without holding the lock; errors are returned without being
/// cached.
fn memoize<K, V, F>(memo: &Memo<K, V>, key: K, compute: F) -> Result<V, PathError>
where
    K: Eq + Hash,
    V: Clone,
    F: FnOnce() -> Result<V, PathError>,
{
    if let Some(hit) = memo
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(hit.clone());
    }

    let value = compute()?;
    Ok(memo
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key)
        .or_insert(value)
        .clone())
}

fn clear<K, V>(memo: &mut Memo<K, V>) {
    memo.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
}

//! # Constants and type definitions for trajframe
//!
//! Centralizes the **numerical constants**, **unit conversions**, and **common type
//! aliases** shared by the trajectory store, the spline fitter and the loaders.
//!
//! ## Overview
//!
//! - Body identifiers and sample scalar aliases
//! - Spline fitting limits
//! - Default load-time rotation angle (Earth's axial obliquity)
//! - Fast hash map alias used by every cache

use std::collections::HashMap;

use ahash::RandomState;

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Tilt applied to simulator output at load time, in degrees.
///
/// The simulator writes equatorial coordinates; rotating about the x axis by
/// minus this angle brings the orbital plane close to the `xy` plane.
pub const EARTH_OBLIQUITY_DEG: f64 = 23.5;

// -------------------------------------------------------------------------------------------------
// Fitting limits
// -------------------------------------------------------------------------------------------------

/// Minimum number of samples needed to fit a cubic spline.
pub const MIN_SPLINE_SAMPLES: usize = 4;

/// Default cap on the number of points of a resampling grid.
pub const DEFAULT_MAX_GRID_LEN: usize = 10_000_000;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Identifier of a body (NAIF id; spacecraft use negative ids)
pub type BodyId = i32;

/// Simulation time, in the simulator's own unit (seconds)
pub type Time = f64;

/// Hash map with `ahash` hashing, used for all internal caches.
pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

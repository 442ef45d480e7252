//! # trajframe
//!
//! Reference-frame and resampling engine for simulated trajectories.
//!
//! Raw per-body samples are loaded into a [`PathCache`], which answers
//! "where is body A relative to body B" queries, optionally resampled on a uniform time
//! grid, and memoizes every intermediate result for interactive use.
//!
//! * [`raw_trajectory`] – validated raw samples.
//! * [`spline`] – not-a-knot cubic spline interpolants.
//! * [`resample_grid`] – uniform time grids.
//! * [`path_cache`] – the caching query engine.
//! * [`time_index`] – scrub fraction ↔ absolute time.
//! * [`loader`] – simulator sample files.
//! * [`chart`] – chart description files.
//! * [`generation`] – swapping in reloaded data.

pub mod chart;
pub mod constants;
pub mod derived_path;
pub mod generation;
pub mod loader;
pub mod path_cache;
pub mod path_errors;
pub mod raw_trajectory;
pub mod resample_grid;
pub mod spline;
pub mod time_index;

pub use constants::BodyId;
pub use derived_path::{DerivedPath, Frame};
pub use generation::Generations;
pub use path_cache::{PathCache, PathCacheParams};
pub use path_errors::PathError;
pub use raw_trajectory::RawTrajectory;
pub use time_index::TimeIndex;

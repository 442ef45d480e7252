//! # Simulator sample files
//!
//! Reads the per-body position files written by the simulator into a fresh
//! [`PathCache`].
//!
//! File layout
//! -----------------
//! A data directory holds one file per body, named `<prefix><id>.bin` (default prefix
//! `pos`, e.g. `pos399.bin`, `pos-1000.bin`). Each file is a flat sequence of records of
//! four little-endian `f64`: `(x, y, z, t)`.
//!
//! Policy
//! -----------------
//! * Files whose name does not match the pattern are ignored.
//! * Empty files are skipped: the body is never registered.
//! * A length that is not a multiple of the record size is [`PathError::MalformedSampleFile`].
//! * Records whose time does not advance past the previous kept record are dropped
//!   (with a warning), so every loaded trajectory has strictly increasing times.
//! * The configured rotation (default: x-axis tilt by the obliquity) is applied to every
//!   position before the trajectory is registered.
//! * Files are processed in sorted name order.

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use nalgebra::{Rotation3, Vector3};

use crate::{
    constants::{BodyId, EARTH_OBLIQUITY_DEG, RADEG},
    path_cache::{PathCache, PathCacheParams},
    path_errors::PathError,
    raw_trajectory::{BodyTrajectory, RawTrajectory},
};

/// Size of one `(x, y, z, t)` record in bytes.
pub const RECORD_SIZE: usize = 4 * std::mem::size_of::<f64>();

/// Rotation about the x axis by minus the Earth's obliquity.
pub fn obliquity_rotation() -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), -EARTH_OBLIQUITY_DEG * RADEG)
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Rotation applied to every position, `None` to keep simulator coordinates.
    pub rotation: Option<Rotation3<f64>>,
    /// File name prefix preceding the body id.
    pub prefix: String,
    /// Parameters of the cache being built.
    pub params: PathCacheParams,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            rotation: Some(obliquity_rotation()),
            prefix: "pos".into(),
            params: PathCacheParams::default(),
        }
    }
}

/// Extract the body id from a file name such as `pos399.bin`.
pub fn body_id_from_file_name(name: &str, prefix: &str) -> Option<BodyId> {
    name.strip_prefix(prefix)?
        .strip_suffix(".bin")?
        .parse()
        .ok()
}

/// Decode `(x, y, z, t)` records into a trajectory.
///
/// Return
/// ----------
/// * `Ok(None)` for an empty buffer.
/// * [`PathError::MalformedSampleFile`] if the buffer is not a whole number of records.
pub fn trajectory_from_bytes(bytes: &[u8]) -> Result<Option<RawTrajectory>, PathError> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(PathError::MalformedSampleFile(format!(
            "{} bytes is not a multiple of the {RECORD_SIZE}-byte record size",
            bytes.len()
        )));
    }

    let records = bytes.chunks_exact(RECORD_SIZE).map(|rec| {
        let field = |i: usize| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&rec[8 * i..8 * (i + 1)]);
            f64::from_le_bytes(buf)
        };
        [field(0), field(1), field(2), field(3)]
    });

    trajectory_from_records(records)
}

/// Build a trajectory from `[x, y, z, t]` records, dropping records whose time is not
/// finite or does not advance.
pub fn trajectory_from_records<I>(records: I) -> Result<Option<RawTrajectory>, PathError>
where
    I: IntoIterator<Item = [f64; 4]>,
{
    let records = records.into_iter();
    let cap = records.size_hint().0;
    let (mut t, mut x, mut y, mut z) = (
        Vec::with_capacity(cap),
        Vec::with_capacity(cap),
        Vec::with_capacity(cap),
        Vec::with_capacity(cap),
    );

    let mut dropped = 0usize;
    for [xi, yi, zi, ti] in records {
        let advances = ti.is_finite() && t.last().map_or(true, |&prev| ti > prev);
        if !advances {
            dropped += 1;
            continue;
        }
        t.push(ti);
        x.push(xi);
        y.push(yi);
        z.push(zi);
    }

    if dropped > 0 {
        warn!("dropped {dropped} samples with a non-finite or non-advancing time");
    }
    if t.is_empty() {
        return Ok(None);
    }
    RawTrajectory::new(t, x, y, Some(z)).map(Some)
}

/// Read one sample file.
pub fn read_trajectory_file(path: &Utf8Path) -> Result<Option<RawTrajectory>, PathError> {
    let bytes = std::fs::read(path)?;
    trajectory_from_bytes(&bytes).map_err(|err| match err {
        PathError::MalformedSampleFile(msg) => {
            PathError::MalformedSampleFile(format!("{path}: {msg}"))
        }
        other => other,
    })
}

/// Sample files of a directory with their body ids, sorted by file name.
pub fn sample_files(
    dir: &Utf8Path,
    prefix: &str,
) -> Result<Vec<(BodyId, Utf8PathBuf)>, PathError> {
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry in {dir}: {err}");
                continue;
            }
        };
        if let Some(id) = body_id_from_file_name(entry.file_name(), prefix) {
            files.push((id, entry.into_path()));
        }
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Load every body of a data directory.
pub fn load_trajectories(
    dir: &Utf8Path,
    opts: &LoadOptions,
) -> Result<Vec<BodyTrajectory>, PathError> {
    let mut out = Vec::new();
    for (body, path) in sample_files(dir, &opts.prefix)? {
        let Some(raw) = read_trajectory_file(&path)? else {
            debug!("{path} is empty, body {body} skipped");
            continue;
        };
        let path = match &opts.rotation {
            Some(rot) => raw.rotated(rot),
            None => raw,
        };
        out.push(BodyTrajectory { body, path });
    }
    Ok(out)
}

/// Load a data directory into a new generation.
///
/// See also
/// ------------
/// * [`Generations::replace`](crate::generation::Generations::replace) – publish the result.
pub fn load_dir(dir: &Utf8Path, opts: &LoadOptions) -> Result<PathCache, PathError> {
    let trajectories = load_trajectories(dir, opts)?;
    info!("loaded {} bodies from {dir}", trajectories.len());
    Ok(PathCache::from_trajectories(trajectories, opts.params.clone()))
}

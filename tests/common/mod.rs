#![allow(dead_code)]

use std::path::Path;

use approx::assert_relative_eq;
use trajframe::{BodyId, DerivedPath, PathCache, RawTrajectory};

/// Planar body moving along `x = slope·t`, `y = offset`.
pub fn linear_body(slope: f64, offset: f64, t: &[f64]) -> RawTrajectory {
    let x = t.iter().map(|v| slope * v).collect();
    let y = vec![offset; t.len()];
    RawTrajectory::planar(t.to_vec(), x, y).unwrap()
}

/// Body on a circular orbit of the given radius and period.
pub fn circular_body(radius: f64, period: f64, t: &[f64]) -> RawTrajectory {
    let w = std::f64::consts::TAU / period;
    let x = t.iter().map(|v| radius * (w * v).cos()).collect();
    let y = t.iter().map(|v| radius * (w * v).sin()).collect();
    let z = vec![0.0; t.len()];
    RawTrajectory::new(t.to_vec(), x, y, Some(z)).unwrap()
}

pub fn times(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64 * step).collect()
}

pub fn cache_with(bodies: Vec<(BodyId, RawTrajectory)>) -> PathCache {
    let mut cache = PathCache::new();
    for (id, path) in bodies {
        cache.set(id, path);
    }
    cache
}

pub fn assert_path_close(
    actual: &DerivedPath,
    expected_x: &[f64],
    expected_y: &[f64],
    epsilon: f64,
) {
    assert_eq!(actual.x.len(), expected_x.len());
    assert_eq!(actual.y.len(), expected_y.len());
    for (a, e) in actual.x.iter().zip(expected_x) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
    for (a, e) in actual.y.iter().zip(expected_y) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}

/// Write a simulator sample file with `(x, y, z, t)` records.
pub fn write_sample_file(path: &Path, records: &[[f64; 4]]) {
    let bytes: Vec<u8> = records
        .iter()
        .flat_map(|r| r.iter().flat_map(|v| v.to_le_bytes()))
        .collect();
    std::fs::write(path, bytes).unwrap();
}

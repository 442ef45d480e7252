mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use common::{assert_path_close, cache_with, circular_body, linear_body, times};
use trajframe::{Frame, Generations, PathCache, PathError, RawTrajectory};

#[test]
fn test_raw_query_is_identity() {
    let t = vec![0.0, 0.3, 1.7, 2.0];
    let raw = RawTrajectory::new(
        t.clone(),
        vec![0.1, 0.2, 0.3, 0.4],
        vec![1.1, 1.2, 1.3, 1.4],
        Some(vec![9.0, 8.0, 7.0, 6.0]),
    )
    .unwrap();
    let cache = cache_with(vec![(10, raw.clone())]);

    let path = cache.get(10, None, None).unwrap().unwrap();
    assert_eq!(path.t, raw.t());
    assert_eq!(path.x, raw.x());
    assert_eq!(path.y, raw.y());
    assert_eq!(path.z.as_deref(), raw.z());
}

#[test]
fn test_repeated_query_does_not_recompute() {
    let t = times(0.0, 10.0, 50);
    let cache = cache_with(vec![
        (399, circular_body(1.0, 365.0, &t)),
        (301, circular_body(1.1, 27.0, &t)),
    ]);

    let first = cache.get(301, Some(399), Some(5.0)).unwrap().unwrap();
    let after_first = cache.stats();
    let second = cache.get(301, Some(399), Some(5.0)).unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.stats(), after_first);

    let aligned = cache.get(301, Some(399), None).unwrap().unwrap();
    let after_aligned = cache.stats();
    let again = cache.query(301, Frame::AlignedTo(399)).unwrap().unwrap();
    assert!(Arc::ptr_eq(&aligned, &again));
    assert_eq!(cache.stats(), after_aligned);
    // The reference spline was already fitted by the resampled query.
    assert_eq!(after_aligned.spline_fits, after_first.spline_fits);
}

#[test]
fn test_unknown_body() {
    let cache = cache_with(vec![(399, linear_body(1.0, 0.0, &times(0.0, 1.0, 5)))]);

    assert_eq!(cache.get(9999, None, None), Err(PathError::UnknownBody(9999)));
    assert_eq!(
        cache.get(9999, Some(399), Some(1.0)),
        Err(PathError::UnknownBody(9999))
    );
    // An unknown target wins over an invalid step.
    assert_eq!(
        cache.get(9999, Some(399), Some(0.0)),
        Err(PathError::UnknownBody(9999))
    );
    assert!(matches!(
        cache.get_raw(9999),
        Err(PathError::UnknownBody(9999))
    ));
}

#[test]
fn test_insufficient_samples() {
    let cache = cache_with(vec![
        (1, linear_body(1.0, 0.0, &[0.0, 1.0])),
        (2, linear_body(2.0, 0.0, &times(0.0, 1.0, 10))),
    ]);

    assert!(cache.bodies().contains(&1));
    assert!(cache.get(1, None, None).unwrap().is_some());

    assert_eq!(cache.get(2, Some(1), None).unwrap(), None);
    assert_eq!(cache.get(2, Some(1), Some(0.5)).unwrap(), None);
    assert_eq!(cache.get(1, Some(2), Some(0.5)).unwrap(), None);

    // Event-aligned only needs the reference spline.
    let aligned = cache.get(1, Some(2), None).unwrap().unwrap();
    assert_path_close(&aligned, &[-0.0, -1.0], &[0.0, 0.0], 1e-12);

    // The failed fit is remembered.
    let fits = cache.stats().spline_fits;
    assert_eq!(cache.get(2, Some(1), Some(0.25)).unwrap(), None);
    assert_eq!(cache.stats().spline_fits, fits);
}

#[test]
fn test_unavailable_result_is_cached() {
    let cache = cache_with(vec![
        (1, linear_body(1.0, 0.0, &[0.0, 1.0])),
        (2, linear_body(2.0, 0.0, &times(0.0, 1.0, 10))),
    ]);

    assert_eq!(cache.get(2, Some(1), Some(0.5)).unwrap(), None);
    let stats = cache.stats();
    assert_eq!(stats.derived_paths, 1);

    assert_eq!(cache.get(2, Some(1), Some(0.5)).unwrap(), None);
    assert_eq!(cache.stats(), stats);
}

#[test]
fn test_grid_sizing() {
    let t = times(0.0, 50.0, 21);
    let cache = cache_with(vec![
        (399, linear_body(1.0, 0.0, &t)),
        (-1000, linear_body(3.0, 2.0, &times(-100.0, 70.0, 30))),
    ]);

    let path = cache.get(-1000, Some(399), Some(100.0)).unwrap().unwrap();
    assert_eq!(path.len(), 10);
    assert_eq!(path.t, times(0.0, 100.0, 10));

    let expected_x: Vec<f64> = path.t.iter().map(|t| 2.0 * t).collect();
    assert_path_close(&path, &expected_x, &[2.0; 10], 1e-8);
}

#[test]
fn test_reference_subtraction() {
    let t = times(0.0, 1.0, 12);
    let cache = cache_with(vec![
        (399, linear_body(1.0, 0.0, &t)),
        (301, linear_body(2.0, 0.0, &t)),
    ]);

    let path = cache.get(301, Some(399), None).unwrap().unwrap();
    assert_eq!(path.t, t);
    for (x, t) in path.x.iter().zip(&t) {
        assert_relative_eq!(*x, *t, epsilon = 1e-12);
    }
}

#[test]
fn test_self_reference_is_near_zero() {
    let t = times(0.0, 3.0, 40);
    let cache = cache_with(vec![(399, circular_body(2.0, 50.0, &t))]);

    let aligned = cache.get(399, Some(399), None).unwrap().unwrap();
    assert!(aligned.x.iter().all(|v| v.abs() < 1e-12));

    let resampled = cache.get(399, Some(399), Some(1.3)).unwrap().unwrap();
    assert!(resampled.x.iter().all(|v| *v == 0.0));
    assert_eq!(resampled.z.as_ref().map(Vec::len), Some(resampled.len()));
}

#[test]
fn test_invalid_step() {
    let cache = cache_with(vec![(399, linear_body(1.0, 0.0, &times(0.0, 1.0, 5)))]);
    assert_eq!(
        cache.get(399, Some(399), Some(0.0)),
        Err(PathError::InvalidTimeStep(0.0))
    );
    // Without a reference the step is ignored.
    assert!(cache.get(399, None, Some(0.0)).unwrap().is_some());
}

#[test]
fn test_generation_isolation() {
    let t = times(0.0, 1.0, 10);
    let gens = Generations::new(cache_with(vec![
        (399, linear_body(1.0, 0.0, &t)),
        (301, linear_body(2.0, 0.0, &t)),
    ]));

    let old = gens.current().get(301, Some(399), Some(1.0)).unwrap().unwrap();
    assert_relative_eq!(old.x[5], 5.0, epsilon = 1e-10);

    let mut reloaded = PathCache::new();
    reloaded.set(399, linear_body(1.0, 0.0, &t));
    reloaded.set(301, linear_body(5.0, 0.0, &t));
    gens.replace(reloaded);

    let new = gens.current().get(301, Some(399), Some(1.0)).unwrap().unwrap();
    assert_relative_eq!(new.x[5], 20.0, epsilon = 1e-10);
    assert_relative_eq!(old.x[5], 5.0, epsilon = 1e-10);
}

#[test]
fn test_time_index_is_union_of_spans() {
    let cache = cache_with(vec![
        (1, linear_body(1.0, 0.0, &times(100.0, 1.0, 10))),
        (2, linear_body(1.0, 0.0, &times(50.0, 10.0, 3))),
    ]);
    let idx = cache.time_index().unwrap();
    assert_eq!(idx.t_min(), 50.0);
    assert_eq!(idx.t_max(), 109.0);
    assert_eq!(idx.get_t_span(), 59.0);
    assert_eq!(idx.get_t(0.5), 79.5);

    assert!(PathCache::new().time_index().is_none());
}

#[test]
fn test_queries_from_threads() {
    let t = times(0.0, 10.0, 100);
    let cache = Arc::new(cache_with(vec![
        (399, circular_body(1.0, 365.0, &t)),
        (301, circular_body(1.1, 27.0, &t)),
    ]));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || cache.get(301, Some(399), Some(10.0)).unwrap().unwrap())
        })
        .collect();
    let paths: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for p in &paths[1..] {
        assert_eq!(**p, *paths[0]);
    }
}

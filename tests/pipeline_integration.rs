//! End-to-end tests of `compute_delaunay` and its value boundary.
//!
//! ## Test Coverage
//!
//! - Empty and short inputs
//! - Single tetrahedron and degenerate (coplanar) input
//! - Determinism across runs and threads
//! - Wrap-around adjacency in periodic mode
//! - Index range of every emitted cell

use periodic_delaunay::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn random_points(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..3 * n).map(|_| rng.random_range(0.0..1.0)).collect()
}

/// A 4×4×4 lattice at the cell centers of the unit cube.
fn lattice() -> Vec<f64> {
    let mut coords = Vec::new();
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                coords.extend([i, j, k].map(|c| 0.125 + 0.25 * f64::from(c)));
            }
        }
    }
    coords
}

fn shares_cell(cells: &[Tetrahedron], a: usize, b: usize) -> bool {
    cells.iter().any(|c| c.contains(&a) && c.contains(&b))
}

// =============================================================================
// BASIC OUTCOMES
// =============================================================================

#[test]
fn test_zero_points_is_empty_in_both_modes() {
    init_tracing();
    assert!(compute_delaunay(&[], 0, false).unwrap().is_empty());
    assert!(compute_delaunay(&[], 0, true).unwrap().is_empty());
}

#[test]
fn test_four_points_give_one_cell() {
    let points = [0.1, 0.2, 0.1, 0.8, 0.1, 0.2, 0.2, 0.9, 0.1, 0.3, 0.3, 0.8];
    let cells = compute_delaunay(&points, 4, false).unwrap();
    assert_eq!(cells.len(), 1);
    let mut corners = cells[0];
    corners.sort_unstable();
    assert_eq!(corners, [0, 1, 2, 3]);
}

#[test]
fn test_coplanar_points_give_no_cells() {
    init_tracing();
    let points = [0.1, 0.1, 0.5, 0.8, 0.2, 0.5, 0.3, 0.7, 0.5, 0.6, 0.6, 0.5];
    assert!(compute_delaunay(&points, 4, false).unwrap().is_empty());
}

#[test]
fn test_short_buffer_is_invalid_input() {
    let err = compute_delaunay(&[0.1; 8], 3, true).unwrap_err();
    assert!(matches!(
        err,
        DelaunayError::InvalidInput(InputError::InsufficientCoordinates {
            expected: 9,
            actual: 8
        })
    ));
}

#[test]
fn test_trailing_coordinates_are_ignored() {
    let mut points = random_points(30, 4);
    let reference = compute_delaunay(&points, 30, false).unwrap();
    points.extend([0.5, 0.5]);
    assert_eq!(compute_delaunay(&points, 30, false).unwrap(), reference);
}

#[test]
fn test_indices_are_in_range() {
    for periodic in [false, true] {
        let points = random_points(80, 17);
        let cells = compute_delaunay(&points, 80, periodic).unwrap();
        assert!(!cells.is_empty());
        assert!(cells.iter().flatten().all(|&i| i < 80));
    }
}

// =============================================================================
// DETERMINISM
// =============================================================================

#[test]
fn test_identical_input_gives_identical_output() {
    let points = random_points(100, 99);
    for periodic in [false, true] {
        let first = compute_delaunay(&points, 100, periodic).unwrap();
        let second = compute_delaunay(&points, 100, periodic).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_concurrent_requests_agree() {
    let points = random_points(60, 5);
    let reference = compute_delaunay(&points, 60, true).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let points = points.clone();
            std::thread::spawn(move || compute_delaunay(&points, 60, true).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), reference);
    }
}

// =============================================================================
// PERIODIC ADJACENCY
// =============================================================================

#[test]
fn test_points_across_the_boundary_are_adjacent_only_when_periodic() {
    init_tracing();
    let mut points = lattice();
    let a = points.len() / 3;
    points.extend([0.99, 0.5, 0.5]);
    let b = a + 1;
    points.extend([0.01, 0.5, 0.5]);
    points.extend([0.5, 0.5, 0.5]);
    let n = points.len() / 3;

    let periodic = compute_delaunay(&points, n, true).unwrap();
    assert!(shares_cell(&periodic, a, b), "wrap-around neighbors must share a cell");

    let flat = compute_delaunay(&points, n, false).unwrap();
    assert!(!shares_cell(&flat, a, b), "a blocking point separates them");
}

// =============================================================================
// VALUE BOUNDARY
// =============================================================================

#[test]
fn test_value_boundary_mirrors_outcomes() {
    let points = random_points(20, 8);
    let value = compute_delaunay_value(&points, 20, false).unwrap();
    let cells = compute_delaunay(&points, 20, false).unwrap();
    assert_eq!(value, serde_json::to_value(&cells).unwrap());

    assert_eq!(compute_delaunay_value(&points, 2, true).unwrap(), json!([]));

    // Too sparse to certify on the torus: a fault, reported as null.
    let sparse = [
        0.4375, 0.8125, 0.125, 0.9375, 0.5, 0.4375, 0.6875, 0.875, 0.125, 0.0625, 0.5, 0.125,
    ];
    assert!(compute_delaunay_value(&sparse, 4, true).unwrap().is_null());
    assert!(matches!(
        compute_delaunay_value(&[f64::NAN, 0.0, 0.0], 1, false),
        Err(InputError::NonFiniteCoordinate { index: 0, .. })
    ));
}

#[test]
fn test_request_response_json() {
    let request = DelaunayRequest {
        points: random_points(10, 2),
        num_points: 10,
        is_periodic: false,
    };
    let encoded = serde_json::to_string(&request).unwrap();
    let decoded: DelaunayRequest = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, request);

    match decoded.execute() {
        DelaunayResponse::Success { tetrahedra } => {
            assert_eq!(tetrahedra, compute_delaunay(&request.points, 10, false).unwrap());
        }
        other => panic!("unexpected response {other:?}"),
    }
}

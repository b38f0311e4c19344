//! Property-based tests for the empty-circumsphere property and topology of
//! computed triangulations.
//!
//! Every case runs with `check_delaunay` enabled, so a non-empty circumsphere
//! surfaces as `EngineFault::DelaunayViolation`.

use periodic_delaunay::prelude::*;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn unit_points(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    (min..max).prop_flat_map(|n| prop::collection::vec(0.0_f64..1.0, 3 * n))
}

/// Points on a coarse lattice, so many of them are cospherical or coplanar.
fn lattice_points(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    let coordinate = (0_u8..6).prop_map(|k| f64::from(k) / 6.0);
    (min..max).prop_flat_map(move |n| prop::collection::vec(coordinate.clone(), 3 * n))
}

fn checked(points: &[f64], periodic: bool) -> Result<PeriodicDelaunay3d, EngineFault> {
    let options = TriangulationOptionsBuilder::default()
        .mode(PeriodicityMode::from_flag(periodic))
        .check_delaunay(true)
        .build()
        .unwrap();
    let mut engine = PeriodicDelaunay3d::with_options(options);
    engine.set_vertices(points.len() / 3, points)?;
    engine.compute()?;
    Ok(engine)
}

// =============================================================================
// Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_non_periodic_is_delaunay(points in unit_points(4, 60)) {
        let engine = checked(&points, false).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let n = points.len() / 3;
        for c in 0..engine.nb_cells() {
            prop_assert!(engine.cell_vertices(c).iter().all(|&i| i < n));
        }
        if engine.nb_cells() > 0 {
            let counts = validate_euler_characteristic(
                engine.periodic_cells(),
                TopologyKind::Euclidean,
            );
            prop_assert!(counts.is_ok(), "{counts:?}");
        }
    }

    #[test]
    fn prop_degenerate_lattice_is_delaunay(points in lattice_points(4, 40)) {
        let engine = checked(&points, false).map_err(|e| TestCaseError::fail(e.to_string()))?;
        for cell in engine.periodic_cells() {
            let mut indices: Vec<usize> = cell.iter().map(|v| v.index).collect();
            indices.sort_unstable();
            indices.dedup();
            prop_assert_eq!(indices.len(), 4, "cell repeats a vertex");
        }
    }

    #[test]
    fn prop_periodic_is_delaunay_on_the_torus(points in unit_points(40, 80)) {
        let engine = checked(&points, true).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(engine.nb_cells() > 0);
        let counts = validate_euler_characteristic(engine.periodic_cells(), TopologyKind::Toroidal);
        prop_assert!(counts.is_ok(), "{counts:?}");
    }

    #[test]
    fn prop_pipeline_is_deterministic(points in unit_points(4, 40), periodic in any::<bool>()) {
        let n = points.len() / 3;
        let first = compute_delaunay(&points, n, periodic);
        let second = compute_delaunay(&points, n, periodic);
        prop_assert_eq!(first, second);
    }
}

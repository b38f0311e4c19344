//! Euler characteristic of emitted tetrahedralizations.
//!
//! χ = f₀ − f₁ + f₂ − f₃, where `f_k` counts the distinct `k`-simplices.
//! On the torus a simplex is identified with all of its periodic translates:
//! two simplices are the same when one is a whole-period shift of the other.
//!
//! # Examples
//!
//! ```rust
//! use periodic_delaunay::core::periodic_delaunay::PeriodicVertex;
//! use periodic_delaunay::topology::characteristics::euler;
//!
//! let tet = [0, 1, 2, 3].map(|i| PeriodicVertex::new(i, [0, 0, 0]));
//! let counts = euler::count_simplices(&[tet]);
//! assert_eq!(counts.by_dim, vec![4, 6, 4, 1]);
//! assert_eq!(euler::euler_characteristic(&counts), 1);
//! ```

use crate::core::collections::FastHashSet;
use crate::core::periodic_delaunay::PeriodicVertex;
use crate::topology::traits::topological_space::{TopologyError, TopologyKind};

/// Counts of k-simplices for 0 ≤ k ≤ 3 (the **f-vector**).
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::topology::characteristics::euler::FVector;
///
/// let counts = FVector {
///     by_dim: vec![4, 6, 4, 1],
/// };
/// assert_eq!(counts.count(1), 6);
/// assert_eq!(counts.count(4), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FVector {
    /// `by_dim[k]` = `f_k` = number of `k`-simplices
    pub by_dim: Vec<usize>,
}

impl FVector {
    /// Get the number of `k`-simplices, 0 if `k` is out of range.
    #[must_use]
    #[inline]
    pub fn count(&self, k: usize) -> usize {
        self.by_dim.get(k).copied().unwrap_or(0)
    }
}

/// Representative of a simplex's translation class: shift so the smallest
/// vertex (by index, then offset) sits in the base domain, then sort.
///
/// The smallest vertex is the same vertex in every translate, because
/// comparisons between equal indices only see offset differences.
fn canonical<const K: usize>(mut simplex: [PeriodicVertex; K]) -> [PeriodicVertex; K] {
    let Some(anchor) = simplex.iter().min().map(|v| v.offset) else {
        return simplex;
    };
    for v in &mut simplex {
        for (o, a) in v.offset.iter_mut().zip(anchor) {
            *o -= a;
        }
    }
    simplex.sort_unstable();
    simplex
}

/// Count the distinct vertices, edges, triangles and tetrahedra of a list of
/// cells given by periodic vertices.
///
/// Non-periodic cells simply carry zero offsets everywhere.
#[must_use]
pub fn count_simplices(cells: &[[PeriodicVertex; 4]]) -> FVector {
    let mut vertices: FastHashSet<usize> = FastHashSet::default();
    let mut edges: FastHashSet<[PeriodicVertex; 2]> = FastHashSet::default();
    let mut triangles: FastHashSet<[PeriodicVertex; 3]> = FastHashSet::default();
    let mut tets: FastHashSet<[PeriodicVertex; 4]> = FastHashSet::default();

    for cell in cells {
        for v in cell {
            vertices.insert(v.index);
        }
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.insert(canonical([cell[i], cell[j]]));
            }
            let mut face = [cell[0]; 3];
            let mut slot = 0;
            for (k, v) in cell.iter().enumerate() {
                if k != i {
                    face[slot] = *v;
                    slot += 1;
                }
            }
            triangles.insert(canonical(face));
        }
        tets.insert(canonical(*cell));
    }

    FVector {
        by_dim: vec![vertices.len(), edges.len(), triangles.len(), tets.len()],
    }
}

/// χ = Σ(-1)^k · `f_k`.
#[must_use]
pub fn euler_characteristic(counts: &FVector) -> isize {
    counts
        .by_dim
        .iter()
        .enumerate()
        .map(|(k, &f)| {
            let f = isize::try_from(f).unwrap_or(isize::MAX);
            if k % 2 == 0 { f } else { -f }
        })
        .sum()
}

/// Checks that the cells triangulate the expected space: a 3-ball for
/// [`TopologyKind::Euclidean`], the 3-torus for [`TopologyKind::Toroidal`].
///
/// An empty cell list is accepted.
///
/// # Errors
///
/// Returns [`TopologyError::EulerMismatch`] if χ differs from the expected value.
pub fn validate_euler_characteristic(
    cells: &[[PeriodicVertex; 4]],
    kind: TopologyKind,
) -> Result<FVector, TopologyError> {
    let counts = count_simplices(cells);
    if cells.is_empty() {
        return Ok(counts);
    }
    let computed = euler_characteristic(&counts);
    let expected = kind.expected_euler_characteristic();
    if computed == expected {
        Ok(counts)
    } else {
        Err(TopologyError::EulerMismatch {
            computed,
            expected,
            kind,
        })
    }
}

//! Exact geometric predicates on lattice points.
//!
//! Both predicates are evaluated in integer arithmetic and are therefore exact
//! for every [`GridPoint`] input. [`insphere_sos`] additionally breaks
//! cospherical ties with a symbolic perturbation, so it never reports
//! [`InSphere::BOUNDARY`].

#![forbid(unsafe_code)]

use crate::geometry::exact::WideInt;
use crate::geometry::point::GridPoint;

/// Represents the position of a point relative to a circumsphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InSphere {
    /// The point is outside the circumsphere
    OUTSIDE,
    /// The point lies exactly on the circumsphere
    BOUNDARY,
    /// The point is inside the circumsphere
    INSIDE,
}

impl std::fmt::Display for InSphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a simplex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The simplex has negative orientation (determinant < 0)
    NEGATIVE,
    /// The simplex is degenerate (determinant = 0)
    DEGENERATE,
    /// The simplex has positive orientation (determinant > 0)
    POSITIVE,
}

impl Orientation {
    const fn from_sign(sign: i32) -> Self {
        match sign {
            s if s > 0 => Self::POSITIVE,
            s if s < 0 => Self::NEGATIVE,
            _ => Self::DEGENERATE,
        }
    }

    /// The orientation of the same simplex with two vertices swapped.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::NEGATIVE => Self::POSITIVE,
            Self::DEGENERATE => Self::DEGENERATE,
            Self::POSITIVE => Self::NEGATIVE,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// A lattice point together with its symbolic-perturbation priority.
///
/// Lower ranks are perturbed more strongly. Ranks must be distinct for
/// distinct points and must not change when the whole configuration is
/// translated.
#[derive(Debug, Clone, Copy)]
pub struct RankedPoint<'a> {
    /// Lattice position.
    pub point: &'a GridPoint,
    /// Perturbation priority.
    pub rank: u64,
}

// =============================================================================
// DETERMINANTS
// =============================================================================

/// Determinant of the 3×3 matrix with rows `r0`, `r1`, `r2`.
///
/// Entries are coordinate differences below `2^38`, so the result stays well
/// inside `i128`.
const fn det3(r0: [i128; 3], r1: [i128; 3], r2: [i128; 3]) -> i128 {
    r0[0] * (r1[1] * r2[2] - r1[2] * r2[1]) - r0[1] * (r1[0] * r2[2] - r1[2] * r2[0])
        + r0[2] * (r1[0] * r2[1] - r1[1] * r2[0])
}

const fn squared_length(v: [i128; 3]) -> i128 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

/// Signed orientation determinant `det[b - a; c - a; d - a]`.
#[must_use]
pub fn orient3d_value(a: &GridPoint, b: &GridPoint, c: &GridPoint, d: &GridPoint) -> i128 {
    det3(b.delta(a), c.delta(a), d.delta(a))
}

/// Orientation of the tetrahedron `(a, b, c, d)`.
///
/// The unit simplex `(0, e₁, e₂, e₃)` is [`Orientation::POSITIVE`].
///
/// # Example
///
/// ```
/// use periodic_delaunay::geometry::point::GridPoint;
/// use periodic_delaunay::geometry::predicates::{orient3d, Orientation};
///
/// let o = GridPoint::new([0, 0, 0]);
/// let x = GridPoint::new([1, 0, 0]);
/// let y = GridPoint::new([0, 1, 0]);
/// let z = GridPoint::new([0, 0, 1]);
/// assert_eq!(orient3d(&o, &x, &y, &z), Orientation::POSITIVE);
/// assert_eq!(orient3d(&o, &y, &x, &z), Orientation::NEGATIVE);
/// ```
#[must_use]
pub fn orient3d(a: &GridPoint, b: &GridPoint, c: &GridPoint, d: &GridPoint) -> Orientation {
    Orientation::from_sign(orient3d_value(a, b, c, d).signum() as i32)
}

/// Returns `true` if the three points lie on a common line.
#[must_use]
pub fn collinear(a: &GridPoint, b: &GridPoint, c: &GridPoint) -> bool {
    let u = b.delta(a);
    let v = c.delta(a);
    u[1] * v[2] == u[2] * v[1] && u[2] * v[0] == u[0] * v[2] && u[0] * v[1] == u[1] * v[0]
}

/// Raw insphere determinant, positive when `e` is inside the circumsphere of
/// a positively oriented `(a, b, c, d)`.
fn insphere_determinant(
    a: &GridPoint,
    b: &GridPoint,
    c: &GridPoint,
    d: &GridPoint,
    e: &GridPoint,
) -> WideInt {
    let ra = a.delta(e);
    let rb = b.delta(e);
    let rc = c.delta(e);
    let rd = d.delta(e);

    WideInt::from_product(squared_length(ra), det3(rb, rc, rd))
        - WideInt::from_product(squared_length(rb), det3(ra, rc, rd))
        + WideInt::from_product(squared_length(rc), det3(ra, rb, rd))
        - WideInt::from_product(squared_length(rd), det3(ra, rb, rc))
}

// =============================================================================
// INSPHERE
// =============================================================================

/// Exact position of `test` relative to the circumsphere of `simplex`.
///
/// The simplex may have either orientation. A degenerate simplex has no
/// circumsphere and yields [`InSphere::BOUNDARY`].
///
/// # Example
///
/// ```
/// use periodic_delaunay::geometry::point::GridPoint;
/// use periodic_delaunay::geometry::predicates::{insphere, InSphere};
///
/// let tet = [
///     GridPoint::new([0, 0, 0]),
///     GridPoint::new([4, 0, 0]),
///     GridPoint::new([0, 4, 0]),
///     GridPoint::new([0, 0, 4]),
/// ];
/// assert_eq!(insphere(&tet, &GridPoint::new([1, 1, 1])), InSphere::INSIDE);
/// assert_eq!(insphere(&tet, &GridPoint::new([4, 4, 0])), InSphere::BOUNDARY);
/// assert_eq!(insphere(&tet, &GridPoint::new([9, 9, 9])), InSphere::OUTSIDE);
/// ```
#[must_use]
pub fn insphere(simplex: &[GridPoint; 4], test: &GridPoint) -> InSphere {
    let [a, b, c, d] = simplex;
    let orientation = orient3d_value(a, b, c, d).signum() as i32;
    let sign = insphere_determinant(a, b, c, d, test).signum() * orientation;
    match sign {
        s if s > 0 => InSphere::INSIDE,
        s if s < 0 => InSphere::OUTSIDE,
        _ => InSphere::BOUNDARY,
    }
}

/// Insphere test with simulation of simplicity.
///
/// `simplex` must be positively oriented. Exact ties are resolved as if each
/// point's lifted coordinate `|p|²` were raised by `ε^(rank+1)`, which gives a
/// decision that is consistent across all tetrahedra sharing the points and
/// invariant under translation of the whole configuration.
#[must_use]
pub fn insphere_sos(simplex: [RankedPoint<'_>; 4], test: RankedPoint<'_>) -> InSphere {
    let [a, b, c, d] = simplex;
    let e = test;
    debug_assert_eq!(
        orient3d(a.point, b.point, c.point, d.point),
        Orientation::POSITIVE,
        "insphere_sos requires a positively oriented simplex"
    );

    match insphere_determinant(a.point, b.point, c.point, d.point, e.point).signum() {
        s if s > 0 => return InSphere::INSIDE,
        s if s < 0 => return InSphere::OUTSIDE,
        _ => {}
    }

    // Coefficient of each point's perturbation in the expanded determinant.
    let coefficient = |slot: usize| -> i32 {
        let (sign, o) = match slot {
            0 => (-1, orient3d(b.point, c.point, d.point, e.point)),
            1 => (1, orient3d(a.point, c.point, d.point, e.point)),
            2 => (-1, orient3d(a.point, b.point, d.point, e.point)),
            3 => (1, orient3d(a.point, b.point, c.point, e.point)),
            _ => (-1, orient3d(a.point, b.point, c.point, d.point)),
        };
        sign * match o {
            Orientation::POSITIVE => 1,
            Orientation::NEGATIVE => -1,
            Orientation::DEGENERATE => 0,
        }
    };

    let ranks = [a.rank, b.rank, c.rank, d.rank, e.rank];
    let mut order = [0_usize, 1, 2, 3, 4];
    order.sort_unstable_by_key(|&slot| ranks[slot]);

    for slot in order {
        match coefficient(slot) {
            c if c > 0 => return InSphere::INSIDE,
            c if c < 0 => return InSphere::OUTSIDE,
            _ => {}
        }
    }

    // Unreachable for a positively oriented simplex: the test point's own
    // coefficient is -orient(a, b, c, d).
    InSphere::OUTSIDE
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::GRID_SCALE;

    fn unit_tet() -> [GridPoint; 4] {
        [
            GridPoint::new([0, 0, 0]),
            GridPoint::new([GRID_SCALE, 0, 0]),
            GridPoint::new([0, GRID_SCALE, 0]),
            GridPoint::new([0, 0, GRID_SCALE]),
        ]
    }

    #[test]
    fn orientation_of_unit_simplex_is_positive() {
        let [a, b, c, d] = unit_tet();
        assert_eq!(orient3d(&a, &b, &c, &d), Orientation::POSITIVE);
        assert_eq!(orient3d(&b, &a, &c, &d), Orientation::NEGATIVE);
        assert_eq!(orient3d(&a, &b, &c, &GridPoint::new([7, 9, 0])), Orientation::DEGENERATE);
        assert_eq!(Orientation::POSITIVE.flipped(), Orientation::NEGATIVE);
    }

    #[test]
    fn orientation_is_exact_for_large_nearly_flat_tetrahedra() {
        let s = 3 * GRID_SCALE - 1;
        let a = GridPoint::new([-GRID_SCALE, -GRID_SCALE, -GRID_SCALE]);
        let b = GridPoint::new([s - GRID_SCALE, -GRID_SCALE, -GRID_SCALE]);
        let c = GridPoint::new([-GRID_SCALE, s - GRID_SCALE, -GRID_SCALE]);
        let d = GridPoint::new([s - GRID_SCALE, s - GRID_SCALE, -GRID_SCALE + 1]);
        assert_eq!(orient3d(&a, &b, &c, &d), Orientation::POSITIVE);
        let flat = GridPoint::new([s - GRID_SCALE, s - GRID_SCALE, -GRID_SCALE]);
        assert_eq!(orient3d(&a, &b, &c, &flat), Orientation::DEGENERATE);
    }

    #[test]
    fn collinearity_detection() {
        let a = GridPoint::new([0, 0, 0]);
        let b = GridPoint::new([2, 4, 6]);
        assert!(collinear(&a, &b, &GridPoint::new([3, 6, 9])));
        assert!(!collinear(&a, &b, &GridPoint::new([3, 6, 10])));
    }

    #[test]
    fn insphere_classifies_circumcenter_and_far_point() {
        let tet = unit_tet();
        let h = GRID_SCALE / 2;
        assert_eq!(insphere(&tet, &GridPoint::new([h, h, h])), InSphere::INSIDE);
        assert_eq!(
            insphere(&tet, &GridPoint::new([GRID_SCALE, GRID_SCALE, GRID_SCALE])),
            InSphere::BOUNDARY
        );
        assert_eq!(
            insphere(&tet, &GridPoint::new([2 * GRID_SCALE, 2 * GRID_SCALE, GRID_SCALE])),
            InSphere::OUTSIDE
        );
    }

    #[test]
    fn insphere_does_not_depend_on_simplex_orientation() {
        let [a, b, c, d] = unit_tet();
        let inside = GridPoint::new([GRID_SCALE / 4, GRID_SCALE / 4, GRID_SCALE / 4]);
        assert_eq!(insphere(&[b, a, c, d], &inside), InSphere::INSIDE);
    }

    #[test]
    fn insphere_sos_never_reports_boundary() {
        let tet = unit_tet();
        let cospherical = GridPoint::new([GRID_SCALE, GRID_SCALE, GRID_SCALE]);
        let ranked = |i: usize| RankedPoint {
            point: &tet[i],
            rank: i as u64,
        };
        let result = insphere_sos(
            [ranked(0), ranked(1), ranked(2), ranked(3)],
            RankedPoint {
                point: &cospherical,
                rank: 4,
            },
        );
        assert_ne!(result, InSphere::BOUNDARY);
    }

    #[test]
    fn insphere_sos_is_translation_invariant() {
        let tet = unit_tet();
        let e = GridPoint::new([GRID_SCALE, GRID_SCALE, GRID_SCALE]);
        let shift = [1_i8, -1, 1];
        let moved: Vec<GridPoint> = tet.iter().map(|p| p.translated(shift)).collect();
        let moved_e = e.translated(shift);

        for ranks in [[4_u64, 3, 2, 1, 0], [0, 1, 2, 3, 4], [2, 0, 4, 1, 3]] {
            let base = insphere_sos(
                [0, 1, 2, 3].map(|i| RankedPoint {
                    point: &tet[i],
                    rank: ranks[i],
                }),
                RankedPoint {
                    point: &e,
                    rank: ranks[4],
                },
            );
            let shifted = insphere_sos(
                [0, 1, 2, 3].map(|i| RankedPoint {
                    point: &moved[i],
                    rank: ranks[i],
                }),
                RankedPoint {
                    point: &moved_e,
                    rank: ranks[4],
                },
            );
            assert_eq!(base, shifted, "ranks {ranks:?}");
        }
    }

    #[test]
    fn insphere_sos_agrees_with_exact_test_off_the_sphere() {
        let tet = unit_tet();
        let inside = GridPoint::new([1, 1, 1]);
        let ranked = [0, 1, 2, 3].map(|i| RankedPoint {
            point: &tet[i],
            rank: i as u64,
        });
        assert_eq!(
            insphere_sos(
                ranked,
                RankedPoint {
                    point: &inside,
                    rank: 9
                }
            ),
            InSphere::INSIDE
        );
    }
}

//! Floating-point measures of tetrahedra.
//!
//! These are not used for combinatorial decisions (those go through the exact
//! predicates). They size circumballs for the periodic cover check and give
//! tests a way to measure volumes.

use num_traits::Float;
use thiserror::Error;

/// Errors from circumsphere computation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CircumcenterError {
    /// The four points are (numerically) coplanar.
    #[error("tetrahedron is degenerate (determinant {determinant:e})")]
    DegenerateSimplex {
        /// The near-zero determinant.
        determinant: f64,
    },
}

fn sub<T: Float>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot<T: Float>(a: &[T; 3], b: &[T; 3]) -> T {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross<T: Float>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Signed volume of the tetrahedron `(a, b, c, d)`, positive for the
/// orientation of the unit simplex.
#[must_use]
pub fn signed_volume<T: Float>(points: &[[T; 3]; 4]) -> T {
    let [a, b, c, d] = points;
    let three = T::one() + T::one() + T::one();
    let six = three + three;
    dot(&sub(b, a), &cross(&sub(c, a), &sub(d, a))) / six
}

/// Circumcenter and circumradius of a tetrahedron.
///
/// # Errors
///
/// Returns [`CircumcenterError::DegenerateSimplex`] if the points are coplanar.
///
/// # Example
///
/// ```
/// use periodic_delaunay::geometry::util::circumsphere;
///
/// let (center, radius) = circumsphere(&[
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, 0.0, 1.0],
/// ])
/// .unwrap();
/// assert_eq!(center, [0.5, 0.5, 0.5]);
/// assert!((radius - 0.75_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn circumsphere(points: &[[f64; 3]; 4]) -> Result<([f64; 3], f64), CircumcenterError> {
    let [a, b, c, d] = points;
    let u = sub(b, a);
    let v = sub(c, a);
    let w = sub(d, a);

    let determinant = 2.0 * dot(&u, &cross(&v, &w));
    if determinant == 0.0 || !determinant.is_finite() {
        return Err(CircumcenterError::DegenerateSimplex { determinant });
    }

    let (lu, lv, lw) = (dot(&u, &u), dot(&v, &v), dot(&w, &w));
    let vw = cross(&v, &w);
    let wu = cross(&w, &u);
    let uv = cross(&u, &v);
    let rel: [f64; 3] =
        std::array::from_fn(|k| (lu * vw[k] + lv * wu[k] + lw * uv[k]) / determinant);

    let radius = dot(&rel, &rel).sqrt();
    Ok(([a[0] + rel[0], a[1] + rel[1], a[2] + rel[2]], radius))
}

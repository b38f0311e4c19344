//! Fixed-point lattice points used by the exact predicates.
//!
//! Every coordinate that enters the triangulation engine is snapped to the
//! lattice `2^-36 · ℤ` of the unit cube. On the lattice, periodic translations
//! by whole periods are exact integer shifts, so a point and its images agree
//! bit-for-bit on every predicate.

#![forbid(unsafe_code)]

use num_traits::cast;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Number of fractional bits of the lattice.
pub const GRID_BITS: u32 = 36;

/// Lattice units per unit length (`2^36`).
pub const GRID_SCALE: i64 = 1 << GRID_BITS;

/// [`GRID_SCALE`] as a float. Multiplying by a power of two is exact.
pub const GRID_SCALE_F64: f64 = GRID_SCALE as f64;

// =============================================================================
// GRID POINT
// =============================================================================

/// A point on the `2^-36` lattice, stored as integer lattice units.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::geometry::point::{GridPoint, GRID_SCALE};
///
/// let p = GridPoint::snap([0.5, 0.25, 0.0]).unwrap();
/// assert_eq!(p.coords(), &[GRID_SCALE / 2, GRID_SCALE / 4, 0]);
///
/// let image = p.translated([1, 0, -1]);
/// assert_eq!(image.coords(), &[GRID_SCALE / 2 + GRID_SCALE, GRID_SCALE / 4, -GRID_SCALE]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    coords: [i64; 3],
}

impl GridPoint {
    /// Creates a lattice point from raw lattice units.
    #[must_use]
    pub const fn new(coords: [i64; 3]) -> Self {
        Self { coords }
    }

    /// Snaps unit-scaled coordinates to the nearest lattice point.
    ///
    /// Returns `None` for non-finite input or coordinates whose lattice value
    /// does not fit the supported range `[-2^40, 2^40]`.
    #[must_use]
    pub fn snap(coords: [f64; 3]) -> Option<Self> {
        const LIMIT: i64 = 1 << 40;
        let mut snapped = [0_i64; 3];
        for (out, &x) in snapped.iter_mut().zip(coords.iter()) {
            if !x.is_finite() {
                return None;
            }
            let units: i64 = cast((x * GRID_SCALE_F64).round())?;
            if !(-LIMIT..=LIMIT).contains(&units) {
                return None;
            }
            *out = units;
        }
        Some(Self { coords: snapped })
    }

    /// Folds coordinates equal to one full period back to zero.
    ///
    /// Inputs in `[0, 1)` can round up to exactly `2^36`; in a periodic domain
    /// that lattice value is the same point as `0`.
    #[must_use]
    pub fn wrapped(self) -> Self {
        let mut coords = self.coords;
        for c in &mut coords {
            *c = c.rem_euclid(GRID_SCALE);
        }
        Self { coords }
    }

    /// Image of this point translated by whole periods.
    #[must_use]
    pub const fn translated(self, offset: [i8; 3]) -> Self {
        Self {
            coords: [
                self.coords[0] + offset[0] as i64 * GRID_SCALE,
                self.coords[1] + offset[1] as i64 * GRID_SCALE,
                self.coords[2] + offset[2] as i64 * GRID_SCALE,
            ],
        }
    }

    /// Raw lattice units.
    #[must_use]
    pub const fn coords(&self) -> &[i64; 3] {
        &self.coords
    }

    /// Unit-scaled coordinates. Exact, since lattice values are below `2^53`.
    #[must_use]
    pub fn to_unit(self) -> [f64; 3] {
        self.coords.map(|c| c as f64 / GRID_SCALE_F64)
    }

    /// Component-wise difference `self - origin` widened for determinant work.
    #[must_use]
    pub fn delta(&self, origin: &Self) -> [i128; 3] {
        [
            i128::from(self.coords[0] - origin.coords[0]),
            i128::from(self.coords[1] - origin.coords[1]),
            i128::from(self.coords[2] - origin.coords[2]),
        ]
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.to_unit();
        write!(f, "({x}, {y}, {z})")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn snap_rounds_to_nearest_lattice_point() {
        let half_unit = 0.5 / GRID_SCALE_F64;
        let p = GridPoint::snap([0.25 + 0.4 * half_unit, 0.0, 1.0]).unwrap();
        assert_eq!(p.coords(), &[GRID_SCALE / 4, 0, GRID_SCALE]);
    }

    #[test]
    fn snap_rejects_non_finite_and_huge_values() {
        assert!(GridPoint::snap([f64::NAN, 0.0, 0.0]).is_none());
        assert!(GridPoint::snap([0.0, f64::INFINITY, 0.0]).is_none());
        assert!(GridPoint::snap([0.0, 0.0, 1.0e6]).is_none());
    }

    #[test]
    fn wrapped_folds_full_period_to_zero() {
        let p = GridPoint::new([GRID_SCALE, 5, GRID_SCALE - 1]).wrapped();
        assert_eq!(p.coords(), &[0, 5, GRID_SCALE - 1]);
    }

    #[test]
    fn translation_is_exact_and_reversible() {
        let p = GridPoint::snap([0.123_456_789, 0.987_654_321, 0.5]).unwrap();
        let back = p.translated([1, -1, 1]).translated([-1, 1, -1]);
        assert_eq!(p, back);
        let image = p.translated([1, 0, 0]).to_unit();
        assert_relative_eq!(image[0] - p.to_unit()[0], 1.0);
    }

    #[test]
    fn to_unit_inverts_snap_on_lattice_values() {
        let coords = [3.0 / 8.0, 1.0 / 1024.0, 0.75];
        let p = GridPoint::snap(coords).unwrap();
        assert_eq!(p.to_unit(), coords);
    }
}

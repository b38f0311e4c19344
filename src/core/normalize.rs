//! Folding raw coordinates into the unit cube.
//!
//! Every coordinate is reduced modulo one, so the engine only ever sees
//! values in `[0, 1)`. Point order and coordinate order are preserved.

use serde::Serialize;
use thiserror::Error;

use crate::core::periodic_delaunay::MAX_VERTICES;
use crate::topology::spaces::toroidal::ToroidalSpace;
use crate::topology::traits::topological_space::TopologicalSpace;

/// Input shape violations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InputError {
    /// The buffer is shorter than `3 * count`.
    #[error("expected at least {expected} coordinates, got {actual}")]
    InsufficientCoordinates {
        /// `3 * count`
        expected: usize,
        /// Buffer length
        actual: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("coordinate {index} is not finite: {value}")]
    NonFiniteCoordinate {
        /// Position in the flat buffer
        index: usize,
        /// Offending value
        value: f64,
    },

    /// The point count exceeds what the engine can index.
    #[error("{count} points requested, at most {max} supported")]
    TooManyPoints {
        /// Requested count
        count: usize,
        /// Supported maximum
        max: usize,
    },
}

/// A flat `x0 y0 z0 x1 …` buffer with every value in `[0, 1)`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NormalizedPoints {
    coords: Vec<f64>,
}

impl NormalizedPoints {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len() / 3
    }

    /// Returns `true` if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// The flat coordinate buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.coords
    }

    /// Point `i`, if it exists.
    #[must_use]
    pub fn point(&self, i: usize) -> Option<[f64; 3]> {
        let c = self.coords.get(3 * i..3 * i + 3)?;
        Some([c[0], c[1], c[2]])
    }

    /// Iterate over the points.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = [f64; 3]> + '_ {
        self.coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }
}

/// Wrap the first `count` points of `raw_coords` into `[0, 1)³`.
///
/// Trailing values beyond `3 * count` are ignored.
///
/// # Errors
///
/// Returns [`InputError`] if the buffer is too short, `count` is too large, or
/// a coordinate is not finite.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::normalize::normalize;
///
/// let points = normalize(&[1.25, -0.25, 0.5, 99.0], 1).unwrap();
/// assert_eq!(points.point(0), Some([0.25, 0.75, 0.5]));
/// assert_eq!(points.len(), 1);
/// ```
pub fn normalize(raw_coords: &[f64], count: usize) -> Result<NormalizedPoints, InputError> {
    if count > MAX_VERTICES {
        return Err(InputError::TooManyPoints {
            count,
            max: MAX_VERTICES,
        });
    }
    let expected = 3 * count;
    if raw_coords.len() < expected {
        return Err(InputError::InsufficientCoordinates {
            expected,
            actual: raw_coords.len(),
        });
    }
    if let Some((index, &value)) = raw_coords[..expected]
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(InputError::NonFiniteCoordinate { index, value });
    }

    let torus = ToroidalSpace::<3>::unit();
    let mut coords = raw_coords[..expected].to_vec();
    for point in coords.chunks_exact_mut(3) {
        torus.canonicalize_point(point);
    }
    tracing::debug!(count, "normalized points");
    Ok(NormalizedPoints { coords })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wraps_any_magnitude() {
        let points = normalize(&[3.75, -7.5, 1.0e6 + 0.5], 1).unwrap();
        let p = points.point(0).unwrap();
        assert_relative_eq!(p[0], 0.75);
        assert_relative_eq!(p[1], 0.5);
        assert_relative_eq!(p[2], 0.5);
    }

    #[test]
    fn upper_boundary_wraps_to_zero() {
        let points = normalize(&[1.0, 0.0, -1.0], 1).unwrap();
        assert_eq!(points.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_count_is_empty() {
        let points = normalize(&[], 0).unwrap();
        assert!(points.is_empty());
        assert_eq!(points.iter().count(), 0);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert_eq!(
            normalize(&[0.1, 0.2, 0.3, 0.4], 2),
            Err(InputError::InsufficientCoordinates {
                expected: 6,
                actual: 4
            })
        );
    }

    #[test]
    fn non_finite_is_rejected() {
        let err = normalize(&[0.1, f64::INFINITY, 0.3], 1).unwrap_err();
        assert!(matches!(err, InputError::NonFiniteCoordinate { index: 1, .. }));
    }

    #[test]
    fn oversized_count_is_rejected() {
        assert!(matches!(
            normalize(&[], usize::MAX),
            Err(InputError::TooManyPoints { .. })
        ));
    }

    #[test]
    fn order_is_preserved() {
        let raw = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let points = normalize(&raw, 2).unwrap();
        assert_eq!(points.as_slice(), &raw);
        assert_eq!(points.point(1), Some([0.4, 0.5, 0.6]));
        assert_eq!(points.point(2), None);
    }
}

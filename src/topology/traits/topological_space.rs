//! Core trait for the spaces a triangulation can live in.
//!
//! A tetrahedralization is either built in flat space (bounded by its convex
//! hull) or on the flat 3-torus obtained by identifying opposite faces of a
//! cubic domain.

use thiserror::Error;

/// Errors raised when a triangulation's topology does not match its space.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::topology::traits::topological_space::{TopologyError, TopologyKind};
///
/// let error = TopologyError::EulerMismatch {
///     computed: 2,
///     expected: 0,
///     kind: TopologyKind::Toroidal,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Euler characteristic mismatch: computed χ=2, expected χ=0 for Toroidal"
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// Euler characteristic does not match the value required by the space.
    #[error("Euler characteristic mismatch: computed χ={computed}, expected χ={expected} for {kind:?}")]
    EulerMismatch {
        /// The computed Euler characteristic.
        computed: isize,
        /// The expected Euler characteristic.
        expected: isize,
        /// The space the triangulation was built in.
        kind: TopologyKind,
    },
}

/// Classification of the spaces supported by the triangulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    /// Flat space. The triangulation covers the convex hull of its points,
    /// a topological 3-ball with χ = 1.
    Euclidean,

    /// Flat torus with periodic boundary conditions. The triangulation is a
    /// closed 3-manifold with χ = 0.
    Toroidal,
}

impl TopologyKind {
    /// Euler characteristic of a non-empty triangulation of this space.
    #[must_use]
    pub const fn expected_euler_characteristic(self) -> isize {
        match self {
            Self::Euclidean => 1,
            Self::Toroidal => 0,
        }
    }
}

impl std::fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Euclidean => write!(f, "euclidean"),
            Self::Toroidal => write!(f, "toroidal"),
        }
    }
}

/// Behaviour shared by the spaces a triangulation can inhabit.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::topology::traits::topological_space::{TopologicalSpace, TopologyKind};
///
/// struct Slab;
///
/// impl TopologicalSpace for Slab {
///     const DIM: usize = 3;
///
///     fn kind(&self) -> TopologyKind {
///         TopologyKind::Euclidean
///     }
///
///     fn allows_boundary(&self) -> bool {
///         true
///     }
///
///     fn canonicalize_point(&self, _coords: &mut [f64]) {}
///
///     fn fundamental_domain(&self) -> Option<&[f64]> {
///         None
///     }
/// }
///
/// assert!(Slab.allows_boundary());
/// ```
pub trait TopologicalSpace {
    /// Dimension of the space.
    const DIM: usize;

    /// Returns the kind of space.
    fn kind(&self) -> TopologyKind;

    /// Returns whether triangulations of this space have boundary facets.
    fn allows_boundary(&self) -> bool;

    /// Maps coordinates to their canonical representative in the space.
    ///
    /// `coords.len()` must equal [`Self::DIM`]; extra entries are ignored.
    fn canonicalize_point(&self, coords: &mut [f64]);

    /// Period of each axis, or `None` for unbounded spaces.
    fn fundamental_domain(&self) -> Option<&[f64]>;
}

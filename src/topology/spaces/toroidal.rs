//! Flat torus with periodic boundary conditions.

use crate::topology::traits::topological_space::{TopologicalSpace, TopologyKind};

/// Toroidal space obtained by identifying opposite faces of the box
/// `[0, domain[0]) × … × [0, domain[D-1])`.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::topology::spaces::toroidal::ToroidalSpace;
/// use periodic_delaunay::topology::traits::topological_space::TopologicalSpace;
///
/// let torus = ToroidalSpace::<3>::unit();
/// let mut p = [1.25, -0.25, 1.0];
/// torus.canonicalize_point(&mut p);
/// assert_eq!(p, [0.25, 0.75, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct ToroidalSpace<const D: usize> {
    /// The period of each axis.
    pub domain: [f64; D],
}

impl<const D: usize> ToroidalSpace<D> {
    /// Creates a toroidal space with the given periods.
    #[must_use]
    pub const fn new(domain: [f64; D]) -> Self {
        Self { domain }
    }

    /// The unit torus, all periods equal to one.
    #[must_use]
    pub const fn unit() -> Self {
        Self { domain: [1.0; D] }
    }

    /// Canonical representative of a single coordinate along `axis`, in
    /// `[0, period)`.
    ///
    /// `rem_euclid` can round a tiny negative value up to exactly the
    /// period; that value folds back to zero.
    #[must_use]
    pub fn wrap_coordinate(&self, axis: usize, value: f64) -> f64 {
        let period = self.domain[axis];
        let wrapped = value.rem_euclid(period);
        if wrapped >= period { 0.0 } else { wrapped }
    }
}

impl<const D: usize> TopologicalSpace for ToroidalSpace<D> {
    const DIM: usize = D;

    fn kind(&self) -> TopologyKind {
        TopologyKind::Toroidal
    }

    fn allows_boundary(&self) -> bool {
        false
    }

    fn canonicalize_point(&self, coords: &mut [f64]) {
        for (axis, c) in coords.iter_mut().take(D).enumerate() {
            *c = self.wrap_coordinate(axis, *c);
        }
    }

    fn fundamental_domain(&self) -> Option<&[f64]> {
        Some(&self.domain)
    }
}

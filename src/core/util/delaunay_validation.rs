//! Delaunay empty-circumsphere property validation utilities.
//!
//! These checks are brute force (every cell against every vertex) and are
//! meant for tests and for the opt-in verification pass of the engine.

#![forbid(unsafe_code)]

use crate::core::triangulation_data_structure::{CellKey, Tds, VertexId};
use crate::geometry::predicates::{InSphere, insphere};
use thiserror::Error;

/// Errors that can occur during Delaunay property validation.
///
/// # Examples
///
/// ```rust
/// use periodic_delaunay::core::triangulation_data_structure::CellKey;
/// use periodic_delaunay::core::util::delaunay_validation::DelaunayValidationError;
/// use slotmap::KeyData;
///
/// let cell_key = CellKey::from(KeyData::from_ffi(1));
/// let err = DelaunayValidationError::DelaunayViolation { cell_key, vertex: 7 };
/// assert!(err.to_string().contains("vertex 7"));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DelaunayValidationError {
    /// A vertex lies strictly inside the circumsphere of a cell.
    #[error("Cell {cell_key:?} violates the Delaunay property: vertex {vertex} is inside its circumsphere")]
    DelaunayViolation {
        /// The key of the offending cell.
        cell_key: CellKey,
        /// A vertex strictly inside its circumsphere.
        vertex: VertexId,
    },
}

/// First vertex of `candidates` strictly inside the circumsphere of `cell_key`.
fn first_violating_vertex(tds: &Tds, cell_key: CellKey, candidates: &[VertexId]) -> Option<VertexId> {
    let cell = tds.cell(cell_key)?;
    if cell.is_ghost() {
        return None;
    }
    let simplex = cell.vertices.map(|v| *tds.point(v));
    candidates
        .iter()
        .copied()
        .filter(|v| !cell.vertices.contains(v))
        .find(|&v| insphere(&simplex, tds.point(v)) == InSphere::INSIDE)
}

/// Finite cells whose circumsphere strictly contains one of `candidates`.
///
/// Points exactly on a circumsphere are not violations.
#[must_use]
pub fn find_delaunay_violations(tds: &Tds, candidates: &[VertexId]) -> Vec<CellKey> {
    tds.finite_cells()
        .filter(|(key, _)| first_violating_vertex(tds, *key, candidates).is_some())
        .map(|(key, _)| key)
        .collect()
}

/// Validate the empty-circumsphere property of the given cells.
///
/// # Errors
///
/// Returns [`DelaunayValidationError::DelaunayViolation`] for the first
/// offending cell.
pub fn validate_delaunay<I>(
    tds: &Tds,
    cells: I,
    candidates: &[VertexId],
) -> Result<(), DelaunayValidationError>
where
    I: IntoIterator<Item = CellKey>,
{
    for cell_key in cells {
        if let Some(vertex) = first_violating_vertex(tds, cell_key, candidates) {
            return Err(DelaunayValidationError::DelaunayViolation { cell_key, vertex });
        }
    }
    Ok(())
}
